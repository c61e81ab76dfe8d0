#[tokio::main]
async fn main() -> anyhow::Result<()> {
    doctag_server::start().await
}
