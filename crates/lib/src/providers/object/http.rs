use crate::{errors::ObjectStoreError, providers::object::ObjectStore};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::debug;

/// An S3-compatible object store reached over HTTP with path-style addressing.
///
/// Objects are fetched with `GET {endpoint}/{bucket}/{key}`.
#[derive(Clone, Debug)]
pub struct HttpObjectStore {
    client: ReqwestClient,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl HttpObjectStore {
    /// Creates a new `HttpObjectStore`.
    pub fn new(
        endpoint: String,
        bucket: String,
        token: Option<String>,
    ) -> Result<Self, ObjectStoreError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ObjectStoreError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            token,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.bucket,
            key.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let url = self.object_url(key);
        debug!(%url, "Fetching object.");

        let mut request_builder = self.client.get(&url);
        if let Some(token) = &self.token {
            request_builder = request_builder.bearer_auth(token);
        }

        let response = request_builder.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ObjectStoreError::NotFound(key.to_string())),
            status if !status.is_success() => Err(ObjectStoreError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(response.bytes().await?.to_vec()),
        }
    }
}
