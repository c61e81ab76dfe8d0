use thiserror::Error;

/// Errors raised by a `DocumentStore` backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage connection error: {0}")]
    Connection(String),
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
    #[error("Stored record for '{0}' is not a JSON object")]
    CorruptRecord(String),
    #[error("Failed to (de)serialize stored record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<turso::Error> for StoreError {
    fn from(err: turso::Error) -> Self {
        StoreError::OperationFailed(err.to_string())
    }
}

/// Errors raised by an `ObjectStore` backend.
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Object store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Object store returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Object store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object '{0}' is not valid UTF-8 text")]
    InvalidText(String),
    #[error("Object store is not configured correctly: {0}")]
    Configuration(String),
}

/// Errors raised by a `ClassificationProvider`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to classification service: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize classification service response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("Classification service returned an error: {0}")]
    AiApi(String),
    #[error("Classification service returned no text content")]
    EmptyReply,
    #[error("Classification provider is not configured correctly: {0}")]
    Configuration(String),
}

/// The error taxonomy of the request handler.
///
/// Every variant maps onto exactly one HTTP status via [`HandlerError::status_code`].
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl HandlerError {
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::BadRequest(_) => 400,
            HandlerError::NotFound(_) => 404,
            HandlerError::Json(_) | HandlerError::Store(_) => 500,
        }
    }
}
