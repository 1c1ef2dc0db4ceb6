use thiserror::Error;

#[derive(Debug, Error)]
pub enum WooApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Could not sign request: {0}")]
    SigningFailure(String),
    #[error("The signed URL does not carry an oauth_signature")]
    MissingSignature,
    #[error("The request signature is invalid")]
    InvalidSignature,
    #[error("{0} authentication requires a TLS (https) store URL")]
    InsecureTransport(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not (de)serialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
