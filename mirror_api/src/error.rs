use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum MirrorApiError {
    #[error("Could not initialize MirrorApi: {0}")]
    Initialization(String),
    #[error("Error in mirror REST response: {0}")]
    RestResponseError(String),
    #[error("JSON error in mirror response: {0}")]
    JsonError(String),
    #[error("Mirror query error. {status}: {message}")]
    QueryError { status: u16, message: String },
}
