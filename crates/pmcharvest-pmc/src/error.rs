use pmcharvest_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PmcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("empty response for {0}")]
    EmptyResponse(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, PmcError>;
