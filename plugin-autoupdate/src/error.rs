use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error("an I/O error occurred: {0}")]
    GenericIo(#[from] std::io::Error),

    #[error("http client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("deserialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid asset pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),

    #[error("base url {0} cannot carry path segments")]
    InvalidBaseUrl(Url),

    #[error("asset {0} has no download url")]
    MissingDownloadUrl(String),

    #[error("unexpected status code {0}")]
    UnexpectedStatus(StatusCode),
}
