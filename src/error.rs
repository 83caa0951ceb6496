use thiserror::Error;

/// Failure at a collaborator boundary (search, fetch, model, documents).
///
/// None of these abort a resolution run; the pipeline records them as
/// events and carries on with zero candidates from the failed unit.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("non-success status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("missing credential: {0}")]
    MissingKey(&'static str),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CollaboratorError {
    /// Rate limits and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            CollaboratorError::Http(e) => {
                e.is_timeout()
                    || e.status()
                        .is_some_and(|s| s.as_u16() == 429 || s.is_server_error())
            }
            CollaboratorError::Status { status, .. } => *status == 429 || *status >= 500,
            CollaboratorError::Timeout(_) => true,
            CollaboratorError::Provider(msg) => {
                msg.contains("429")
                    || msg.contains("rate")
                    || msg.contains("500")
                    || msg.contains("502")
                    || msg.contains("503")
            }
            _ => false,
        }
    }
}

pub type CollabResult<T> = std::result::Result<T, CollaboratorError>;
