/// How a request from the client cache failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The request never got an HTTP answer: refused, reset, timed out.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
