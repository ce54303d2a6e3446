use thiserror::Error;

/// Anything that kept a request from producing a well-formed reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("could not reach the service: {0}")]
    Connect(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("service answered with HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Other(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Status(code),
            ureq::Error::Timeout(kind) => Self::Timeout(format!("{kind:?}")),
            ureq::Error::Io(io) => Self::Connect(io.to_string()),
            ureq::Error::HostNotFound => Self::Connect("host not found".to_string()),
            ureq::Error::ConnectionFailed => Self::Connect("connection failed".to_string()),
            other => Self::Other(other.to_string()),
        }
    }
}
