use crate::state::ConnectionState;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    Transport(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Where the control server lives and how to authenticate against it.
#[derive(Clone, PartialEq, Eq)]
pub struct PrinterTarget {
    pub endpoint: String,
    pub api_key: String,
}

impl PrinterTarget {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl fmt::Debug for PrinterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterTarget")
            .field("endpoint", &self.endpoint)
            .field("api_key", &if self.has_api_key() { "<redacted>" } else { "" })
            .finish()
    }
}

/// Remote printer API as seen by the reconciler.
#[async_trait]
pub trait PrinterStatusSource: Send + Sync {
    async fn connection_state(&self) -> Result<ConnectionState, SourceError>;

    /// Ask the server to open the printer connection.
    async fn connect(&self) -> Result<(), SourceError>;

    fn target(&self) -> &PrinterTarget;
}
