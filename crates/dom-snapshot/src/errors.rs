use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),
    #[error("invalid snapshot json: {0}")]
    Parse(String),
}

impl SnapshotError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
