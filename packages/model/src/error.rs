use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node is not a text run: {0}")]
    NotText(String),

    #[error("Node cannot hold inline content: {0}")]
    NotContainer(String),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
