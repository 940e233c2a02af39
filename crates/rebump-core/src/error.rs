use thiserror::Error;

#[derive(Debug, Error)]
pub enum RebumpError {
    #[error("invalid command text: {0}")]
    InvalidCommand(String),

    #[error("unknown target command: {0}")]
    InvalidTarget(String),

    #[error("invalid command status: {0}")]
    InvalidStatus(String),

    #[error("workflow not found: #{0}")]
    WorkflowNotFound(u64),

    #[error("scheduled command not found: {0}")]
    CommandNotFound(String),

    #[error("workflow needs at least one target command")]
    NoTargets,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RebumpError>;
