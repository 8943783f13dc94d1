use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("project with id {0} not found")]
    ProjectNotFound(String),
    #[error("user with id {0} not found")]
    UserNotFound(String),
    #[error("node with id {0} not found")]
    NodeNotFound(String),
    #[error("cannot save {0}: required fields are missing")]
    InvalidDraft(&'static str),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("stored collection `{key}` is malformed: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unknown route `{0}`")]
    Route(String),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
