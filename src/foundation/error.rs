pub type EditMotionResult<T> = Result<T, EditMotionError>;

#[derive(thiserror::Error, Debug)]
pub enum EditMotionError {
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation stream that does not replay onto its source/target pair.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EditMotionError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for EditMotionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
