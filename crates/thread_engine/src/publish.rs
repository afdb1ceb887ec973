use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("sink rejected entry {title:?}: {message}")]
    Rejected { title: String, message: String },
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for a rendered title/body pair.
pub trait PublishSink: Send + Sync {
    fn publish(&self, title: &str, body: &str) -> Result<(), PublishError>;
}
