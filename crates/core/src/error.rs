#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("failed to read comment store: {0}")]
    CommentRead(std::io::Error),
    #[error("failed to write comment store: {0}")]
    CommentWrite(std::io::Error),
    #[error("failed to serialize comments: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize comments: {0}")]
    Deserialization(serde_json::Error),
    #[error("comment text cannot be empty")]
    EmptyCommentText,
    #[error("no comment with id {0}")]
    UnknownComment(uuid::Uuid),
    #[error("template nesting exceeds the supported depth")]
    DepthExceeded,
    #[error("failed to write CSV export: {0}")]
    CsvWrite(#[from] csv::Error),
    #[error("failed to flush CSV export: {0}")]
    CsvFlush(std::io::Error),
    #[error("CSV export was not valid UTF-8: {0}")]
    CsvUtf8(std::string::FromUtf8Error),
}

pub type ReviewResult<T> = std::result::Result<T, ReviewError>;
