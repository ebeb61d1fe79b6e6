use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Not a text file: {0}")]
    NotText(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Malformed path: {0}")]
    MalformedPath(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Stale response for page {page} (request {generation} was superseded)")]
    StaleResponse { page: usize, generation: u64 },

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl FolioError {
    /// Transient provider failures; the session recovers from these locally.
    pub fn is_transient(&self) -> bool {
        matches!(self, FolioError::FetchFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
