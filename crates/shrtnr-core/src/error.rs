use thiserror::Error;

/// Errors related to the core types of the URL shortener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors produced while turning a URL into a short code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The id encoder could not be built or refused the number sequence.
    #[error("short code encoding failed: {0}")]
    Encoding(String),
    /// The URL could not be parsed while deriving a domain tag.
    #[error("cannot derive domain tag from url: {0}")]
    UrlParse(String),
}

/// Errors returned by mapping store backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("failed to open store: {0}")]
    Open(String),
    #[error("store write failed: {0}")]
    Write(String),
    #[error("store read failed: {0}")]
    Read(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenerError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no free short code after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },
}

impl ShortenerError {
    /// Returns `true` when the error only means that a code has no mapping.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound(_)))
    }
}
