use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of a mapping store.
///
/// A mapping is a short code and the URL it was created for. Mappings are
/// only ever added; nothing in the store is deleted.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the URL stored for a given short code.
    ///
    /// Returns `Err(StorageError::NotFound)` if the code does not exist
    /// or its stored value is empty.
    async fn get(&self, code: &ShortCode) -> Result<String>;

    /// Checks whether a short code already exists in the store.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;

    /// Returns the number of stored mappings.
    async fn count(&self) -> Result<u64>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Writes a mapping, replacing any previous URL stored under `code`.
    async fn put(&self, code: &ShortCode, url: &str) -> Result<()>;

    /// Writes a mapping only if `code` is free.
    ///
    /// The existence check and the write happen atomically. Returns
    /// `Err(StorageError::Conflict)` if the code is already taken.
    async fn insert(&self, code: &ShortCode, url: &str) -> Result<()>;
}
