use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shrtnr_core::repository::{ReadRepository, Repository, Result};
use shrtnr_core::{ShortCode, StorageError};

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// shards without blocking.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<ShortCode, String>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<String> {
        match self.storage.get(code) {
            Some(url) if !url.is_empty() => Ok(url.clone()),
            _ => Err(StorageError::NotFound(code.to_string())),
        }
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.get(code).is_some_and(|url| !url.is_empty()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.storage.len() as u64)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn put(&self, code: &ShortCode, url: &str) -> Result<()> {
        self.storage.insert(code.clone(), url.to_owned());
        Ok(())
    }

    async fn insert(&self, code: &ShortCode, url: &str) -> Result<()> {
        // The entry guard holds the shard lock, so check-and-insert is atomic.
        match self.storage.entry(code.clone()) {
            Entry::Occupied(mut slot) if slot.get().is_empty() => {
                slot.insert(url.to_owned());
                Ok(())
            }
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(url.to_owned());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn put_and_get() {
        let repo = InMemoryRepository::new();

        repo.put(&code("abc123"), "https://example.com").await.unwrap();

        let url = repo.get(&code("abc123")).await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        let err = repo.get(&code("nope")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_value_is_not_found() {
        let repo = InMemoryRepository::new();
        repo.put(&code("empty"), "").await.unwrap();

        let err = repo.get(&code("empty")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(!repo.exists(&code("empty")).await.unwrap());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let repo = InMemoryRepository::new();

        repo.put(&code("abc123"), "https://old.com").await.unwrap();
        repo.put(&code("abc123"), "https://new.com").await.unwrap();

        assert_eq!(repo.get(&code("abc123")).await.unwrap(), "https://new.com");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_conflict() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc123"), "https://example.com")
            .await
            .unwrap();

        let err = repo
            .insert(&code("abc123"), "https://other.com")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(
            repo.get(&code("abc123")).await.unwrap(),
            "https://example.com"
        );
    }

    #[tokio::test]
    async fn insert_claims_code_holding_empty_value() {
        let repo = InMemoryRepository::new();
        repo.put(&code("abc123"), "").await.unwrap();

        repo.insert(&code("abc123"), "https://example.com")
            .await
            .unwrap();

        assert_eq!(
            repo.get(&code("abc123")).await.unwrap(),
            "https://example.com"
        );
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn exists_checks() {
        let repo = InMemoryRepository::new();

        assert!(!repo.exists(&code("abc123")).await.unwrap());

        repo.put(&code("abc123"), "https://example.com").await.unwrap();

        assert!(repo.exists(&code("abc123")).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_access() {
        let repo = Arc::new(InMemoryRepository::with_capacity(16));
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let c = ShortCode::new_unchecked(format!("code-{:03}", i));
                repo.insert(&c, &format!("https://example{}.com", i))
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 10);
        for i in 0..10u64 {
            let c = ShortCode::new_unchecked(format!("code-{:03}", i));
            let url = repo.get(&c).await.unwrap();
            assert_eq!(url, format!("https://example{}.com", i));
        }
    }
}
