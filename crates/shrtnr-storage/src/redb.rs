use ::redb::{Database, ReadableTable, TableDefinition, TableError, WriteTransaction};
use async_trait::async_trait;
use shrtnr_core::repository::{ReadRepository, Repository, Result};
use shrtnr_core::{ShortCode, StorageError};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// All mappings live in this table, keyed by short code.
const SHORT_CODES: TableDefinition<&str, &str> = TableDefinition::new("shortCodes");

/// Bookkeeping values maintained next to the mappings.
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");
const MAPPING_COUNT_KEY: &str = "mapping_count";

/// Durable mapping store backed by a single redb file.
///
/// redb gives the single-writer/multi-reader contract: write transactions are
/// serialized, readers see a consistent snapshot, and a commit is durable once
/// it returns. The file is locked on open, so a second process opening the
/// same path fails instead of sharing it.
///
/// Every call runs on the blocking thread pool.
#[derive(Clone)]
pub struct RedbRepository {
    db: Arc<Database>,
    path: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Upsert,
    CreateOnly,
}

impl RedbRepository {
    /// Opens the store at `path`, creating the file if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path)
            .map_err(|e| StorageError::Open(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), "opened mapping store");

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Returns the path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counts mappings by walking every key of the table.
    ///
    /// [`ReadRepository::count`] reads a maintained counter instead; this is
    /// the O(n) reference it must agree with.
    pub async fn scan_count(&self) -> Result<u64> {
        self.blocking(|db| {
            let txn = db.begin_read().map_err(read_error)?;
            match txn.open_table(SHORT_CODES) {
                Ok(table) => count_entries(&table).map_err(read_error),
                Err(TableError::TableDoesNotExist(_)) => Ok(0),
                Err(e) => Err(read_error(e)),
            }
        })
        .await
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StorageError::Operation(e.to_string()))?
    }

    async fn write(&self, code: &ShortCode, url: &str, mode: WriteMode) -> Result<()> {
        let code = code.to_string();
        let url = url.to_owned();
        self.blocking(move |db| {
            let txn = db.begin_write().map_err(write_error)?;
            match apply_write(&txn, &code, &url, mode) {
                Ok(()) => txn.commit().map_err(write_error),
                Err(e) => Err(rolled_back(e, txn.abort())),
            }
        })
        .await
    }
}

impl std::fmt::Debug for RedbRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbRepository")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn apply_write(txn: &WriteTransaction, code: &str, url: &str, mode: WriteMode) -> Result<()> {
    let mut table = txn.open_table(SHORT_CODES).map_err(write_error)?;

    // An empty value reads as absent, so it does not block a create.
    if mode == WriteMode::CreateOnly
        && table
            .get(code)
            .map_err(write_error)?
            .is_some_and(|stored| !stored.value().is_empty())
    {
        return Err(StorageError::Conflict(code.to_owned()));
    }

    let added = table.insert(code, url).map_err(write_error)?.is_none();
    if added {
        let mut meta = txn.open_table(META).map_err(write_error)?;
        let current = meta
            .get(MAPPING_COUNT_KEY)
            .map_err(write_error)?
            .map(|count| count.value());
        // Stores written before the counter existed start from a full scan,
        // which already includes the key inserted above.
        let next = match current {
            Some(count) => count + 1,
            None => count_entries(&table).map_err(write_error)?,
        };
        meta.insert(MAPPING_COUNT_KEY, next).map_err(write_error)?;
    }

    debug!(code, added, "wrote mapping");
    Ok(())
}

/// The error that caused a rollback wins over a failure to abort.
fn rolled_back(cause: StorageError, abort: std::result::Result<(), impl Display>) -> StorageError {
    if let Err(e) = abort {
        warn!(error = %e, cause = %cause, "failed to abort write transaction");
    }
    cause
}

fn count_entries<T>(table: &T) -> std::result::Result<u64, ::redb::StorageError>
where
    T: ReadableTable<&'static str, &'static str>,
{
    let mut count = 0;
    for entry in table.iter()? {
        entry?;
        count += 1;
    }
    Ok(count)
}

fn read_error(e: impl Display) -> StorageError {
    StorageError::Read(e.to_string())
}

fn write_error(e: impl Display) -> StorageError {
    StorageError::Write(e.to_string())
}

#[async_trait]
impl ReadRepository for RedbRepository {
    async fn get(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "looking up short code");
        let code = code.to_string();
        self.blocking(move |db| {
            let txn = db.begin_read().map_err(read_error)?;
            let table = match txn.open_table(SHORT_CODES) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => return Err(StorageError::NotFound(code)),
                Err(e) => return Err(read_error(e)),
            };

            let url = table
                .get(code.as_str())
                .map_err(read_error)?
                .map(|url| url.value().to_owned());

            match url {
                Some(url) if !url.is_empty() => Ok(url),
                _ => Err(StorageError::NotFound(code)),
            }
        })
        .await
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let code = code.to_string();
        self.blocking(move |db| {
            let txn = db.begin_read().map_err(read_error)?;
            let table = match txn.open_table(SHORT_CODES) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => return Ok(false),
                Err(e) => return Err(read_error(e)),
            };

            Ok(table
                .get(code.as_str())
                .map_err(read_error)?
                .is_some_and(|url| !url.value().is_empty()))
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        let counted = self
            .blocking(|db| {
                let txn = db.begin_read().map_err(read_error)?;
                match txn.open_table(META) {
                    Ok(meta) => Ok(meta
                        .get(MAPPING_COUNT_KEY)
                        .map_err(read_error)?
                        .map(|count| count.value())),
                    Err(TableError::TableDoesNotExist(_)) => Ok(None),
                    Err(e) => Err(read_error(e)),
                }
            })
            .await?;

        match counted {
            Some(count) => Ok(count),
            None => self.scan_count().await,
        }
    }
}

#[async_trait]
impl Repository for RedbRepository {
    async fn put(&self, code: &ShortCode, url: &str) -> Result<()> {
        self.write(code, url, WriteMode::Upsert).await
    }

    async fn insert(&self, code: &ShortCode, url: &str) -> Result<()> {
        self.write(code, url, WriteMode::CreateOnly).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn open_temp() -> (TempDir, RedbRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = RedbRepository::open(dir.path().join("shrtnr.db")).unwrap();
        (dir, repo)
    }

    #[tokio::test]
    async fn empty_store() {
        let (_dir, repo) = open_temp();

        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.scan_count().await.unwrap(), 0);
        assert!(!repo.exists(&code("abc")).await.unwrap());

        let err = repo.get(&code("abc")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn put_and_get() {
        let (_dir, repo) = open_temp();

        repo.put(&code("abc123"), "https://example.com").await.unwrap();

        assert_eq!(
            repo.get(&code("abc123")).await.unwrap(),
            "https://example.com"
        );
        assert!(repo.exists(&code("abc123")).await.unwrap());
    }

    #[tokio::test]
    async fn missing_code_in_existing_table() {
        let (_dir, repo) = open_temp();
        repo.put(&code("abc123"), "https://example.com").await.unwrap();

        let err = repo.get(&code("zzz")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_value_is_not_found() {
        let (_dir, repo) = open_temp();
        repo.put(&code("empty"), "").await.unwrap();

        let err = repo.get(&code("empty")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn put_overwrites_without_counting_twice() {
        let (_dir, repo) = open_temp();

        repo.put(&code("abc123"), "https://old.com").await.unwrap();
        repo.put(&code("abc123"), "https://new.com").await.unwrap();

        assert_eq!(repo.get(&code("abc123")).await.unwrap(), "https://new.com");
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.scan_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_conflict_leaves_store_untouched() {
        let (_dir, repo) = open_temp();

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
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_claims_code_holding_empty_value() {
        let (_dir, repo) = open_temp();

        repo.put(&code("abc123"), "").await.unwrap();
        assert!(!repo.exists(&code("abc123")).await.unwrap());

        repo.insert(&code("abc123"), "https://example.com")
            .await
            .unwrap();

        assert_eq!(
            repo.get(&code("abc123")).await.unwrap(),
            "https://example.com"
        );
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.scan_count().await.unwrap(), 1);
    }

    #[test]
    fn failed_abort_keeps_original_error() {
        let conflict = StorageError::Conflict("abc123".to_owned());
        assert_eq!(rolled_back(conflict.clone(), Err("disk gone")), conflict);

        let write = StorageError::Write("full".to_owned());
        assert_eq!(rolled_back(write.clone(), Ok::<(), &str>(())), write);
    }

    #[tokio::test]
    async fn counter_matches_scan() {
        let (_dir, repo) = open_temp();

        for i in 0..25 {
            repo.put(&code(&format!("c{i}")), "https://example.com")
                .await
                .unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 25);
        assert_eq!(repo.scan_count().await.unwrap(), 25);
    }

    #[tokio::test]
    async fn counter_is_rebuilt_for_stores_without_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");

        {
            let db = Database::create(&path).unwrap();
            let txn = db.begin_write().unwrap();
            {
                let mut table = txn.open_table(SHORT_CODES).unwrap();
                table.insert("a", "https://a.com").unwrap();
                table.insert("b", "https://b.com").unwrap();
            }
            txn.commit().unwrap();
        }

        let repo = RedbRepository::open(&path).unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);

        repo.put(&code("c"), "https://c.com").await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn second_open_of_same_file_fails() {
        let (dir, _repo) = open_temp();

        let err = RedbRepository::open(dir.path().join("shrtnr.db")).unwrap_err();
        assert!(matches!(err, StorageError::Open(_)));
    }
}
