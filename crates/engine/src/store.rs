//! Hook-source store
//!
//! Persistent, content-addressed record of installed hook-source
//! environments. Each hook source is keyed by the SHA256 digest of its
//! identity (`repo` + `rev`); its environment lives under
//! `<store>/repos/<digest>/`.
//!
//! The store only answers "is this source installed, and where". Materializing
//! an environment is the installer's job; once done it calls
//! [`Store::register_environment`].

use crate::command::PrefixedCommandRunner;
use prehook_core::{Error, HookSourceDescriptor, Result, SourceIdentity};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Bucket holding installed-environment records
pub const ENVIRONMENTS_BUCKET: &str = "environments";

const ENVIRONMENTS_TABLE: TableDefinition<'static, &'static [u8], &'static [u8]> =
    TableDefinition::new(ENVIRONMENTS_BUCKET);

/// Trait for persistent state storage
pub trait PersistentState: Send + Sync {
    /// Get a value from a bucket
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Set a value in a bucket
    fn set(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete a key from a bucket
    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()>;

    /// Visit all key-value pairs in a bucket
    fn for_each(&self, bucket: &str, f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>)
    -> Result<()>;
}

/// Persistent state implementation using redb
///
/// redb holds an exclusive lock on the database file for as long as the
/// handle is open. Opening waits for a concurrent holder (another hook firing
/// at the same time) to release it, up to a bounded timeout.
pub struct RedbPersistentState {
    db: Database,
}

// Static assertions to ensure thread safety
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}

    let _ = assert_send::<RedbPersistentState>;
    let _ = assert_sync::<RedbPersistentState>;
};

impl RedbPersistentState {
    /// How long [`RedbPersistentState::new`] waits for a locked database
    pub const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

    const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
    const MAX_BACKOFF: Duration = Duration::from_millis(250);

    /// Create or open a persistent state database
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_timeout(path, Self::LOCK_TIMEOUT)
    }

    /// Create or open a persistent state database, waiting at most `timeout`
    /// for another handle to release it
    pub fn open_with_timeout(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let deadline = Instant::now() + timeout;
        let mut backoff = Self::INITIAL_BACKOFF;

        loop {
            match Database::create(path) {
                Ok(db) => return Ok(Self { db }),
                Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(Error::State(format!(
                            "Database {} is locked by another process (waited {}ms)",
                            path.display(),
                            timeout.as_millis()
                        )));
                    }
                    debug!("Database {} is locked, retrying", path.display());
                    std::thread::sleep(backoff.min(deadline - now));
                    backoff = (backoff * 2).min(Self::MAX_BACKOFF);
                }
                Err(e) => {
                    return Err(Error::State(format!(
                        "Failed to open database {}: {e}",
                        path.display()
                    )));
                }
            }
        }
    }

    fn table_def(bucket: &str) -> Result<TableDefinition<'static, &'static [u8], &'static [u8]>> {
        match bucket {
            ENVIRONMENTS_BUCKET => Ok(ENVIRONMENTS_TABLE),
            other => Err(Error::State(format!("Unknown bucket '{other}'"))),
        }
    }
}

impl PersistentState for RedbPersistentState {
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let table_def = Self::table_def(bucket)?;
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| Error::State(format!("Failed to begin read transaction: {e}")))?;

        let table = match read_txn.open_table(table_def) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(Error::State(format!("Failed to open table: {e}"))),
        };

        match table.get(key) {
            Ok(Some(value)) => Ok(Some(value.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(Error::State(format!("Failed to get value: {e}"))),
        }
    }

    fn set(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let table_def = Self::table_def(bucket)?;
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| Error::State(format!("Failed to begin write transaction: {e}")))?;
        {
            let mut table = write_txn
                .open_table(table_def)
                .map_err(|e| Error::State(format!("Failed to open table: {e}")))?;
            table
                .insert(key, value)
                .map_err(|e| Error::State(format!("Failed to insert value: {e}")))?;
        }
        write_txn
            .commit()
            .map_err(|e| Error::State(format!("Failed to commit transaction: {e}")))?;
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        let table_def = Self::table_def(bucket)?;
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| Error::State(format!("Failed to begin write transaction: {e}")))?;
        {
            let mut table = write_txn
                .open_table(table_def)
                .map_err(|e| Error::State(format!("Failed to open table: {e}")))?;
            table
                .remove(key)
                .map_err(|e| Error::State(format!("Failed to remove value: {e}")))?;
        }
        write_txn
            .commit()
            .map_err(|e| Error::State(format!("Failed to commit transaction: {e}")))?;
        Ok(())
    }

    fn for_each(
        &self,
        bucket: &str,
        f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>,
    ) -> Result<()> {
        let table_def = Self::table_def(bucket)?;
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| Error::State(format!("Failed to begin read transaction: {e}")))?;

        let table = match read_txn.open_table(table_def) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(()),
            Err(e) => return Err(Error::State(format!("Failed to open table: {e}"))),
        };

        let iter = table
            .iter()
            .map_err(|e| Error::State(format!("Failed to iterate table: {e}")))?;

        for item in iter {
            let (key, value) =
                item.map_err(|e| Error::State(format!("Failed to read item: {e}")))?;
            f(key.value(), value.value())?;
        }

        Ok(())
    }
}

/// Type aliases for in-memory state data structure
/// Inner map: key-value pairs within a bucket
type BucketData = HashMap<Vec<u8>, Vec<u8>>;
/// Outer map: bucket name -> bucket data
type StateData = HashMap<String, BucketData>;

/// In-memory persistent state for tests and throwaway stores
///
/// Counts reads so callers can assert how often the store was consulted.
#[derive(Default)]
pub struct MemoryState {
    data: RwLock<StateData>,
    reads: AtomicUsize,
}

impl MemoryState {
    /// Create an empty in-memory state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls served so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl PersistentState for MemoryState {
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.get(bucket).and_then(|b| b.get(key).cloned()))
    }

    fn set(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.entry(bucket.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(bucket_data) = data.get_mut(bucket) {
            bucket_data.remove(key);
        }
        Ok(())
    }

    fn for_each(
        &self,
        bucket: &str,
        f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>,
    ) -> Result<()> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(bucket_data) = data.get(bucket) {
            for (k, v) in bucket_data {
                f(k, v)?;
            }
        }
        Ok(())
    }
}

impl<T: PersistentState + ?Sized> PersistentState for std::sync::Arc<T> {
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(bucket, key)
    }

    fn set(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).set(bucket, key, value)
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        (**self).delete(bucket, key)
    }

    fn for_each(
        &self,
        bucket: &str,
        f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>,
    ) -> Result<()> {
        (**self).for_each(bucket, f)
    }
}

/// Record of an installed hook-source environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledEnvironment {
    /// Identity of the installed source
    pub identity: SourceIdentity,
    /// Directory holding the materialized environment
    pub directory: PathBuf,
    /// Install time, seconds since the Unix epoch
    pub installed_at: u64,
}

impl InstalledEnvironment {
    /// Serialize to bytes using bincode
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::State(format!("Failed to encode environment record: {e}")))
    }

    /// Deserialize from bytes using bincode
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .ok()
            .map(|(record, _len)| record)
    }
}

/// Hex SHA256 digest of a source identity; the store key for that source
pub fn identity_digest(identity: &SourceIdentity) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.repo.as_bytes());
    hasher.update([0u8]);
    hasher.update(identity.rev.as_bytes());
    hex::encode(hasher.finalize())
}

/// Handle on the hook-source store
pub struct Store {
    directory: PathBuf,
    state: Box<dyn PersistentState>,
}

impl Store {
    /// Database file name inside the store directory
    pub const DB_FILE: &'static str = "store.db";

    /// Open (creating if needed) the redb-backed store in `directory`
    ///
    /// Waits up to [`RedbPersistentState::LOCK_TIMEOUT`] if another process
    /// holds the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the database
    /// cannot be opened, or the lock is not released in time.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_timeout(directory, RedbPersistentState::LOCK_TIMEOUT)
    }

    /// [`Store::open`] with an explicit lock timeout
    ///
    /// # Errors
    ///
    /// See [`Store::open`].
    pub fn open_with_timeout(directory: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|e| {
            Error::State(format!(
                "Failed to create store directory {}: {e}",
                directory.display()
            ))
        })?;

        let state = RedbPersistentState::open_with_timeout(directory.join(Self::DB_FILE), timeout)?;
        debug!("Opened store at {}", directory.display());

        Ok(Self::with_state(directory, Box::new(state)))
    }

    /// Open the store in the default location (`PREHOOK_HOME` or the XDG cache dir)
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be determined or opened.
    pub fn open_default() -> Result<Self> {
        let directory = prehook_config::store_dir()
            .ok_or_else(|| Error::State("Failed to determine store directory".to_string()))?;
        Self::open(directory)
    }

    /// Store backed by memory only; `directory` is still used for environment paths
    pub fn in_memory(directory: impl Into<PathBuf>) -> Self {
        Self::with_state(directory, Box::new(MemoryState::new()))
    }

    /// Store over an arbitrary state backend
    pub fn with_state(directory: impl Into<PathBuf>, state: Box<dyn PersistentState>) -> Self {
        Self {
            directory: directory.into(),
            state,
        }
    }

    /// Root directory of the store
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Content-addressed directory for a source's environment
    pub fn environment_dir(&self, identity: &SourceIdentity) -> PathBuf {
        self.directory.join("repos").join(identity_digest(identity))
    }

    /// Look up the installed environment for a source
    ///
    /// Unreadable records are treated as not installed.
    pub fn lookup(&self, identity: &SourceIdentity) -> Result<Option<InstalledEnvironment>> {
        let key = identity_digest(identity);
        let Some(bytes) = self.state.get(ENVIRONMENTS_BUCKET, key.as_bytes())? else {
            debug!("No environment recorded for {}", identity);
            return Ok(None);
        };

        let record = InstalledEnvironment::from_bytes(&bytes);
        if record.is_none() {
            warn!("Ignoring unreadable environment record for {}", identity);
        }
        Ok(record)
    }

    /// Record that `descriptor`'s environment has been materialized in `directory`
    ///
    /// # Errors
    ///
    /// Returns an error if `directory` does not exist or the record cannot be written.
    pub fn register_environment(
        &self,
        descriptor: &HookSourceDescriptor,
        directory: impl Into<PathBuf>,
    ) -> Result<InstalledEnvironment> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(Error::State(format!(
                "Environment directory {} does not exist",
                directory.display()
            )));
        }

        let identity = descriptor.identity();
        let installed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let record = InstalledEnvironment {
            identity,
            directory,
            installed_at,
        };

        let key = identity_digest(&record.identity);
        self.state
            .set(ENVIRONMENTS_BUCKET, key.as_bytes(), &record.to_bytes()?)?;
        debug!(
            "Registered environment for {} at {}",
            record.identity,
            record.directory.display()
        );
        Ok(record)
    }

    /// All recorded environments
    pub fn installed(&self) -> Result<Vec<InstalledEnvironment>> {
        let mut records = Vec::new();
        self.state.for_each(ENVIRONMENTS_BUCKET, &mut |_key, value| {
            if let Some(record) = InstalledEnvironment::from_bytes(value) {
                records.push(record);
            }
            Ok(())
        })?;
        records.sort_by(|a, b| a.identity.to_string().cmp(&b.identity.to_string()));
        Ok(records)
    }

    /// Command runner scoped to the store directory
    pub fn cmd_runner(&self) -> PrefixedCommandRunner {
        PrefixedCommandRunner::new(&self.directory)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use prehook_core::HookSelection;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn descriptor(repo: &str, rev: &str) -> HookSourceDescriptor {
        HookSourceDescriptor {
            repo: repo.to_string(),
            rev: rev.to_string(),
            hooks: vec![HookSelection {
                id: "check".to_string(),
                args: vec![],
                files: None,
                exclude: None,
            }],
        }
    }

    #[test]
    fn test_identity_digest_distinguishes_rev() {
        let a = descriptor("https://example.com/hooks", "v1").identity();
        let b = descriptor("https://example.com/hooks", "v2").identity();
        assert_ne!(identity_digest(&a), identity_digest(&b));
        assert_eq!(identity_digest(&a).len(), 64);
    }

    #[test]
    fn test_identity_digest_has_no_concatenation_collisions() {
        let a = descriptor("ab", "c").identity();
        let b = descriptor("a", "bc").identity();
        assert_ne!(identity_digest(&a), identity_digest(&b));
    }

    #[test]
    fn test_register_and_lookup_redb() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("store")).unwrap();
        let source = descriptor("https://example.com/hooks", "v1");

        assert!(store.lookup(&source.identity()).unwrap().is_none());

        let env_dir = store.environment_dir(&source.identity());
        fs::create_dir_all(&env_dir).unwrap();
        let record = store.register_environment(&source, &env_dir).unwrap();

        let found = store.lookup(&source.identity()).unwrap().unwrap();
        assert_eq!(found, record);
        assert_eq!(found.directory, env_dir);
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let store_dir = temp.path().join("store");
        let source = descriptor("https://example.com/hooks", "v1");
        let env_dir = temp.path().join("env");
        fs::create_dir_all(&env_dir).unwrap();

        {
            let store = Store::open(&store_dir).unwrap();
            store.register_environment(&source, &env_dir).unwrap();
        }

        let reopened = Store::open(&store_dir).unwrap();
        assert!(reopened.lookup(&source.identity()).unwrap().is_some());
    }

    #[test]
    fn test_register_requires_existing_directory() {
        let temp = TempDir::new().unwrap();
        let store = Store::in_memory(temp.path());
        let source = descriptor("https://example.com/hooks", "v1");
        let err = store
            .register_environment(&source, temp.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, Error::State(_)));
    }

    #[test]
    fn test_installed_lists_records() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("store")).unwrap();
        assert!(store.installed().unwrap().is_empty());

        store
            .register_environment(&descriptor("b/hooks", "v1"), temp.path())
            .unwrap();
        store
            .register_environment(&descriptor("a/hooks", "v1"), temp.path())
            .unwrap();

        let repos: Vec<_> = store
            .installed()
            .unwrap()
            .into_iter()
            .map(|r| r.identity.repo)
            .collect();
        assert_eq!(repos, vec!["a/hooks", "b/hooks"]);
    }

    #[test]
    fn test_unreadable_record_treated_as_missing() {
        let temp = TempDir::new().unwrap();
        let state = Arc::new(MemoryState::new());
        let store = Store::with_state(temp.path(), Box::new(Arc::clone(&state)));
        let source = descriptor("https://example.com/hooks", "v1");

        let key = identity_digest(&source.identity());
        state
            .set(ENVIRONMENTS_BUCKET, key.as_bytes(), b"\xff\xff\xff")
            .unwrap();

        assert!(store.lookup(&source.identity()).unwrap().is_none());
        assert_eq!(state.reads(), 1);
    }

    #[test]
    fn test_second_open_times_out_while_locked() {
        let temp = TempDir::new().unwrap();
        let store_dir = temp.path().join("store");
        let _held = Store::open(&store_dir).unwrap();

        let err = Store::open_with_timeout(&store_dir, Duration::from_millis(50)).unwrap_err();
        match err {
            Error::State(message) => {
                assert!(message.contains("locked"), "{message}");
                assert_eq!(message.matches("Store error").count(), 0);
            }
            other => panic!("expected State, got {other:?}"),
        }
    }

    #[test]
    fn test_second_open_waits_for_release() {
        let temp = TempDir::new().unwrap();
        let store_dir = temp.path().join("store");
        let source = descriptor("https://example.com/hooks", "v1");
        let env_dir = temp.path().join("env");
        fs::create_dir_all(&env_dir).unwrap();

        let first = Store::open(&store_dir).unwrap();
        first.register_environment(&source, &env_dir).unwrap();
        let holder = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            drop(first);
        });

        let second = Store::open_with_timeout(&store_dir, Duration::from_secs(10)).unwrap();
        holder.join().unwrap();
        assert!(second.lookup(&source.identity()).unwrap().is_some());
    }

    #[test]
    fn test_unknown_bucket_rejected_by_redb() {
        let temp = TempDir::new().unwrap();
        let state = RedbPersistentState::new(temp.path().join("test.db")).unwrap();
        assert!(state.get("other", b"key").is_err());
    }

    #[test]
    fn test_cmd_runner_scoped_to_store() {
        let temp = TempDir::new().unwrap();
        let store = Store::in_memory(temp.path());
        assert_eq!(store.cmd_runner().prefix_dir(), temp.path());
    }
}
