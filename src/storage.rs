//! String-keyed key/value persistence
//!
//! Every document the app keeps (metrics, goals, profile, journals, theme) is
//! a JSON string under a fixed key. Backends: SQLite for on-disk data and an
//! in-memory map for tests and throwaway sessions. [`WriteBehindStore`] wraps
//! either so that writes never block the caller.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use tracing::{debug, warn};

use crate::config::{StorageBackend, StorageSettings};
use crate::error::StorageError;

/// Storage keys. The `v1` suffix is the only schema version marker.
pub mod keys {
    pub const METRICS: &str = "healthapp:metrics:v1";
    pub const GOALS: &str = "healthapp:goals:v1";
    pub const PROFILE: &str = "healthapp:profile:v1";
    pub const THEME_PREFERENCE: &str = "healthapp:theme-preference:v1";
    pub const MEAL_LOGS: &str = "healthapp:meal-logs:v1";
    pub const EXERCISE_LOGS: &str = "healthapp:exercise-logs:v1";
}

/// Minimal asynchronous-in-spirit key/value contract
pub trait KeyValueStore: Send {
    /// Read the raw value under a key
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a raw value under a key
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Block until every accepted write is durable
    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Read and deserialize a JSON document
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Serialize and write a JSON document
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::WriteFailed {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, &raw)
}

/// Write a document, logging and discarding any failure.
///
/// In-memory state stays authoritative for the session either way.
pub fn persist_best_effort<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) {
    if let Err(e) = save_json(store, key, value) {
        warn!(key, error = %e, "Persistence failed, keeping in-memory state");
    }
}

/// Build the backend described by the storage settings
pub fn open_store(settings: &StorageSettings) -> Result<Box<dyn KeyValueStore>, StorageError> {
    let base: Box<dyn KeyValueStore> = match settings.backend {
        StorageBackend::Sqlite => Box::new(SqliteStore::open(settings.database_path())?),
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    };

    if settings.write_behind {
        Ok(Box::new(WriteBehindStore::spawn(base)?))
    } else {
        Ok(base)
    }
}

/// In-memory store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|e| StorageError::ReadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        entries.remove(key);
        Ok(())
    }
}

/// SQLite-backed store holding every key in one table
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create or open a database at the specified path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::OpenFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let store = Self { conn };
        store.init_schema()?;
        debug!(path = %path.display(), "Opened SQLite store");
        Ok(store)
    }

    /// Transient database, gone when dropped
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;
        Ok(())
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?1, ?2, CURRENT_TIMESTAMP)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = CURRENT_TIMESTAMP
                "#,
                params![key, value],
            )
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

type Reply<T> = mpsc::Sender<Result<T, StorageError>>;

enum Command {
    Set { key: String, value: String },
    Remove { key: String },
    Get { key: String, reply: Reply<Option<String>> },
    Flush { reply: Reply<()> },
}

/// Write-behind wrapper.
///
/// A worker thread owns the inner store and applies commands in order.
/// `set`/`remove` return as soon as the command is queued; failures are
/// logged by the worker and dropped. `get` and `flush` wait behind every
/// earlier write, so reads always observe prior writes.
pub struct WriteBehindStore {
    tx: Option<mpsc::Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl WriteBehindStore {
    pub fn spawn(mut inner: Box<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let (tx, rx) = mpsc::channel::<Command>();

        let worker = thread::Builder::new()
            .name("healthsync-writer".to_string())
            .spawn(move || {
                for command in rx {
                    match command {
                        Command::Set { key, value } => {
                            if let Err(e) = inner.set(&key, &value) {
                                warn!(key = %key, error = %e, "Deferred write failed");
                            }
                        }
                        Command::Remove { key } => {
                            if let Err(e) = inner.remove(&key) {
                                warn!(key = %key, error = %e, "Deferred remove failed");
                            }
                        }
                        Command::Get { key, reply } => {
                            let _ = reply.send(inner.get(&key));
                        }
                        Command::Flush { reply } => {
                            let _ = reply.send(inner.flush());
                        }
                    }
                }
                debug!("Write-behind worker stopped");
            })
            .map_err(|e| StorageError::OpenFailed {
                path: PathBuf::from("<write-behind worker>"),
                reason: e.to_string(),
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    fn send(&self, command: Command) -> Result<(), StorageError> {
        self.tx
            .as_ref()
            .ok_or(StorageError::WorkerGone)?
            .send(command)
            .map_err(|_| StorageError::WorkerGone)
    }
}

impl KeyValueStore for WriteBehindStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Get {
            key: key.to_string(),
            reply,
        })?;
        rx.recv().map_err(|_| StorageError::WorkerGone)?
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.send(Command::Set {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.send(Command::Remove {
            key: key.to_string(),
        })
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Flush { reply })?;
        rx.recv().map_err(|_| StorageError::WorkerGone)?
    }
}

impl Drop for WriteBehindStore {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain the queue and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
