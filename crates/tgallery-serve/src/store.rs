//! SQLite connection handle shared across request handlers.
//!
//! A single connection behind a mutex is plenty for a read-mostly gallery.
//! Statements run on the blocking thread pool so async workers never wait
//! on disk I/O or the lock.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::error::GalleryError;

/// How long a statement waits on a lock held by another process (the ingester).
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Cloneable handle to one SQLite database.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Open (or create) a database file and apply `schema`.
    pub fn open(path: impl AsRef<Path>, schema: &str) -> Result<Self, GalleryError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // journal_mode answers with a row, so it cannot go through execute().
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        tracing::debug!(path = %path.display(), journal_mode = %mode, "sqlite database opened");
        Self::with_schema(conn, schema)
    }

    /// Open a private in-memory database and apply `schema`.
    pub fn open_in_memory(schema: &str) -> Result<Self, GalleryError> {
        Self::with_schema(Connection::open_in_memory()?, schema)
    }

    fn with_schema(conn: Connection, schema: &str) -> Result<Self, GalleryError> {
        conn.execute_batch(schema)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<T, F>(&self, f: F) -> Result<T, GalleryError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let result = tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| GalleryError::Internal(anyhow::anyhow!("store task failed: {e}")))?;

        Ok(result?)
    }
}
