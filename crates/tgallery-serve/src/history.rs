//! Opaque history blob kept in a key-value table.
//!
//! The ingestion bot stores whatever it needs to remember between runs here.
//! The server never inspects the blob: get returns it verbatim, put replaces
//! it wholesale, and the last writer wins.

use rusqlite::{OptionalExtension, params};

use crate::error::GalleryError;
use crate::store::Store;

/// Schema for the key-value database.
pub const KV_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key        TEXT    PRIMARY KEY,
    value      BLOB    NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// Key under which the history blob lives.
pub const HISTORY_KEY: &str = "history";

/// Read the stored blob, if any.
pub async fn get_history(kv: &Store) -> Result<Option<Vec<u8>>, GalleryError> {
    kv.call(|conn| {
        conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            [HISTORY_KEY],
            |row| row.get(0),
        )
        .optional()
    })
    .await
}

/// Replace the stored blob.
pub async fn put_history(kv: &Store, blob: Vec<u8>) -> Result<(), GalleryError> {
    let len = blob.len();
    let updated_at = chrono::Utc::now().timestamp();
    kv.call(move |conn| {
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![HISTORY_KEY, blob, updated_at],
        )
    })
    .await?;

    tracing::debug!(bytes = len, "history blob replaced");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_history_is_none() {
        let kv = Store::open_in_memory(KV_SCHEMA).unwrap();
        assert_eq!(get_history(&kv).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_then_get_returns_blob_verbatim() {
        let kv = Store::open_in_memory(KV_SCHEMA).unwrap();
        let blob = b"{\"pixiv\":[1,2,3]}\n\xff".to_vec();
        put_history(&kv, blob.clone()).await.unwrap();
        assert_eq!(get_history(&kv).await.unwrap(), Some(blob));
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let kv = Store::open_in_memory(KV_SCHEMA).unwrap();
        put_history(&kv, b"first".to_vec()).await.unwrap();
        put_history(&kv, b"second".to_vec()).await.unwrap();
        assert_eq!(get_history(&kv).await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn empty_blob_is_stored() {
        let kv = Store::open_in_memory(KV_SCHEMA).unwrap();
        put_history(&kv, Vec::new()).await.unwrap();
        assert_eq!(get_history(&kv).await.unwrap(), Some(Vec::new()));
    }
}
