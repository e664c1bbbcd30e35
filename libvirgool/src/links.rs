//! Cross-post link persistence
//!
//! Stores the `local_post_id -> RemotePost` association that makes repeated
//! publish events no-ops. The remote payload is stored verbatim as JSON; the
//! store never re-queries the remote side.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;

use crate::error::{LinkStoreError, Result};
use crate::types::{CrossPostLink, RemotePost};

#[derive(Clone)]
pub struct LinkStore {
    pool: SqlitePool,
}

impl LinkStore {
    /// Open (or create) the link database at `db_path`.
    ///
    /// Expands `~`, creates parent directories, and applies migrations.
    /// `:memory:` is supported for tests.
    pub async fn new(db_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(LinkStoreError::IoError)?;
            }
        }

        // Forward slashes keep the SQLite URL portable; mode=rwc creates the
        // file on first open.
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(LinkStoreError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(LinkStoreError::MigrationError)?;

        Ok(Self { pool })
    }

    /// Record the link produced by a successful cross-post.
    ///
    /// Fails if a link already exists for `local_post_id`; callers check
    /// [`LinkStore::has_link`] before attempting the remote creation.
    pub async fn record_link(&self, local_post_id: &str, remote: &RemotePost) -> Result<()> {
        let payload = serde_json::to_string(remote).map_err(LinkStoreError::Serialization)?;

        sqlx::query(
            r#"
            INSERT INTO cross_post_links (local_post_id, remote_post, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(local_post_id)
        .bind(payload)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(LinkStoreError::SqlxError)?;

        Ok(())
    }

    /// Get the link for a local content item, if any.
    pub async fn get_link(&self, local_post_id: &str) -> Result<Option<CrossPostLink>> {
        let row = sqlx::query(
            r#"
            SELECT local_post_id, remote_post, created_at
            FROM cross_post_links WHERE local_post_id = ?
            "#,
        )
        .bind(local_post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LinkStoreError::SqlxError)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let payload: String = row.get("remote_post");
                let remote_post: RemotePost =
                    serde_json::from_str(&payload).map_err(LinkStoreError::Serialization)?;
                Ok(Some(CrossPostLink {
                    local_post_id: row.get("local_post_id"),
                    remote_post,
                    created_at: row.get("created_at"),
                }))
            }
        }
    }

    /// Whether a cross-post link exists for the local content item.
    pub async fn has_link(&self, local_post_id: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n FROM cross_post_links WHERE local_post_id = ?
            "#,
        )
        .bind(local_post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(LinkStoreError::SqlxError)?;

        let count: i64 = row.get("n");
        Ok(count > 0)
    }

    /// Remove a link, returning whether one existed.
    pub async fn remove_link(&self, local_post_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM cross_post_links WHERE local_post_id = ?
            "#,
        )
        .bind(local_post_id)
        .execute(&self.pool)
        .await
        .map_err(LinkStoreError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn temp_store(dir: &TempDir) -> LinkStore {
        let path = dir.path().join("links.db");
        LinkStore::new(path.to_str().unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_record_and_get_link() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir).await;

        let remote = RemotePost::from(json!({"id": "remote-1", "title": "hello"}));
        store.record_link("local-1", &remote).await.unwrap();

        let link = store.get_link("local-1").await.unwrap().unwrap();
        assert_eq!(link.local_post_id, "local-1");
        assert_eq!(link.remote_post, remote);
        assert!(link.created_at > 1_600_000_000);
    }

    #[tokio::test]
    async fn test_get_link_absent() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir).await;

        assert!(store.get_link("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_has_link() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir).await;

        assert!(!store.has_link("local-2").await.unwrap());
        let remote = RemotePost::from(json!({"id": "remote-2"}));
        store.record_link("local-2", &remote).await.unwrap();
        assert!(store.has_link("local-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_link_rejected() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir).await;

        let remote = RemotePost::from(json!({"id": "remote-3"}));
        store.record_link("local-3", &remote).await.unwrap();
        let second = store.record_link("local-3", &remote).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_remove_link() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir).await;

        let remote = RemotePost::from(json!({"id": "remote-4"}));
        store.record_link("local-4", &remote).await.unwrap();

        assert!(store.remove_link("local-4").await.unwrap());
        assert!(!store.has_link("local-4").await.unwrap());
        assert!(!store.remove_link("local-4").await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = LinkStore::new(":memory:").await.unwrap();

        let remote = RemotePost::from(json!({"id": "remote-6", "title": "ephemeral"}));
        store.record_link("local-6", &remote).await.unwrap();

        assert!(store.has_link("local-6").await.unwrap());
        let link = store.get_link("local-6").await.unwrap().unwrap();
        assert_eq!(link.remote_post, remote);
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.db");
        let path_str = path.to_str().unwrap();

        {
            let store = LinkStore::new(path_str).await.unwrap();
            let remote = RemotePost::from(json!({"id": "remote-5"}));
            store.record_link("local-5", &remote).await.unwrap();
        }

        let reopened = LinkStore::new(path_str).await.unwrap();
        assert!(reopened.has_link("local-5").await.unwrap());
    }
}
