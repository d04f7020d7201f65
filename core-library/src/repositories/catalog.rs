//! Catalog repository trait and SQLite implementation

use crate::error::{LibraryError, Result};
use crate::models::{validate_progress, CatalogRecord, NewCatalogRecord, RecordId, SyncState};
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use bridge_traits::time::{Clock, SystemClock};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, instrument};

const SELECT_COLUMNS: &str =
    "SELECT id, name, content_ref, sync_state, sync_progress, created_at FROM media_files";

/// Durable storage for catalog records.
///
/// Each operation is atomic on its own; callers compose them.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a record in the `Unsynced` state with progress 0.
    ///
    /// # Errors
    /// Returns error if validation fails or the database rejects the row.
    async fn insert(&self, record: &NewCatalogRecord) -> Result<CatalogRecord>;

    /// Find a record by its ID
    async fn find_by_id(&self, id: RecordId) -> Result<Option<CatalogRecord>>;

    /// Find the first record carrying `name`
    async fn find_by_name(&self, name: &str) -> Result<Option<CatalogRecord>>;

    /// All records in insertion order
    async fn list_all(&self) -> Result<Vec<CatalogRecord>>;

    /// Records in insertion order, one page at a time
    async fn query(&self, page_request: PageRequest) -> Result<Page<CatalogRecord>>;

    /// Set state and progress together.
    ///
    /// # Errors
    /// - `InvalidInput` if `progress` is outside 0..=100
    /// - `NotFound` if no record has this ID
    async fn update_sync_state(
        &self,
        id: RecordId,
        state: SyncState,
        progress: f64,
    ) -> Result<()>;

    /// Raise the progress of an uploading record.
    ///
    /// Only applies while the record is `Uploading` and `progress` exceeds the
    /// stored value, so progress never moves backwards.
    ///
    /// # Returns
    /// - `Ok(true)` if the stored progress changed
    /// - `Ok(false)` if the update did not apply
    async fn update_sync_progress(&self, id: RecordId, progress: f64) -> Result<bool>;

    /// Move every record to `Unsynced` with progress 0. Returns the count.
    async fn reset_all(&self) -> Result<u64>;

    /// Delete a record by ID
    ///
    /// # Returns
    /// - `Ok(true)` if the record was deleted
    /// - `Ok(false)` if it was not found
    async fn delete(&self, id: RecordId) -> Result<bool>;

    /// Delete every record. Returns the count.
    async fn clear(&self) -> Result<u64>;

    async fn count(&self) -> Result<i64>;

    async fn count_by_state(&self, state: SyncState) -> Result<i64>;
}

/// SQLite implementation of CatalogRepository
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteCatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    /// Use `clock` for `created_at` timestamps
    pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn validate_record(record: &NewCatalogRecord) -> Result<()> {
        record.validate().map_err(|msg| LibraryError::invalid("CatalogRecord", msg))
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    #[instrument(skip(self, record), fields(name = %record.name))]
    async fn insert(&self, record: &NewCatalogRecord) -> Result<CatalogRecord> {
        Self::validate_record(record)?;

        let created_at = self.clock.unix_timestamp_millis();
        let result = sqlx::query(
            r#"
            INSERT INTO media_files (name, content_ref, sync_state, sync_progress, created_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(&record.name)
        .bind(record.content_ref.as_str())
        .bind(SyncState::Unsynced)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = RecordId(result.last_insert_rowid());
        debug!(record_id = %id, "Inserted catalog record");

        Ok(CatalogRecord {
            id,
            name: record.name.clone(),
            content_ref: record.content_ref.clone(),
            sync_state: SyncState::Unsynced,
            sync_progress: 0.0,
            created_at,
        })
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<CatalogRecord>> {
        let record = sqlx::query_as::<_, CatalogRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CatalogRecord>> {
        let record = sqlx::query_as::<_, CatalogRecord>(&format!(
            "{SELECT_COLUMNS} WHERE name = ? ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<CatalogRecord>> {
        let records = sqlx::query_as::<_, CatalogRecord>(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn query(&self, page_request: PageRequest) -> Result<Page<CatalogRecord>> {
        let total = self.count().await?;
        let items = sqlx::query_as::<_, CatalogRecord>(&format!(
            "{SELECT_COLUMNS} ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(page_request.limit() as i64)
        .bind(page_request.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total as u64, page_request))
    }

    #[instrument(skip(self))]
    async fn update_sync_state(
        &self,
        id: RecordId,
        state: SyncState,
        progress: f64,
    ) -> Result<()> {
        validate_progress(progress).map_err(|msg| LibraryError::invalid("sync_progress", msg))?;

        let result = sqlx::query(
            r#"
            UPDATE media_files
            SET sync_state = ?, sync_progress = ?
            WHERE id = ?
            "#,
        )
        .bind(state)
        .bind(progress)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::RecordNotFound(id));
        }

        Ok(())
    }

    async fn update_sync_progress(&self, id: RecordId, progress: f64) -> Result<bool> {
        validate_progress(progress).map_err(|msg| LibraryError::invalid("sync_progress", msg))?;

        let result = sqlx::query(
            r#"
            UPDATE media_files
            SET sync_progress = ?
            WHERE id = ? AND sync_state = ? AND sync_progress < ?
            "#,
        )
        .bind(progress)
        .bind(id)
        .bind(SyncState::Uploading)
        .bind(progress)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn reset_all(&self) -> Result<u64> {
        let result = sqlx::query("UPDATE media_files SET sync_state = ?, sync_progress = 0")
            .bind(SyncState::Unsynced)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: RecordId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media_files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM media_files")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_files")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_state(&self, state: SyncState) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_files WHERE sync_state = ?")
            .bind(state)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use bridge_traits::time::ManualClock;

    async fn create_repo() -> SqliteCatalogRepository {
        let pool = create_test_pool().await.unwrap();
        SqliteCatalogRepository::with_clock(pool, Arc::new(ManualClock::at_millis(1_699_200_000_000)))
    }

    fn new_record(name: &str) -> NewCatalogRecord {
        NewCatalogRecord::new(name, format!("file:///photos/{}", name))
    }

    #[tokio::test]
    async fn test_insert_and_find_record() {
        let repo = create_repo().await;

        let inserted = repo.insert(&new_record("a.jpg")).await.unwrap();
        assert_eq!(inserted.sync_state, SyncState::Unsynced);
        assert_eq!(inserted.sync_progress, 0.0);
        assert_eq!(inserted.created_at, 1_699_200_000_000);

        let found = repo.find_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(found, inserted);
        assert_eq!(found.content_ref.as_str(), "file:///photos/a.jpg");

        let by_name = repo.find_by_name("a.jpg").await.unwrap().unwrap();
        assert_eq!(by_name.id, inserted.id);
        assert!(repo.find_by_name("b.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_record() {
        let repo = create_repo().await;

        let result = repo.insert(&NewCatalogRecord::new("", "file:///x")).await;
        assert!(matches!(result, Err(LibraryError::InvalidInput { .. })));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_all_in_insertion_order() {
        let repo = create_repo().await;
        for name in ["c.jpg", "a.jpg", "b.jpg"] {
            repo.insert(&new_record(name)).await.unwrap();
        }

        let names: Vec<_> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["c.jpg", "a.jpg", "b.jpg"]);
    }

    #[tokio::test]
    async fn test_query_pages() {
        let repo = create_repo().await;
        for i in 0..5 {
            repo.insert(&new_record(&format!("{}.jpg", i))).await.unwrap();
        }

        let page = repo.query(PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "2.jpg");
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_update_sync_state() {
        let repo = create_repo().await;
        let record = repo.insert(&new_record("a.jpg")).await.unwrap();

        repo.update_sync_state(record.id, SyncState::Uploading, 0.0)
            .await
            .unwrap();
        let found = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(found.sync_state, SyncState::Uploading);

        let missing = repo
            .update_sync_state(RecordId(999), SyncState::Synced, 0.0)
            .await;
        assert!(matches!(missing, Err(LibraryError::RecordNotFound(_))));

        let out_of_range = repo
            .update_sync_state(record.id, SyncState::Uploading, 120.0)
            .await;
        assert!(matches!(out_of_range, Err(LibraryError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_requires_uploading() {
        let repo = create_repo().await;
        let record = repo.insert(&new_record("a.jpg")).await.unwrap();

        // Not uploading yet
        assert!(!repo.update_sync_progress(record.id, 10.0).await.unwrap());

        repo.update_sync_state(record.id, SyncState::Uploading, 0.0)
            .await
            .unwrap();
        assert!(repo.update_sync_progress(record.id, 40.0).await.unwrap());
        assert!(!repo.update_sync_progress(record.id, 25.0).await.unwrap());
        assert!(!repo.update_sync_progress(record.id, 40.0).await.unwrap());

        let found = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(found.sync_progress, 40.0);
    }

    #[tokio::test]
    async fn test_reset_all_and_count_by_state() {
        let repo = create_repo().await;
        let a = repo.insert(&new_record("a.jpg")).await.unwrap();
        let b = repo.insert(&new_record("b.jpg")).await.unwrap();

        repo.update_sync_state(a.id, SyncState::Synced, 0.0).await.unwrap();
        repo.update_sync_state(b.id, SyncState::Uploading, 0.0).await.unwrap();
        repo.update_sync_progress(b.id, 55.0).await.unwrap();
        assert_eq!(repo.count_by_state(SyncState::Synced).await.unwrap(), 1);

        assert_eq!(repo.reset_all().await.unwrap(), 2);
        assert_eq!(repo.count_by_state(SyncState::Unsynced).await.unwrap(), 2);
        for record in repo.list_all().await.unwrap() {
            assert_eq!(record.sync_progress, 0.0);
        }
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let repo = create_repo().await;
        let a = repo.insert(&new_record("a.jpg")).await.unwrap();
        repo.insert(&new_record("b.jpg")).await.unwrap();
        repo.insert(&new_record("c.jpg")).await.unwrap();

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 2);

        assert_eq!(repo.clear().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = create_repo().await;
        let first = repo.insert(&new_record("a.jpg")).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo.insert(&new_record("a.jpg")).await.unwrap();
        assert!(second.id > first.id);
    }
}
