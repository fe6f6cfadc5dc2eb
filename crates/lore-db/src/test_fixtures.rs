//! Test fixtures for store integration tests.
//!
//! Each [`TestDatabase`] owns a fresh temp-directory-backed SQLite file
//! with the schema bootstrapped, so tests are fully isolated and the
//! file disappears when the fixture drops.

use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::content::ContentStore;
use crate::pool::create_pool;
use crate::preferences::PreferenceStore;
use crate::schema::init_schema;
use crate::tags::TagStore;

/// A throwaway vault database with repositories ready to use.
pub struct TestDatabase {
    pub pool: SqlitePool,
    pub content: ContentStore,
    pub tags: TagStore,
    pub preferences: PreferenceStore,
    // Held so the backing directory outlives the pool.
    _dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let pool = create_pool(dir.path().join("test.db"))
            .await
            .expect("open test database");
        init_schema(&pool).await.expect("bootstrap schema");

        Self {
            content: ContentStore::new(pool.clone()),
            tags: TagStore::new(pool.clone()),
            preferences: PreferenceStore::new(pool.clone()),
            pool,
            _dir: dir,
        }
    }
}
