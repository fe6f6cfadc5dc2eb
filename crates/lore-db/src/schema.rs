//! Schema bootstrap.
//!
//! The schema is created on first open and every statement is
//! idempotent, so re-running against an existing vault is safe.

use sqlx::SqlitePool;
use tracing::debug;

use lore_core::{Error, Result};

const CREATE_CONTENT: &str = r#"
CREATE TABLE IF NOT EXISTS content (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    file_path     TEXT NOT NULL UNIQUE,
    title         TEXT NOT NULL,
    content_type  TEXT NOT NULL,
    source_url    TEXT,
    file_size     INTEGER NOT NULL DEFAULT 0,
    created_at    TIMESTAMP NOT NULL,
    modified_at   TIMESTAMP NOT NULL,
    tags          TEXT,
    summary       TEXT,
    key_takeaways TEXT,
    author        TEXT,
    word_count    INTEGER NOT NULL DEFAULT 0,
    status        TEXT NOT NULL DEFAULT 'completed'
)
"#;

const CREATE_TAG: &str = r#"
CREATE TABLE IF NOT EXISTS tag (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    usage_count INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_CONTENT_TAG: &str = r#"
CREATE TABLE IF NOT EXISTS content_tag (
    content_id INTEGER NOT NULL REFERENCES content (id) ON DELETE CASCADE,
    tag_id     INTEGER NOT NULL REFERENCES tag (id),
    PRIMARY KEY (content_id, tag_id)
)
"#;

const CREATE_PREFERENCE: &str = r#"
CREATE TABLE IF NOT EXISTS preference (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TIMESTAMP NOT NULL
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_content_created_at ON content (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_content_type ON content (content_type)",
    "CREATE INDEX IF NOT EXISTS idx_content_tag_tag ON content_tag (tag_id)",
];

/// Create all tables and indexes if they do not exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in [CREATE_CONTENT, CREATE_TAG, CREATE_CONTENT_TAG, CREATE_PREFERENCE]
        .iter()
        .chain(CREATE_INDEXES)
    {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(Error::Database)?;
    }

    debug!(
        subsystem = "db",
        component = "schema",
        op = "init",
        "Schema bootstrap complete"
    );
    Ok(())
}
