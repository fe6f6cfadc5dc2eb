//! Content metadata repository.
//!
//! Every write runs in a single transaction covering the row, the tag
//! links and the usage counters, so a failure midway leaves the store
//! unchanged.

use chrono::{Duration, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use lore_core::models::normalize_tags;
use lore_core::{ContentItem, ContentStats, ContentType, Error, NewContent, Result, TagCount};

use crate::tags;

/// Which columns a substring search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Title,
    Tags,
    Summary,
    All,
}

const SELECT_COLUMNS: &str = "id, file_path, title, content_type, source_url, file_size, \
     created_at, modified_at, tags, summary, key_takeaways, author, word_count, status";

/// Repository over the `content` table and its tag links.
pub struct ContentStore {
    pool: SqlitePool,
}

impl ContentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a content row, keyed by `file_path`.
    ///
    /// An existing row keeps its id and `created_at`; everything else is
    /// overwritten and the tag links fully replaced. Returns the row id.
    pub async fn add_content(&self, new: &NewContent) -> Result<i64> {
        let now = Utc::now();
        let tags = normalize_tags(&new.tags);
        let tags_json = serde_json::to_string(&tags)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM content WHERE file_path = ?")
                .bind(&new.file_path)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;

        let id = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE content SET title = ?, content_type = ?, source_url = ?,
                         file_size = ?, tags = ?, summary = ?, key_takeaways = ?,
                         author = ?, word_count = ?, modified_at = ?
                     WHERE id = ?",
                )
                .bind(&new.title)
                .bind(new.content_type.as_str())
                .bind(&new.source_url)
                .bind(new.file_size)
                .bind(&tags_json)
                .bind(&new.summary)
                .bind(&new.key_takeaways)
                .bind(&new.author)
                .bind(new.word_count)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
                id
            }
            None => {
                let row = sqlx::query(
                    "INSERT INTO content (file_path, title, content_type, source_url,
                         file_size, created_at, modified_at, tags, summary,
                         key_takeaways, author, word_count)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                     RETURNING id",
                )
                .bind(&new.file_path)
                .bind(&new.title)
                .bind(new.content_type.as_str())
                .bind(&new.source_url)
                .bind(new.file_size)
                .bind(now)
                .bind(now)
                .bind(&tags_json)
                .bind(&new.summary)
                .bind(&new.key_takeaways)
                .bind(&new.author)
                .bind(new.word_count)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
                row.get("id")
            }
        };

        tags::replace_links(&mut tx, id, &tags).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "store",
            op = "add_content",
            content_id = id,
            title = %new.title,
            "Recorded content metadata"
        );
        Ok(id)
    }

    pub async fn get_by_path(&self, file_path: &str) -> Result<Option<ContentItem>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM content WHERE file_path = ?",
            SELECT_COLUMNS
        ))
        .bind(file_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(row_to_item).transpose()
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<ContentItem>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM content WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(row_to_item).transpose()
    }

    /// All content, newest first, optionally filtered by type and capped.
    pub async fn list(
        &self,
        limit: Option<i64>,
        content_type: Option<ContentType>,
    ) -> Result<Vec<ContentItem>> {
        let mut sql = format!("SELECT {} FROM content", SELECT_COLUMNS);
        if content_type.is_some() {
            sql.push_str(" WHERE content_type = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        if limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(ct) = content_type {
            query = query.bind(ct.as_str());
        }
        if let Some(n) = limit {
            query = query.bind(n);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.into_iter().map(row_to_item).collect()
    }

    /// Items carrying any of the given tags (matched case-insensitively).
    pub async fn get_by_tags(&self, tags: &[String]) -> Result<Vec<ContentItem>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; tags.len()].join(", ");
        let sql = format!(
            "SELECT DISTINCT c.{} FROM content c
             JOIN content_tag ct ON c.id = ct.content_id
             JOIN tag t ON ct.tag_id = t.id
             WHERE t.name IN ({})
             ORDER BY c.created_at DESC, c.id DESC",
            SELECT_COLUMNS.replace(", ", ", c."),
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for tag in tags {
            query = query.bind(tag.trim().to_lowercase());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.into_iter().map(row_to_item).collect()
    }

    /// Replace the tag set of an existing item.
    pub async fn update_tags(&self, id: i64, raw_tags: &[String]) -> Result<()> {
        let tags = normalize_tags(raw_tags);
        let tags_json = serde_json::to_string(&tags)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let updated = sqlx::query(
            "UPDATE content SET tags = ?, modified_at = ? WHERE id = ?",
        )
        .bind(&tags_json)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound(format!("content id {}", id)));
        }

        tags::replace_links(&mut tx, id, &tags).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    /// Delete an item: links first, then the row, then zero-reference
    /// tags, all in one transaction.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM content_tag WHERE content_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let deleted = sqlx::query("DELETE FROM content WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if deleted.rows_affected() == 0 {
            return Err(Error::NotFound(format!("content id {}", id)));
        }

        tags::prune_unused(&mut tx).await?;
        tags::recompute_usage(&mut tx).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "store",
            op = "delete",
            content_id = id,
            "Deleted content metadata"
        );
        Ok(())
    }

    /// Case-insensitive substring search, newest first.
    pub async fn search(&self, query: &str, mode: SearchMode) -> Result<Vec<ContentItem>> {
        let pattern = format!("%{}%", query.to_lowercase());

        let rows = match mode {
            SearchMode::Title => {
                sqlx::query(&format!(
                    "SELECT {} FROM content WHERE LOWER(title) LIKE ?
                     ORDER BY created_at DESC, id DESC",
                    SELECT_COLUMNS
                ))
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await
            }
            SearchMode::Summary => {
                sqlx::query(&format!(
                    "SELECT {} FROM content WHERE LOWER(summary) LIKE ?
                     ORDER BY created_at DESC, id DESC",
                    SELECT_COLUMNS
                ))
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await
            }
            SearchMode::Tags => {
                sqlx::query(&format!(
                    "SELECT DISTINCT c.{} FROM content c
                     JOIN content_tag ct ON c.id = ct.content_id
                     JOIN tag t ON ct.tag_id = t.id
                     WHERE t.name LIKE ?
                     ORDER BY c.created_at DESC, c.id DESC",
                    SELECT_COLUMNS.replace(", ", ", c.")
                ))
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await
            }
            SearchMode::All => {
                sqlx::query(&format!(
                    "SELECT {} FROM content
                     WHERE LOWER(title) LIKE ? OR LOWER(summary) LIKE ? OR LOWER(tags) LIKE ?
                     ORDER BY created_at DESC, id DESC",
                    SELECT_COLUMNS
                ))
                .bind(&pattern)
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        rows.into_iter().map(row_to_item).collect()
    }

    /// Aggregate statistics: totals, per-type and per-day counts, top tags.
    pub async fn stats(&self) -> Result<ContentStats> {
        let total_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let by_type = sqlx::query(
            "SELECT content_type, COUNT(*) AS n FROM content
             GROUP BY content_type ORDER BY n DESC, content_type",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|row| (row.get::<String, _>("content_type"), row.get::<i64, _>("n")))
        .collect();

        let cutoff = Utc::now() - Duration::days(30);
        let by_day = sqlx::query(
            "SELECT DATE(created_at) AS day, COUNT(*) AS n FROM content
             WHERE created_at >= ?
             GROUP BY DATE(created_at) ORDER BY day DESC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|row| (row.get::<String, _>("day"), row.get::<i64, _>("n")))
        .collect();

        let top_tags = sqlx::query(
            "SELECT name, usage_count FROM tag
             ORDER BY usage_count DESC, name LIMIT 20",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|row| TagCount {
            name: row.get("name"),
            usage_count: row.get("usage_count"),
        })
        .collect();

        Ok(ContentStats {
            total_items,
            by_type,
            by_day,
            top_tags,
        })
    }
}

fn row_to_item(row: SqliteRow) -> Result<ContentItem> {
    let content_type: String = row.get("content_type");
    let tags_json: Option<String> = row.get("tags");
    let tags = match tags_json {
        Some(json) => serde_json::from_str(&json).unwrap_or_default(),
        None => Vec::new(),
    };

    Ok(ContentItem {
        id: row.get("id"),
        file_path: row.get("file_path"),
        title: row.get("title"),
        content_type: content_type.parse()?,
        source_url: row.get("source_url"),
        file_size: row.get("file_size"),
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
        tags,
        summary: row.get("summary"),
        key_takeaways: row.get("key_takeaways"),
        author: row.get("author"),
        word_count: row.get("word_count"),
        status: row.get("status"),
    })
}
