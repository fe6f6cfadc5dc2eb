//! Tag repository and in-transaction tag maintenance helpers.
//!
//! Usage counters are never incremented in place. After any link change
//! they are recomputed from the join table inside the same transaction,
//! so a counter always equals the number of distinct items referencing
//! the tag.

use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use lore_core::{Error, Result, TagCount};

/// Read-side tag repository.
pub struct TagStore {
    pool: SqlitePool,
}

impl TagStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tags with usage counts, ordered by usage descending then name.
    pub async fn all_tags(&self) -> Result<Vec<TagCount>> {
        let rows = sqlx::query(
            "SELECT name, usage_count FROM tag ORDER BY usage_count DESC, name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| TagCount {
                name: row.get("name"),
                usage_count: row.get("usage_count"),
            })
            .collect())
    }
}

/// Replace all tag links for a content row. `tags` must already be
/// normalized. Counters are recomputed afterwards in the same
/// transaction.
pub(crate) async fn replace_links(
    tx: &mut Transaction<'_, Sqlite>,
    content_id: i64,
    tags: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM content_tag WHERE content_id = ?")
        .bind(content_id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO tag (name) VALUES (?)")
            .bind(tag)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        sqlx::query(
            "INSERT OR IGNORE INTO content_tag (content_id, tag_id)
             SELECT ?, id FROM tag WHERE name = ?",
        )
        .bind(content_id)
        .bind(tag)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    }

    recompute_usage(tx).await
}

/// Recompute every usage counter from the join table.
pub(crate) async fn recompute_usage(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query(
        "UPDATE tag SET usage_count =
             (SELECT COUNT(*) FROM content_tag WHERE content_tag.tag_id = tag.id)",
    )
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;
    Ok(())
}

/// Delete tags no content references.
pub(crate) async fn prune_unused(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query(
        "DELETE FROM tag WHERE id NOT IN (SELECT DISTINCT tag_id FROM content_tag)",
    )
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;
    Ok(())
}
