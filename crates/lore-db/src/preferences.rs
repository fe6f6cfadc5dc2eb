//! User preference key/value store. Last writer wins, no validation.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use lore_core::{Error, Preference, Result};

pub struct PreferenceStore {
    pool: SqlitePool,
}

impl PreferenceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO preference (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value,
                 updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<Preference>> {
        let row = sqlx::query("SELECT key, value, updated_at FROM preference WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|row| Preference {
            key: row.get("key"),
            value: row.get("value"),
            updated_at: row.get("updated_at"),
        }))
    }
}
