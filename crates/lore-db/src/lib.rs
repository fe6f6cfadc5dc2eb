//! # lore-db
//!
//! SQLite metadata store for lorevault. One database file per vault,
//! created on first use, schema bootstrap idempotent.

pub mod content;
pub mod pool;
pub mod preferences;
pub mod schema;
pub mod tags;
pub mod test_fixtures;

pub use content::{ContentStore, SearchMode};
pub use sqlx::SqlitePool;
pub use pool::{create_pool, PoolConfig};
pub use preferences::PreferenceStore;
pub use schema::init_schema;
pub use tags::TagStore;
