mod models;
mod schema;
mod store;

pub use models::{Artist, Song, SongPlay, TimeEntry, User};
pub use schema::WAREHOUSE_SCHEMA_SQL;
pub use store::{RowCounts, SqliteWarehouseStore, WarehouseStore};
