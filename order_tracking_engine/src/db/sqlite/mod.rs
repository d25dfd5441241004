pub mod db;

pub mod archive;
pub mod investments;
pub mod markers;
pub mod orders;

use std::env;

pub use db::SqliteDatabase;
use log::info;
use sqlx::{migrate::Migrator, sqlite::SqlitePoolOptions, SqlitePool};

use super::common::StoreError;

pub static MIGRATOR: Migrator = sqlx::migrate!("./src/db/sqlite/migrations");

const SQLITE_DB_URL: &str = "sqlite://data/order_store.db";

pub fn db_url() -> String {
    let result = env::var("OTS_DATABASE_URL").unwrap_or_else(|_| {
        info!("OTS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, StoreError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
