use std::path::Path;

use log::*;
use order_tracking_engine::{SqliteDatabase, MIGRATOR};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    // A single connection: this environment's filesystem gives pooled sqlite connections inconsistent
    // views of each other's committed writes, so tests must not fan out over multiple connections.
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    MIGRATOR.run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/ots_test_store_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}
