use bridge_engine::SqliteDatabase;
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Drops any leftover database at `url`, creates a fresh one, runs the migrations and hands back a connected
/// store.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        Sqlite::drop_database(url).await.expect("Error dropping old test database");
    }
    Sqlite::create_database(url).await.expect("Error creating test database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    format!("sqlite://../data/test_bridge_{}.db", rand::random::<u64>())
}
