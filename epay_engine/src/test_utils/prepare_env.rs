use std::{env, path::PathBuf};

use log::*;

use crate::SqliteDatabase;

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Created Sqlite database {url}");
    db
}

/// A path for a throw-away database file in the system temp directory.
pub fn random_db_file() -> PathBuf {
    env::temp_dir().join(format!("epay_test_store_{}.db", rand::random::<u64>()))
}

pub fn random_db_path() -> String {
    format!("sqlite://{}", random_db_file().display())
}
