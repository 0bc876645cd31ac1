pub mod init;
pub mod reconcile;
pub mod resolve;
pub mod serve;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use vigia_core::config::VigiaConfig;
use vigia_core::db::sqlite::SqliteRepository;
use vigia_core::db::DatabasePool;

/// Load and validate configuration from a path.
pub(crate) fn load_config(config_path: &str) -> anyhow::Result<VigiaConfig> {
    let config = VigiaConfig::load(Path::new(config_path))?;
    config.validate()?;
    Ok(config)
}

/// Open the local SQLite store named by the configuration.
pub(crate) async fn open_repo(config: &VigiaConfig) -> anyhow::Result<Arc<SqliteRepository>> {
    let connect_str = format!("sqlite:{}?mode=rwc", config.vigia.database.path);
    let DatabasePool::Sqlite(pool) = DatabasePool::new_sqlite(&connect_str).await?;
    Ok(Arc::new(SqliteRepository::new(pool)))
}
