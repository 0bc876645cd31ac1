use std::path::Path;

use tracing::info;

use vigia_core::config::VigiaConfig;
use vigia_core::db::DatabasePool;

/// Run the `init` command: create the data directory, write a default
/// config, and set up the database.
pub async fn run(data_dir: &str) -> anyhow::Result<()> {
    let data_path = Path::new(data_dir);

    if !data_path.exists() {
        std::fs::create_dir_all(data_path)?;
        info!("Created data directory: {}", data_dir);
    }

    let db_path = data_path.join("vigia.db");
    let db_path_str = db_path.to_string_lossy().to_string();

    // Default admin password, to be changed after first login
    let default_password = "vigia-admin";
    let admin_password_hash = vigia_console::auth::hash_password(default_password)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {e}"))?;

    let mut config = VigiaConfig::generate_default();
    config.vigia.data_dir = data_dir.to_string();
    config.vigia.database.path = db_path_str.clone();
    config.vigia.admin_password_hash = Some(admin_password_hash);

    let config_path = data_path.join("vigia.toml");
    let toml_str = toml::to_string_pretty(&config)?;
    std::fs::write(&config_path, &toml_str)?;
    info!("Wrote configuration to {}", config_path.display());

    let connect_str = format!("sqlite:{}?mode=rwc", db_path_str);
    DatabasePool::new_sqlite(&connect_str).await?;
    info!("Database initialized at {}", db_path_str);

    println!("Vigia initialized successfully!");
    println!("  Data directory: {}", data_dir);
    println!("  Configuration: {}", config_path.display());
    println!("  Database:      {}", db_path_str);
    println!("  Admin password: {}", default_password);
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} with your LDAP and SGU connection details",
        config_path.display()
    );
    println!("  2. Change the default admin password");
    println!("  3. Run `vigia status` to verify the setup");
    println!("  4. Run `vigia serve` to start the portal");

    Ok(())
}
