use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "vigia", about = "Account hygiene portal for AD and HR data", version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "vigia.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Initialize Vigia data directory and configuration
    Init {
        /// Data directory path
        #[arg(long, default_value = "/var/lib/vigia")]
        data_dir: String,
    },
    /// Compare two monthly HR snapshots
    Reconcile {
        /// Current period (YYYY_MM)
        current: String,
        /// Previous period (YYYY_MM)
        previous: String,
    },
    /// Resolve logins against the directory and SGU, updating tickets
    Resolve {
        /// Logins to resolve
        #[arg(required = true)]
        logins: Vec<String>,
        /// Actor recorded on created/updated tickets
        #[arg(long, default_value = "cli")]
        actor: String,
    },
    /// Show instance status and ticket statistics
    Status,
    /// Start the admin API web server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => {
            commands::init::run(&data_dir).await?;
        }
        Commands::Reconcile { current, previous } => {
            commands::reconcile::run(&cli.config, &current, &previous).await?;
        }
        Commands::Resolve { logins, actor } => {
            commands::resolve::run(&cli.config, &logins, &actor).await?;
        }
        Commands::Status => {
            commands::status::run(&cli.config).await?;
        }
        Commands::Serve { port } => {
            commands::serve::run(&cli.config, port).await?;
        }
    }

    Ok(())
}
