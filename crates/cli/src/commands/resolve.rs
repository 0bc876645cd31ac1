use vigia_core::sgu::SguClient;
use vigia_directory::{DirectoryClient, Resolver};

use super::{load_config, open_repo};

/// Run the `resolve` command: resolve logins and upsert their tickets.
pub async fn run(config_path: &str, logins: &[String], actor: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let repo = open_repo(&config).await?;

    let directory = DirectoryClient::new(&config.directory);
    let sgu = SguClient::connect_lazy(&config.sgu)?;
    let resolver = Resolver::new(repo, directory, sgu);

    let report = resolver.resolve_batch(logins, actor).await;

    println!("Resolved {} of {} logins", report.resolved, report.outcomes.len());
    println!();
    for outcome in &report.outcomes {
        match (&outcome.ticket, &outcome.error) {
            (Some(ticket), _) => {
                println!(
                    "  {:<20} ldap={:<14} sgu={:<14} inativo={}d  ticket={}",
                    outcome.username,
                    ticket.status_ldap.as_str(),
                    ticket.status_sgu.as_str(),
                    ticket.days_inactive,
                    ticket.status_ticket.as_str()
                );
            }
            (None, Some(error)) => {
                println!("  {:<20} ERRO: {error}", outcome.username);
            }
            (None, None) => {}
        }
    }

    if report.errors > 0 {
        anyhow::bail!("{} of {} logins failed", report.errors, report.outcomes.len());
    }
    Ok(())
}
