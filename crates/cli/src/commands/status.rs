use vigia_core::db::repository::{
    InactiveComputerRepository, InactiveUserRepository, TicketFilter, TicketRepository,
};
use vigia_core::models::ticket::TicketStatus;

use super::{load_config, open_repo};

/// Run the `status` command: show instance and ticket statistics.
pub async fn run(config_path: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let db_size = std::fs::metadata(&config.vigia.database.path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());

    let repo = open_repo(&config).await?;

    println!("Vigia Status");
    println!("============");
    println!("Instance: {}", config.vigia.instance_name);
    println!("Database: SQLite ({})", db_size);
    println!();

    let tickets = repo.list_tickets(&TicketFilter::default()).await?;
    let open = tickets.iter().filter(|t| !t.fechado).count();

    println!("Tickets");
    println!("-------");
    println!("Total: {}  (open: {}, closed: {})", tickets.len(), open, tickets.len() - open);
    for status in [
        TicketStatus::Pendente,
        TicketStatus::Excluir,
        TicketStatus::Manter,
        TicketStatus::Transferir,
        TicketStatus::Bloquear,
        TicketStatus::Desbloquear,
    ] {
        let n = tickets.iter().filter(|t| t.status_ticket == status).count();
        if n > 0 {
            println!("  {:<12} {}", status.as_str(), n);
        }
    }
    println!();

    let inactive_users = repo.list_inactive_users().await?;
    let inactive_computers = repo.list_inactive_computers().await?;
    println!("Inactive Tracking");
    println!("-----------------");
    println!("Users:     {}", inactive_users.len());
    println!("Computers: {}", inactive_computers.len());

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_displays_correctly() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(1073741824), "1.0 GB");
    }
}
