use vigia_core::recon;
use vigia_core::sgu::{validate_period, SguClient};

use super::load_config;

/// Run the `reconcile` command: compare two monthly HR snapshots and
/// print exonerated and transferred employees.
pub async fn run(config_path: &str, current: &str, previous: &str) -> anyhow::Result<()> {
    validate_period(current)?;
    validate_period(previous)?;

    let config = load_config(config_path)?;
    let sgu = SguClient::connect(&config.sgu).await?;

    for period in [current, previous] {
        if !sgu.snapshot_exists(period).await? {
            anyhow::bail!("no snapshot table for period {period}");
        }
    }

    let current_rows = sgu.snapshot(current).await?;
    let previous_rows = sgu.snapshot(previous).await?;
    let result = recon::reconcile(&current_rows, &previous_rows);

    println!("Reconciliation {previous} -> {current}");
    println!("=====================================");
    println!();
    println!("Exonerated ({})", result.exonerated_count());
    println!("----------");
    for employee in &result.exonerated {
        println!(
            "  {}  {}  [{}]",
            employee.employee_number,
            employee.full_name,
            employee.unit_label()
        );
    }
    println!();
    println!("Transferred ({})", result.transferred_count());
    println!("-----------");
    for transfer in &result.transferred {
        println!(
            "  {}  {}  {} -> {}",
            transfer.employee.employee_number,
            transfer.employee.full_name,
            transfer.previous_unit,
            transfer.current_unit
        );
    }

    Ok(())
}
