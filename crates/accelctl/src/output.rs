//! Human-readable rendering of an acceleration payload.
//!
//! Deterministic given a record: the engine already sorts Change lists,
//! so identical inputs render identically.

use console::style;
use owo_colors::OwoColorize;

use accel_common::{AccelerationRecord, ActiveStatus, ChangeResult};

pub fn render_status(record: &AccelerationRecord, verbose: bool) {
    println!(
        "{} platform={} mode={} active={}",
        style("acceleration").bold(),
        record.platform,
        record.mode.as_str(),
        status_tag(record.active_status),
    );

    for change in &record.changes_applied {
        println!(
            "  {} {:<26} {}",
            result_tag(change.result),
            change.name,
            change.message
        );
        if verbose {
            if let Some(command) = &change.command {
                println!("      $ {command}");
            }
        }
    }

    println!(
        "  applied {}  skipped {}  planned {}",
        record.applied_count, record.skipped_count, record.planned_count
    );

    if !record.failures.is_empty() {
        println!("  {}:", "failures".red());
        for failure in &record.failures {
            println!("    - {failure}");
        }
    }

    if let Some(message) = &record.message {
        println!("  {message}");
    }
}

fn status_tag(status: ActiveStatus) -> String {
    match status {
        ActiveStatus::True => status.as_str().green().to_string(),
        ActiveStatus::Partial => status.as_str().yellow().to_string(),
        ActiveStatus::False => status.as_str().dimmed().to_string(),
    }
}

/// Fixed-width colored result tag, so the name column lines up.
fn result_tag(result: ChangeResult) -> String {
    let text = format!("[{:<11}]", result.as_str());
    match result {
        ChangeResult::Applied | ChangeResult::Restored => text.green().to_string(),
        ChangeResult::Planned => text.cyan().to_string(),
        ChangeResult::Skipped => text.yellow().to_string(),
        ChangeResult::NotApplied => text.dimmed().to_string(),
    }
}
