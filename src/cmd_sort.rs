//! One-shot `sort` and `plan` commands.

use tracing::info;

use tubesort_reconcile::{ExclusionReason, ReconcileReport};

use crate::adapters::Components;

/// Run one reconcile attempt.
pub(crate) async fn run_sort(components: &Components) -> Result<(), Box<dyn std::error::Error>> {
    info!("Sorting playlist {}", components.playlist_id);
    let report = components.reconciler.attempt().await?;

    println!(
        "Sorted playlist {} {}: {} position update(s)",
        components.playlist_id,
        components.reconciler.direction(),
        report.calls_issued
    );
    for line in exclusion_lines(&report) {
        println!("{}", line);
    }
    Ok(())
}

/// Print the target order without changing the playlist.
pub(crate) async fn run_plan(
    components: &Components,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = components.reconciler.plan().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Target order for playlist {} ({}):",
        components.playlist_id,
        components.reconciler.direction()
    );
    for line in plan_lines(&report) {
        println!("{}", line);
    }
    for line in exclusion_lines(&report) {
        println!("{}", line);
    }
    Ok(())
}

fn plan_lines(report: &ReconcileReport) -> Vec<String> {
    report
        .ordered
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let key = entry.sort_key.map(|k| k.to_string()).unwrap_or_default();
            format!("{:>4}  {}  {}", position, key, entry.label)
        })
        .collect()
}

fn exclusion_lines(report: &ReconcileReport) -> Vec<String> {
    report
        .excluded
        .iter()
        .map(|exclusion| {
            let reason = match exclusion.reason {
                ExclusionReason::MissingLabel => "no title",
                ExclusionReason::NoTimestamp => "no timestamp",
                ExclusionReason::NoRemoteMatch => "not found in playlist",
            };
            format!(
                "skipped #{} {:?}: {}",
                exclusion.index,
                exclusion.label.as_deref().unwrap_or(""),
                reason
            )
        })
        .collect()
}
