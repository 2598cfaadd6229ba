//! `watch` command: long-running sort sessions driven by page events.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use tubesort_config::Config;
use tubesort_pages::SnapshotWatcher;
use tubesort_protocols::PageEvent;
use tubesort_reconcile::{
    CancellationToken, ControllerConfig, ControllerHandle, ReconcileError, RetryOutcome,
    SessionController, SessionReport,
};

use crate::adapters::{playlist_url, Components, PageSource};

const PAGE_EVENT_BUFFER: usize = 32;

/// Run sort sessions until Ctrl-C.
///
/// With a snapshot page every navigation to a playlist starts a session. In
/// mirror mode the configured playlist is activated once and the command
/// returns when that session ends.
pub(crate) async fn run_watch(
    config: &Config,
    components: Components,
) -> Result<(), Box<dyn std::error::Error>> {
    let (controller, handle) =
        SessionController::new(components.reconciler.clone(), ControllerConfig::from_config(config));
    supervise(config, &components, controller, handle).await
}

/// Run `controller` while page events are fed to it, then stop it.
async fn supervise(
    config: &Config,
    components: &Components,
    controller: SessionController,
    handle: ControllerHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reports = handle.subscribe();
    let controller_task = tokio::spawn(controller.run());
    let cancel = CancellationToken::new();

    let result = drive_source(config, components, &handle, &mut reports, &cancel).await;

    cancel.cancel();
    if let Err(e) = handle.shutdown().await {
        warn!("Controller already stopped: {}", e);
    }
    controller_task.await?;

    result
}

/// Feed page events into the controller until the command should stop.
///
/// Errors return here so the caller can still stop the controller.
async fn drive_source(
    config: &Config,
    components: &Components,
    handle: &ControllerHandle,
    reports: &mut broadcast::Receiver<SessionReport>,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    match &components.source {
        PageSource::Snapshot(path) => {
            let (page_tx, page_rx) = mpsc::channel(PAGE_EVENT_BUFFER);
            let debounce = Duration::from_millis(config.page.debounce_ms);
            SnapshotWatcher::new(path.clone(), debounce).spawn(page_tx, cancel.clone())?;
            tokio::spawn(forward_page_events(page_rx, handle.clone()));

            info!("Watching {} for playlist pages (Ctrl-C to stop)", path.display());
            watch_reports(reports).await;
            Ok(())
        }
        PageSource::Mirror => {
            handle
                .page_event(PageEvent::Navigated {
                    url: playlist_url(&components.playlist_id),
                })
                .await?;
            info!("Sorting playlist {} (Ctrl-C to stop)", components.playlist_id);
            wait_for_first_report(reports).await?;
            Ok(())
        }
    }
}

async fn forward_page_events(mut page_rx: mpsc::Receiver<PageEvent>, handle: ControllerHandle) {
    while let Some(event) = page_rx.recv().await {
        if handle.page_event(event).await.is_err() {
            break;
        }
    }
}

/// Log session reports until Ctrl-C.
async fn watch_reports(reports: &mut broadcast::Receiver<SessionReport>) {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return;
            }
            received = reports.recv() => match received {
                Ok(report) => log_report(&report),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Missed {} session report(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
        }
    }
}

/// Wait for the single mirror-mode session to finish.
async fn wait_for_first_report(
    reports: &mut broadcast::Receiver<SessionReport>,
) -> Result<(), ReconcileError> {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
        received = reports.recv() => match received {
            Ok(report) => {
                log_report(&report);
                match report.outcome.as_error() {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            }
            Err(_) => Err(ReconcileError::ControllerClosed),
        },
    }
}

fn log_report(report: &SessionReport) {
    match report.outcome {
        RetryOutcome::Succeeded { attempts } => {
            info!("Sorted {} after {} attempt(s)", report.url, attempts);
        }
        RetryOutcome::Exhausted { attempts } => {
            error!(
                "Gave up sorting {} after {} attempt(s); reload the page or run `tubesort sort`",
                report.url, attempts
            );
        }
        RetryOutcome::Cancelled { attempts } => {
            info!("Session for {} cancelled after {} attempt(s)", report.url, attempts);
        }
    }
}
