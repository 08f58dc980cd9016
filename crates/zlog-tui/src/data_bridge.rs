//! Data bridge — forwards `zlog-core` watch channels to TUI actions.
//!
//! Runs as a background task: pushes the current directory, logs, and stats
//! snapshots, then forwards every change as an [`Action`] through the TUI's
//! action channel until cancelled.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use zlog_core::{DirectoryState, LogsState, StatsState};

use crate::action::Action;

/// Receivers for every reactive piece of the dashboard.
pub struct Subscriptions {
    pub directory: watch::Receiver<DirectoryState>,
    pub logs: watch::Receiver<LogsState>,
    pub stats: watch::Receiver<StatsState>,
}

/// Spawn the data bridge connecting dashboard watch channels to the TUI.
pub async fn spawn_data_bridge(
    subs: Subscriptions,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let Subscriptions {
        mut directory,
        mut logs,
        mut stats,
    } = subs;

    // Push initial snapshots so panels have data immediately
    let _ = action_tx.send(Action::ProjectsUpdated(
        directory.borrow_and_update().clone(),
    ));
    let _ = action_tx.send(Action::LogsUpdated(logs.borrow_and_update().clone()));
    let _ = action_tx.send(Action::StatsUpdated(stats.borrow_and_update().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = directory.changed() => {
                let snapshot = directory.borrow_and_update().clone();
                let _ = action_tx.send(Action::ProjectsUpdated(snapshot));
            }
            Ok(()) = logs.changed() => {
                let snapshot = logs.borrow_and_update().clone();
                debug!(phase = ?snapshot.phase, epoch = snapshot.epoch, "dispatching LogsUpdated");
                let _ = action_tx.send(Action::LogsUpdated(snapshot));
            }
            Ok(()) = stats.changed() => {
                let snapshot = stats.borrow_and_update().clone();
                let _ = action_tx.send(Action::StatsUpdated(snapshot));
            }

            // Every sender dropped
            else => break,
        }
    }

    debug!("data bridge shut down");
}
