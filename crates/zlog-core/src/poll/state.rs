// ── Subscription state machine ──
//
// One `PollState` per subscription, published through a `watch` channel.
// Every write is tagged with the epoch of the subscription that produced
// it; a write whose epoch is not the current one is rejected. This is the
// single guard against out-of-order responses after a descriptor change.

use std::sync::Arc;

use crate::error::FetchError;

/// Lifecycle phase of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// No descriptor; nothing has been requested.
    #[default]
    Idle,
    /// A request for the current epoch is in flight.
    Loading,
    /// The last request for the current epoch succeeded.
    Success,
    /// The last request for the current epoch failed.
    Failed,
    /// Polling was stopped; the last data is kept for display.
    Stopped,
}

/// Snapshot of a subscription, as seen by the rendering layer.
#[derive(Debug)]
pub struct PollState<T> {
    /// Last successful result. Survives re-polls and descriptor changes
    /// until replaced, so the view never flickers to empty.
    pub data: Option<Arc<T>>,
    pub phase: PollPhase,
    /// Most recent failure. Cleared by the next success or a restart.
    pub error: Option<FetchError>,
    /// Current subscription epoch.
    pub epoch: u64,
    data_epoch: Option<u64>,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            phase: PollPhase::Idle,
            error: None,
            epoch: 0,
            data_epoch: None,
        }
    }
}

impl<T> Clone for PollState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            phase: self.phase,
            error: self.error.clone(),
            epoch: self.epoch,
            data_epoch: self.data_epoch,
        }
    }
}

impl<T> PollState<T> {
    pub fn is_loading(&self) -> bool {
        self.phase == PollPhase::Loading
    }

    /// Whether `data` was produced by the current subscription, as opposed
    /// to being carried over from the previous descriptor.
    pub fn is_current(&self) -> bool {
        self.data.is_some() && self.data_epoch == Some(self.epoch)
    }

    /// Enter a new epoch. Data is kept, the error is cleared.
    pub(crate) fn restart(&mut self, epoch: u64) {
        self.epoch = epoch;
        self.phase = PollPhase::Loading;
        self.error = None;
    }

    /// Mark a re-poll in flight. Returns whether anything changed.
    ///
    /// The previous error stays visible until the request settles.
    pub(crate) fn begin(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.phase == PollPhase::Loading {
            return false;
        }
        self.phase = PollPhase::Loading;
        true
    }

    /// Record the outcome of a request issued under `epoch`.
    ///
    /// Returns `false`, leaving the state untouched, when `epoch` is stale.
    pub fn apply(&mut self, epoch: u64, result: Result<T, FetchError>) -> bool {
        if epoch != self.epoch {
            return false;
        }
        match result {
            Ok(data) => {
                self.data = Some(Arc::new(data));
                self.data_epoch = Some(epoch);
                self.error = None;
                self.phase = PollPhase::Success;
            }
            Err(err) => {
                // Data from the previous descriptor must not be shown as if
                // it belonged to this one.
                if self.data_epoch != Some(epoch) {
                    self.data = None;
                    self.data_epoch = None;
                }
                self.error = Some(err);
                self.phase = PollPhase::Failed;
            }
        }
        true
    }

    /// Freeze under a new epoch; any late response is rejected.
    pub(crate) fn stop(&mut self, epoch: u64) {
        self.epoch = epoch;
        if self.phase != PollPhase::Idle {
            self.phase = PollPhase::Stopped;
        }
    }

    /// Back to the empty idle state under a new epoch.
    pub(crate) fn reset(&mut self, epoch: u64) {
        *self = Self {
            epoch,
            ..Self::default()
        };
    }
}
