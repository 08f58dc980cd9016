// ── Polling subscriptions ──
//
// A `PollingFetcher` owns at most one background task per subscription.
// The task fetches immediately, then on every interval tick, one request
// at a time. Changing the descriptor cancels the task and starts a new
// one under a fresh epoch; `PollState::apply` rejects anything the old
// task manages to deliver afterwards.

mod state;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::FetchError;

pub use state::{PollPhase, PollState};

/// Shortest accepted polling period. Smaller values, zero included, are
/// raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn clamp_period(period: Duration) -> Duration {
    if period < MIN_POLL_INTERVAL {
        warn!(?period, min = ?MIN_POLL_INTERVAL, "poll interval below minimum, clamping");
        MIN_POLL_INTERVAL
    } else {
        period
    }
}

/// One kind of periodically fetched resource.
pub trait Fetch: Send + Sync + 'static {
    /// Everything that determines what is fetched. A change restarts the
    /// subscription.
    type Descriptor: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    type Output: Send + Sync + 'static;

    fn fetch(
        &self,
        descriptor: &Self::Descriptor,
    ) -> impl Future<Output = Result<Self::Output, FetchError>> + Send;
}

struct PollTask {
    cancel: CancellationToken,
}

/// Controller for a single polling subscription.
pub struct PollingFetcher<F: Fetch> {
    fetch: Arc<F>,
    state: Arc<watch::Sender<PollState<F::Output>>>,
    interval: watch::Sender<Duration>,
    descriptor: Option<F::Descriptor>,
    next_epoch: u64,
    task: Option<PollTask>,
}

impl<F: Fetch> PollingFetcher<F> {
    pub fn new(fetch: Arc<F>, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollState::default());
        let (interval, _) = watch::channel(clamp_period(interval));
        Self {
            fetch,
            state: Arc::new(state),
            interval,
            descriptor: None,
            next_epoch: 0,
            task: None,
        }
    }

    /// Subscribe to `descriptor`.
    ///
    /// No-op if already polling the same descriptor. Otherwise the running
    /// task is cancelled, a new epoch begins, and the first request is
    /// issued right away. Must be called within a Tokio runtime.
    pub fn start(&mut self, descriptor: F::Descriptor) {
        if self.task.is_some() && self.descriptor.as_ref() == Some(&descriptor) {
            return;
        }
        self.cancel_task();

        let epoch = self.bump_epoch();
        self.state.send_modify(|s| s.restart(epoch));
        debug!(epoch, ?descriptor, "subscription started");

        let cancel = CancellationToken::new();
        tokio::spawn(poll_loop(
            Arc::clone(&self.fetch),
            Arc::clone(&self.state),
            descriptor.clone(),
            epoch,
            self.interval.subscribe(),
            cancel.clone(),
        ));
        self.task = Some(PollTask { cancel });
        self.descriptor = Some(descriptor);
    }

    /// Cancel polling, keeping the last data visible.
    pub fn stop(&mut self) {
        self.cancel_task();
        let epoch = self.bump_epoch();
        self.state.send_modify(|s| s.stop(epoch));
        self.descriptor = None;
    }

    /// Cancel polling and clear all state.
    pub fn idle(&mut self) {
        self.cancel_task();
        let epoch = self.bump_epoch();
        self.state.send_modify(|s| s.reset(epoch));
        self.descriptor = None;
    }

    /// Change the polling period. Takes effect from the next tick without
    /// starting a new epoch.
    pub fn set_interval(&self, period: Duration) {
        let period = clamp_period(period);
        self.interval.send_if_modified(|current| {
            if *current == period {
                return false;
            }
            *current = period;
            true
        });
    }

    pub fn interval(&self) -> Duration {
        *self.interval.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<F::Output>> {
        self.state.subscribe()
    }

    /// Current state, cloned out of the channel.
    pub fn snapshot(&self) -> PollState<F::Output> {
        self.state.borrow().clone()
    }

    fn bump_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
        }
    }
}

impl<F: Fetch> Drop for PollingFetcher<F> {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

// ── Background task ──────────────────────────────────────────────────

fn ticker(period: Duration, first: Instant) -> tokio::time::Interval {
    let mut interval = tokio::time::interval_at(first, period);
    // A slow request pushes the next one out instead of firing a burst.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn poll_loop<F: Fetch>(
    fetch: Arc<F>,
    state: Arc<watch::Sender<PollState<F::Output>>>,
    descriptor: F::Descriptor,
    epoch: u64,
    mut period_rx: watch::Receiver<Duration>,
    cancel: CancellationToken,
) {
    let period = *period_rx.borrow_and_update();
    let mut interval = ticker(period, Instant::now());

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Ok(()) = period_rx.changed() => {
                let period = *period_rx.borrow_and_update();
                debug!(epoch, ?period, "poll interval changed");
                interval = ticker(period, Instant::now() + period);
                continue;
            }
            _ = interval.tick() => {}
        }

        state.send_if_modified(|s| s.begin(epoch));
        trace!(epoch, ?descriptor, "fetching");

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = fetch.fetch(&descriptor) => result,
        };

        if let Err(ref e) = result {
            warn!(epoch, ?descriptor, error = %e, "fetch failed");
        }

        if !state.send_if_modified(|s| s.apply(epoch, result)) {
            debug!(epoch, "discarding response from superseded subscription");
            break;
        }
    }

    trace!(epoch, "poll task exited");
}
