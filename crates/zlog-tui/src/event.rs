//! Terminal input pump for the dashboard loop.
//!
//! Key presses and resizes come from crossterm's `EventStream`; the tick
//! (throbbers, toast expiry) and render cadences come from two tokio
//! intervals. All four are merged onto one channel that `App::run` reads.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// New terminal size as (cols, rows).
    Resize(u16, u16),
    /// Animation and toast clock.
    Tick,
    /// Time to redraw.
    Render,
}

/// Map a raw crossterm event to a dashboard event. Only key presses and
/// resizes matter; mouse, focus, paste, and key release are dropped.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        _ => None,
    }
}

fn cadence(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    // A stalled draw skips frames rather than replaying them.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    /// Start the pump on the current runtime.
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let stop = cancel.clone();
        tokio::spawn(async move {
            let mut input = EventStream::new();
            let mut ticks = cadence(tick_rate);
            let mut frames = cadence(render_rate);

            loop {
                let event = tokio::select! {
                    () = stop.cancelled() => break,
                    _ = ticks.tick() => Event::Tick,
                    _ = frames.tick() => Event::Render,
                    Some(Ok(raw)) = input.next() => match translate(raw) {
                        Some(event) => event,
                        None => continue,
                    },
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// Next merged event; `None` once the pump has exited.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
