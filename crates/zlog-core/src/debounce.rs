// ── Filter debouncing ──
//
// Keystrokes land in `edit`; the text is committed once no edit has
// arrived for `delay`. Each edit pushes the deadline out, so a burst of
// typing commits exactly once with the final text. A commit is emitted
// only when it differs from the last committed value.

use std::time::Duration;

use tokio::time::Instant;

/// Deadline-based debouncer for free-text filter input.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    committed: String,
    pending: Option<String>,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self::with_value(delay, String::new())
    }

    /// Start with `initial` already committed.
    pub fn with_value(delay: Duration, initial: impl Into<String>) -> Self {
        Self {
            delay,
            committed: initial.into(),
            pending: None,
            deadline: None,
        }
    }

    /// Record a keystroke. Restarts the quiet period.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.pending = Some(text.into());
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Adopt an externally set value without emitting a commit. Any
    /// pending keystrokes are discarded.
    pub fn sync(&mut self, text: impl Into<String>) {
        self.committed = text.into();
        self.pending = None;
        self.deadline = None;
    }

    /// Drop pending input; the committed value is unchanged. Called on
    /// teardown so half-typed filters never reach the backend.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    /// Commit if the quiet period has elapsed at `now`.
    ///
    /// Returns the new value only when it differs from the previous commit.
    pub fn poll_commit(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        let text = self.pending.take()?;
        if text == self.committed {
            return None;
        }
        self.committed.clone_from(&text);
        Some(text)
    }

    /// Commit pending input now, skipping the rest of the quiet period.
    pub fn flush(&mut self) -> Option<String> {
        self.deadline?;
        self.poll_commit(Instant::now() + self.delay)
    }

    /// Sleep until the pending deadline, then commit.
    ///
    /// Resolves to `None` immediately when nothing is pending. Cancel-safe:
    /// dropping the future leaves the pending edit in place.
    pub async fn wait_commit(&mut self) -> Option<String> {
        let deadline = self.deadline?;
        tokio::time::sleep_until(deadline).await;
        self.poll_commit(Instant::now())
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }
}
