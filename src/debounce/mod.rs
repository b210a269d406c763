//! Deferring of formatting passes until the input stops changing.
//!
//! A [`Debouncer`] holds at most one pending value. Every new value replaces
//! the pending one and restarts the quiescence window, so when the input
//! settles exactly one pass runs, with the latest value.
//!
//! The debouncer does not read the clock itself: the caller passes the
//! current [`Instant`] to every method. That makes it usable from any event
//! loop. With the `async-tokio` feature [`run`] drives it with `tokio` timers.
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use std::time::{Duration, Instant};
//! use xml_fold::debounce::Debouncer;
//!
//! let start = Instant::now();
//! let at = |ms| start + Duration::from_millis(ms);
//!
//! let mut debouncer = Debouncer::new(Duration::from_millis(300));
//! debouncer.push(at(0), "<");
//! debouncer.push(at(100), "<a");
//! debouncer.push(at(150), "<a/>");
//!
//! assert_eq!(debouncer.poll(at(449)), None);
//! assert_eq!(debouncer.poll(at(450)), Some("<a/>"));
//! assert_eq!(debouncer.poll(at(1000)), None);
//! ```

use std::time::{Duration, Instant};

#[cfg(feature = "async-tokio")]
mod async_tokio;

#[cfg(feature = "async-tokio")]
pub use async_tokio::run;

/// Quiescence window used by [`Debouncer::default`].
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Keeps the latest value until no new value arrives during a fixed delay.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    /// Pending value and the moment when it becomes ready
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    /// Creates a debouncer with the specified quiescence window
    #[inline]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiescence window of this debouncer
    #[inline]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `value` to be released after the quiescence window counted
    /// from `now`. Returns the pending value that was superseded, if any.
    pub fn push(&mut self, now: Instant, value: T) -> Option<T> {
        let superseded = self.pending.replace((now + self.delay, value));
        if superseded.is_some() {
            tracing::trace!("pending value superseded, window restarted");
        }
        superseded.map(|(_, value)| value)
    }

    /// The moment when the pending value becomes ready, if there is one
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Returns `true` if a value waits for its window to elapse
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Releases the pending value if its window has elapsed at `now`.
    ///
    /// Each value is released at most once.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if deadline <= now => self.take(),
            _ => None,
        }
    }

    /// Removes the pending value without waiting for its window.
    #[inline]
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    /// Drops the pending value, if any. Returns `true` if something was cancelled.
    #[inline]
    pub fn cancel(&mut self) -> bool {
        self.take().is_some()
    }
}

impl<T> Default for Debouncer<T> {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn idle() {
        let mut debouncer = Debouncer::<u32>::default();
        assert_eq!(debouncer.delay(), DEFAULT_DELAY);
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(Instant::now()), None);
        assert!(!debouncer.cancel());
    }

    #[test]
    fn single_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        assert_eq!(debouncer.push(start, 1), None);
        assert_eq!(debouncer.deadline(), Some(start + ms(300)));
        assert_eq!(debouncer.poll(start + ms(299)), None);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.poll(start + ms(300)), Some(1));
        assert!(!debouncer.is_pending());
    }

    /// Keystrokes at 0, 100 and 150 ms produce one pass at 450 ms
    #[test]
    fn burst() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        let mut fired = Vec::new();

        let keystrokes = [(0, "<"), (100, "<a"), (150, "<a/>")];
        let mut keystrokes = keystrokes.iter().peekable();
        for t in 0..1000 {
            let now = start + ms(t);
            while let Some((_, value)) = keystrokes.next_if(|(at, _)| *at == t) {
                debouncer.push(now, *value);
            }
            if let Some(value) = debouncer.poll(now) {
                fired.push((t, value));
            }
        }

        assert_eq!(fired, [(450, "<a/>")]);
    }

    #[test]
    fn superseded() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(10));

        assert_eq!(debouncer.push(start, "a"), None);
        assert_eq!(debouncer.push(start + ms(5), "b"), Some("a"));
        assert_eq!(debouncer.poll(start + ms(10)), None);
        assert_eq!(debouncer.poll(start + ms(15)), Some("b"));
    }

    #[test]
    fn cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(10));

        debouncer.push(start, "a");
        assert!(debouncer.cancel());
        assert_eq!(debouncer.poll(start + ms(100)), None);
    }

    #[test]
    fn separate_bursts() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(10));

        debouncer.push(start, "a");
        assert_eq!(debouncer.poll(start + ms(10)), Some("a"));
        debouncer.push(start + ms(20), "b");
        assert_eq!(debouncer.poll(start + ms(25)), None);
        assert_eq!(debouncer.poll(start + ms(30)), Some("b"));
    }
}
