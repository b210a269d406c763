//! This is an implementation of a debounce loop over a `tokio` channel.
//! Timers come from `tokio::time`, so the loop follows a paused clock in tests.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};

use super::Debouncer;

/// Receives values from `input` and calls `pass` with the latest one after no
/// new value arrived during `delay`.
///
/// A value received while another one is pending replaces it and restarts
/// the window. When all senders are dropped, the pending value (if any) is
/// still released at the end of its window, then the function returns.
///
/// # Example
///
/// ```
/// # use pretty_assertions::assert_eq;
/// # tokio_test::block_on(async {
/// use std::time::Duration;
/// use tokio::sync::mpsc;
///
/// let (sender, receiver) = mpsc::unbounded_channel();
/// sender.send("<a>").unwrap();
/// sender.send("<a/>").unwrap();
/// drop(sender);
///
/// let mut passes = Vec::new();
/// xml_fold::debounce::run(receiver, Duration::from_millis(1), |input| passes.push(input)).await;
/// assert_eq!(passes, ["<a/>"]);
/// # })
/// ```
pub async fn run<T, F>(mut input: UnboundedReceiver<T>, delay: Duration, mut pass: F)
where
    F: FnMut(T),
{
    let mut debouncer = Debouncer::new(delay);
    loop {
        let deadline = match debouncer.deadline() {
            Some(deadline) => Instant::from_std(deadline),
            None => match input.recv().await {
                Some(value) => {
                    debouncer.push(Instant::now().into_std(), value);
                    continue;
                }
                None => return,
            },
        };

        tokio::select! {
            received = input.recv() => match received {
                Some(value) => {
                    debouncer.push(Instant::now().into_std(), value);
                }
                None => {
                    sleep_until(deadline).await;
                    if let Some(value) = debouncer.take() {
                        pass(value);
                    }
                    return;
                }
            },
            _ = sleep_until(deadline) => {
                if let Some(value) = debouncer.poll(Instant::now().into_std()) {
                    pass(value);
                }
            }
        }
    }
}
