use std::time::Duration;

use crate::render::surface::{EventSource, InputEvent};

/// How a [`poll_until`] wait ended.
#[derive(Debug, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Ready(T),
    /// A quit event arrived before the value did.
    Cancelled,
}

/// Repeatedly poll `source` for events and run `attempt` until it yields a value.
///
/// Events are checked before every attempt, so a quit request ends the wait within one
/// `interval`. `attempt` gets the source back and may present to it between polls.
pub fn poll_until<S, T>(
    source: &mut S,
    interval: Duration,
    mut attempt: impl FnMut(&mut S) -> Option<T>,
) -> WaitOutcome<T>
where
    S: EventSource + ?Sized,
{
    let mut attempts: u64 = 0;
    loop {
        if source.poll().contains(&InputEvent::Quit) {
            tracing::info!(attempts, "wait cancelled by quit request");
            return WaitOutcome::Cancelled;
        }
        attempts += 1;
        if let Some(value) = attempt(source) {
            if attempts > 1 {
                tracing::debug!(attempts, "wait satisfied");
            }
            return WaitOutcome::Ready(value);
        }
        std::thread::sleep(interval);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/wait.rs"]
mod tests;
