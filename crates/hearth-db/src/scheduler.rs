//! Delayed-callback collaborator boundary.

use std::time::Duration;

/// Opaque handle to a pending one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// One-shot delayed callbacks on the single logical thread.
///
/// `run_delayed` arms a timer; when it fires the host calls
/// `Database::handle_timer` with the token. The callback runs at most
/// once, no earlier than `delay`, unless cancelled first; after `cancel`
/// returns, the associated callback is guaranteed not to run.
pub trait Scheduler {
    fn run_delayed(&mut self, delay: Duration) -> TimerToken;
    fn cancel(&mut self, token: TimerToken);
}
