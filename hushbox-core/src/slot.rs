use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// An owned handle to at most one background task.
///
/// Arming a slot aborts whatever it held before, and dropping the slot aborts
/// the task it holds. Every arm bumps the generation; tasks report back with
/// the generation they were armed with so signals that were already queued
/// when their task got cancelled can be told apart from live ones.
#[derive(Debug)]
pub struct TaskSlot {
    label: &'static str,
    generation: u64,
    handle: Option<AbortHandle>,
}

impl TaskSlot {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            generation: 0,
            handle: None,
        }
    }

    /// Cancel the current task (if any) and spawn a replacement.
    ///
    /// `spawn` receives the generation assigned to the new task.
    pub fn arm<F, Fut>(&mut self, spawn: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let handle = tokio::spawn(spawn(generation));
        self.handle = Some(handle.abort_handle());
        log::trace!("{} armed (generation {})", self.label, generation);
        generation
    }

    /// Abort the held task. Signals it already queued become stale.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::trace!("{} cancelled (generation {})", self.label, self.generation);
        }
    }

    /// True when `generation` belongs to the task currently held.
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && self.generation == generation
    }

    /// Accept the single signal of a one-shot task and release the slot.
    pub fn take_fired(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.handle = None;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Send `signal` once after `delay`.
pub async fn fire_after<S>(delay: Duration, tx: UnboundedSender<S>, signal: S)
where
    S: Send + 'static,
{
    time::sleep(delay).await;
    let _ = tx.send(signal);
}

/// Send `make()` every `period`, first one `period` from now, until the
/// receiver goes away or the task is aborted.
pub async fn fire_every<S, F>(period: Duration, tx: UnboundedSender<S>, make: F)
where
    S: Send + 'static,
    F: Fn() -> S + Send + 'static,
{
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if tx.send(make()).is_err() {
            break;
        }
    }
}
