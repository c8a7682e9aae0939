use std::time::Instant;

use futures::executor::ThreadPool;
use futures::future::abortable;
use futures::FutureExt;
use once_cell::sync::Lazy;
use tracing::Level;

use super::{Duration, Scheduler};
use crate::subscription::{BoxSubscription, CompositeSubscription, SingleAssignmentSubscription, Subscription};
use crate::trace::Tracer;

static DEFAULT_POOL: Lazy<ThreadPool> =
  Lazy::new(|| ThreadPool::new().expect("create default thread pool failed."));

/// Runs actions on a `futures` thread pool, delays included.
///
/// Every schedule spawns one abortable task that sleeps for the delay and
/// then runs the action. Unsubscribing aborts the task if it has not started
/// the action yet; if the action is already running it finishes, and its
/// result is disposed as soon as it is returned.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
  epoch: Instant,
  tracer: Tracer,
}

impl ThreadPoolScheduler {
  /// A scheduler on the shared default pool.
  pub fn new() -> Self { Self::with_pool(DEFAULT_POOL.clone(), Tracer::disabled()) }

  pub fn with_pool(pool: ThreadPool, tracer: Tracer) -> Self {
    Self { pool, epoch: Instant::now(), tracer }
  }
}

impl Default for ThreadPoolScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for ThreadPoolScheduler {
  fn now(&self) -> Duration { self.epoch.elapsed() }

  fn schedule_relative<S: Send + 'static>(
    &self, delay: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription {
    let slot = SingleAssignmentSubscription::new();
    let c_slot = slot.clone();
    let this = self.clone();
    let (task, abort) = abortable(async move {
      if !delay.is_zero() {
        futures_time::task::sleep(delay.into()).await;
      }
      if c_slot.is_closed() {
        return;
      }
      this
        .tracer
        .emit(Level::TRACE, || tracing::trace!(?delay, "pool action running"));
      let assigned = c_slot.set(action(&this, state));
      debug_assert!(assigned.is_ok());
    });
    // An aborted task resolves to `Err(Aborted)`; there is nothing left to do.
    self.pool.spawn_ok(task.map(drop));
    self
      .tracer
      .emit(Level::TRACE, || tracing::trace!(?delay, "pool action scheduled"));

    let handle = CompositeSubscription::new();
    handle.add(abort);
    handle.add(slot);
    BoxSubscription::new(handle)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::mpsc;

  use super::*;
  use crate::subscription::ActionSubscription;

  const WAIT: Duration = Duration::from_secs(5);

  #[test]
  fn runs_action_with_state() {
    let scheduler = ThreadPoolScheduler::new();
    let (tx, rx) = mpsc::channel();
    scheduler.schedule(
      move |_, v| {
        tx.send(v).unwrap();
        BoxSubscription::empty()
      },
      7,
    );
    assert_eq!(rx.recv_timeout(WAIT), Ok(7));
  }

  #[test]
  fn delayed_action_waits() {
    let scheduler = ThreadPoolScheduler::new();
    let (tx, rx) = mpsc::channel();
    let start = scheduler.now();
    scheduler.schedule_relative(
      Duration::from_millis(30),
      move |sch, ()| {
        tx.send(sch.now()).unwrap();
        BoxSubscription::empty()
      },
      (),
    );
    let at = rx.recv_timeout(WAIT).unwrap();
    assert!(at - start >= Duration::from_millis(30));
  }

  #[test]
  fn cancel_before_due_never_runs() {
    let scheduler = ThreadPoolScheduler::new();
    let (tx, rx) = mpsc::channel::<()>();
    let handle = scheduler.schedule_relative(
      Duration::from_millis(100),
      move |_, ()| {
        tx.send(()).unwrap();
        BoxSubscription::empty()
      },
      (),
    );
    handle.unsubscribe();
    assert!(handle.is_closed());
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
  }

  #[test]
  fn result_is_disposed_with_handle() {
    let scheduler = ThreadPoolScheduler::new();
    let (tx, rx) = mpsc::channel();
    let result = ActionSubscription::new(|| {});
    let c_result = result.clone();
    let handle = scheduler.schedule(
      move |_, ()| {
        tx.send(()).unwrap();
        BoxSubscription::new(c_result)
      },
      (),
    );
    rx.recv_timeout(WAIT).unwrap();
    handle.unsubscribe();
    // The result lands right after the send; disposal reaches it either way.
    let deadline = Instant::now() + WAIT;
    while !result.is_closed() && Instant::now() < deadline {
      std::thread::yield_now();
    }
    assert!(result.is_closed());
  }
}
