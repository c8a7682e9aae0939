use std::thread;
use std::time::Instant;

use tracing::Level;

use super::{Duration, Scheduler};
use crate::subscription::{BoxSubscription, SingleAssignmentSubscription, Subscription};
use crate::trace::Tracer;

/// A Scheduler that creates a new thread for each unit of work.
///
/// The thread sleeps out the delay, then runs the action unless the handle
/// was unsubscribed in the meantime. A sleeping thread is not woken by
/// cancellation; it just finds the handle closed and exits.
#[derive(Clone)]
pub struct NewThreadScheduler {
  epoch: Instant,
  tracer: Tracer,
}

impl NewThreadScheduler {
  pub fn new() -> Self { Self::with_tracer(Tracer::disabled()) }

  pub fn with_tracer(tracer: Tracer) -> Self { Self { epoch: Instant::now(), tracer } }
}

impl Default for NewThreadScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for NewThreadScheduler {
  fn now(&self) -> Duration { self.epoch.elapsed() }

  fn schedule_relative<S: Send + 'static>(
    &self, delay: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription {
    let slot = SingleAssignmentSubscription::new();
    let c_slot = slot.clone();
    let this = self.clone();
    thread::spawn(move || {
      if !delay.is_zero() {
        thread::sleep(delay);
      }
      if c_slot.is_closed() {
        this
          .tracer
          .emit(Level::DEBUG, || tracing::debug!(?delay, "thread action cancelled"));
        return;
      }
      let assigned = c_slot.set(action(&this, state));
      debug_assert!(assigned.is_ok());
    });
    BoxSubscription::new(slot)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::mpsc;

  use super::*;

  #[test]
  fn each_action_gets_its_own_thread() {
    let scheduler = NewThreadScheduler::new();
    let (tx, rx) = mpsc::channel();
    for i in 0..3 {
      let tx = tx.clone();
      scheduler.schedule(
        move |_, i| {
          tx.send((i, thread::current().id())).unwrap();
          BoxSubscription::empty()
        },
        i,
      );
    }
    let mut got: Vec<_> = (0..3)
      .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
      .collect();
    got.sort_by_key(|(i, _)| *i);
    assert_eq!(got.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(got.iter().all(|(_, id)| *id != thread::current().id()));
    assert_ne!(got[0].1, got[1].1);
  }

  #[test]
  fn cancelled_while_sleeping() {
    let scheduler = NewThreadScheduler::new();
    let (tx, rx) = mpsc::channel::<()>();
    let handle = scheduler.schedule_relative(
      Duration::from_millis(50),
      move |_, ()| {
        tx.send(()).unwrap();
        BoxSubscription::empty()
      },
      (),
    );
    handle.unsubscribe();
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
  }
}
