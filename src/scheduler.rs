//! Schedulers: who decides when work runs.
//!
//! A [`Scheduler`] runs an action now, after a delay, or at a point in its
//! own time, and hands back a subscription that cancels it. Cancellation is
//! best effort: an action that is already running is never interrupted, but
//! once it has run, disposing the handle disposes whatever the action
//! returned.
//!
//! | Scheduler | Time source | Execution |
//! |-----------|-------------|-----------|
//! | [`VirtualTimeScheduler`] | virtual ticks | synchronous run loop |
//! | [`ThreadPoolScheduler`] | wall clock | futures thread pool |
//! | [`NewThreadScheduler`] | wall clock | one thread per action |
//! | [`HostScheduler`] | host loop | whatever the host does |

use std::sync::Arc;

use parking_lot::Mutex;
pub use std::time::Duration;

use crate::subscription::{BoxSubscription, CompositeSubscription, Subscription, SubscriptionKey};

mod host;
mod new_thread;
#[cfg(feature = "futures-scheduler")]
mod thread_pool;
mod virtual_time;

pub use host::{HostScheduler, TimerHost};
pub use new_thread::NewThreadScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool::ThreadPoolScheduler;
pub use virtual_time::{DuePolicy, VirtualTimeConfig, VirtualTimeScheduler};

/// One unit of virtual time.
pub type Tick = u64;

/// A Scheduler is an object to order task and schedule their execution.
///
/// Actions receive the scheduler they run on, so they can schedule follow-up
/// work without capturing it, and the state they were scheduled with.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Time elapsed since this scheduler's epoch.
  fn now(&self) -> Duration;

  /// Run `action` as soon as possible.
  fn schedule<S: Send + 'static>(
    &self, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static, state: S,
  ) -> BoxSubscription {
    self.schedule_relative(Duration::ZERO, action, state)
  }

  /// Run `action` once `delay` has passed.
  fn schedule_relative<S: Send + 'static>(
    &self, delay: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription;

  /// Run `action` when [`now`](Self::now) reaches `due`. A due time in the
  /// past runs as soon as possible.
  fn schedule_absolute<S: Send + 'static>(
    &self, due: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription {
    let delay = due.saturating_sub(self.now());
    self.schedule_relative(delay, action, state)
  }
}

enum Step {
  Pending,
  Added(SubscriptionKey),
  Done,
}

/// Run `action` repeatedly on `scheduler`, threading its state through.
///
/// Each step is scheduled with [`Scheduler::schedule`]. Returning
/// `Some(next)` schedules another step with `next`, returning `None` ends the
/// loop. Unsubscribing the returned group cancels the pending step and stops
/// the loop.
///
/// The group only ever holds the handle of the step that has not run yet,
/// also when a step runs on another thread before `schedule` returned its
/// handle.
pub fn schedule_recursive<Sch, S, F>(scheduler: &Sch, state: S, action: F) -> CompositeSubscription
where
  Sch: Scheduler,
  S: Send + 'static,
  F: FnMut(&Sch, S) -> Option<S> + Send + 'static,
{
  let group = CompositeSubscription::new();
  recurse(scheduler, group.clone(), Arc::new(Mutex::new(action)), state);
  group
}

fn recurse<Sch, S, F>(scheduler: &Sch, group: CompositeSubscription, action: Arc<Mutex<F>>, state: S)
where
  Sch: Scheduler,
  S: Send + 'static,
  F: FnMut(&Sch, S) -> Option<S> + Send + 'static,
{
  let step = Arc::new(Mutex::new(Step::Pending));
  let c_step = step.clone();
  let c_group = group.clone();
  let handle = scheduler.schedule(
    move |sch, state| {
      let prev = std::mem::replace(&mut *c_step.lock(), Step::Done);
      if let Step::Added(key) = prev {
        c_group.detach(key);
      }
      if c_group.is_closed() {
        return BoxSubscription::empty();
      }
      let next = {
        let mut action = action.lock();
        (&mut *action)(sch, state)
      };
      if let Some(next) = next {
        recurse(sch, c_group, action, next);
      }
      BoxSubscription::empty()
    },
    state,
  );

  let mut step = step.lock();
  if matches!(*step, Step::Pending) {
    *step = Step::Added(group.add(handle));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rc::MutArc;
  use crate::subscription::Subscription;

  #[test]
  fn recursive_steps_until_none() {
    let scheduler = VirtualTimeScheduler::new();
    let seen = MutArc::own(vec![]);
    let c_seen = seen.clone();
    let group = schedule_recursive(&scheduler, 0, move |sch, i| {
      c_seen.lock().push((sch.clock(), i));
      (i < 3).then_some(i + 1)
    });
    assert_eq!(group.len(), 1);

    scheduler.start();
    assert_eq!(*seen.lock(), vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
    assert!(group.is_empty());
    assert!(scheduler.is_empty());
  }

  #[test]
  fn unsubscribe_stops_recursion() {
    let scheduler = VirtualTimeScheduler::with_config(VirtualTimeConfig {
      due_policy: DuePolicy::NextTick,
      ..Default::default()
    });
    let count = MutArc::own(0);
    let c_count = count.clone();
    let group = schedule_recursive(&scheduler, (), move |_, ()| {
      *c_count.lock() += 1;
      Some(())
    });

    scheduler.advance_to(5).unwrap();
    assert_eq!(*count.lock(), 5);
    group.unsubscribe();
    assert!(scheduler.is_empty());
    scheduler.advance_to(10).unwrap();
    assert_eq!(*count.lock(), 5);
  }

  #[test]
  fn absolute_and_relative_agree() {
    let scheduler = VirtualTimeScheduler::new();
    scheduler.sleep(10);
    let at = MutArc::own(vec![]);
    for (name, absolute) in [("absolute", true), ("relative", false)] {
      let c_at = at.clone();
      let action = move |sch: &VirtualTimeScheduler, _| {
        c_at.lock().push((name, sch.clock()));
        BoxSubscription::empty()
      };
      if absolute {
        scheduler.schedule_absolute(Duration::from_millis(15), action, ());
      } else {
        scheduler.schedule_relative(Duration::from_millis(5), action, ());
      }
    }
    scheduler.start();
    assert_eq!(*at.lock(), vec![("absolute", 15), ("relative", 15)]);
  }
}
