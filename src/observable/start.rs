use super::{Observable, ObservableExt};
use crate::observer::Observer;
use crate::scheduler::Scheduler;
use crate::subscription::BoxSubscription;

/// Run `func` on `scheduler` for each subscriber and emit its outcome: the
/// value followed by completion, or the error.
///
/// This is how blocking or slow work is moved off the subscribing thread.
pub fn start<F, Item, Err, Sch>(func: F, scheduler: Sch) -> StartOp<F, Sch>
where
  F: FnOnce() -> Result<Item, Err>,
  Sch: Scheduler,
{
  StartOp { func, scheduler }
}

#[derive(Clone)]
pub struct StartOp<F, Sch> {
  func: F,
  scheduler: Sch,
}

impl<Item, Err, O, F, Sch> Observable<Item, Err, O> for StartOp<F, Sch>
where
  O: Observer<Item, Err> + Send + 'static,
  F: FnOnce() -> Result<Item, Err> + Send + 'static,
  Sch: Scheduler,
{
  type Unsub = BoxSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    self.scheduler.schedule(
      move |_, func: F| {
        match func() {
          Ok(v) => {
            observer.next(v);
            observer.complete();
          }
          Err(e) => observer.error(e),
        }
        BoxSubscription::empty()
      },
      self.func,
    )
  }
}

impl<Item, Err, F, Sch> ObservableExt<Item, Err> for StartOp<F, Sch>
where
  F: FnOnce() -> Result<Item, Err>,
  Sch: Scheduler,
{
}

#[cfg(test)]
mod tests {
  use std::sync::mpsc;
  use std::time::Duration;

  use crate::prelude::*;
  use crate::rc::MutArc;

  #[test]
  fn emits_value_then_completes() {
    let scheduler = VirtualTimeScheduler::new();
    let log = MutArc::own(vec![]);
    let (c_next, c_complete) = (log.clone(), log.clone());
    observable::start(|| Ok::<_, String>(123), scheduler.clone()).subscribe_all(
      move |v| c_next.lock().push(format!("next {v}")),
      |_| {},
      move || c_complete.lock().push("complete".to_string()),
    );
    assert!(log.lock().is_empty());

    scheduler.start();
    assert_eq!(*log.lock(), vec!["next 123", "complete"]);
  }

  #[test]
  fn error_is_forwarded() {
    let scheduler = VirtualTimeScheduler::new();
    let log = MutArc::own(vec![]);
    let c_log = log.clone();
    observable::start(|| Err::<i32, _>("ex"), scheduler.clone()).subscribe_all(
      |_| {},
      move |e| c_log.lock().push(e),
      || {},
    );
    scheduler.start();
    assert_eq!(*log.lock(), vec!["ex"]);
  }

  #[test]
  fn runs_off_the_calling_thread() {
    let (tx, rx) = mpsc::channel();
    let caller = std::thread::current().id();
    observable::start(move || Ok::<_, ()>(std::thread::current().id()), NewThreadScheduler::new())
      .subscribe_all(move |id| tx.send(id).unwrap(), |_| {}, || {});
    let id = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(id, caller);
  }
}
