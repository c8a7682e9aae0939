use crate::observable::{Observable, ObservableExt};
use crate::observer::Observer;
use crate::rc::MutArc;
use crate::subscription::Subscription;

/// Calls a function once the source terminates, by error or completion, or
/// once the subscription is unsubscribed, whichever happens first.
#[derive(Clone)]
pub struct FinalizeOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> FinalizeOp<S, F> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { Self { source, func } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for FinalizeOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, FinalizerObserver<O, F>>,
  F: FnOnce(),
{
  type Unsub = FinalizerSubscription<S::Unsub, F>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let func = MutArc::own(Some(self.func));
    let subscription = self
      .source
      .actual_subscribe(FinalizerObserver { observer, func: func.clone() });
    FinalizerSubscription { subscription, func }
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for FinalizeOp<S, F> where
  S: ObservableExt<Item, Err>
{
}

fn run_once<F: FnOnce()>(func: &MutArc<Option<F>>) {
  if let Some(func) = func.take() {
    func()
  }
}

pub struct FinalizerObserver<O, F> {
  observer: O,
  func: MutArc<Option<F>>,
}

impl<Item, Err, O, F> Observer<Item, Err> for FinalizerObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value); }

  fn error(&mut self, err: Err) {
    self.observer.error(err);
    run_once(&self.func);
  }

  fn complete(&mut self) {
    self.observer.complete();
    run_once(&self.func);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub struct FinalizerSubscription<U, F> {
  subscription: U,
  func: MutArc<Option<F>>,
}

impl<U, F> Subscription for FinalizerSubscription<U, F>
where
  U: Subscription,
  F: FnOnce(),
{
  fn unsubscribe(&self) {
    self.subscription.unsubscribe();
    run_once(&self.func);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.subscription.is_closed() }
}

#[cfg(test)]
mod test {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  use crate::prelude::*;
  use crate::rc::MutArc;

  fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Clone + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let c_count = count.clone();
    (count, move || {
      c_count.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[test]
  fn finalize_on_complete_simple() {
    let (finalized, func) = counter();
    let mut nexted = false;
    observable::of(1)
      .finalize(func)
      .subscribe(|_| nexted = true);
    assert_eq!(finalized.load(Ordering::SeqCst), 1);
    assert!(nexted);
  }

  #[test]
  fn finalize_on_error() {
    let (finalized, func) = counter();
    let mut errored = false;
    observable::throw_err::<i32, _>("oops")
      .finalize(func)
      .subscribe_all(|_| {}, |_| errored = true, || {});
    assert!(errored);
    assert_eq!(finalized.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn finalize_runs_after_the_terminal_notification() {
    let log = MutArc::own(vec![]);
    let (c_next, c_complete, c_final) = (log.clone(), log.clone(), log.clone());
    observable::from_iter([1, 2])
      .finalize(move || c_final.lock().push("finally"))
      .subscribe_all(
        move |_| c_next.lock().push("next"),
        |_| {},
        move || c_complete.lock().push("complete"),
      );
    assert_eq!(*log.lock(), vec!["next", "next", "complete", "finally"]);
  }

  #[test]
  fn finalize_on_unsubscribe() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_hot_observable(vec![next_at::<i32, ()>(210, 1), completed_at(1200)]);
    let called_at = MutArc::own(None);

    let (c_at, c_sch) = (called_at.clone(), scheduler.clone());
    let c_source = source.clone();
    let observer = scheduler.start(move || {
      c_source.finalize(move || *c_at.lock() = Some(c_sch.clock()))
    });

    assert_eq!(observer.messages(), vec![next_at(210, 1)]);
    assert_eq!(*called_at.lock(), Some(1000));
    assert_eq!(source.subscriptions(), vec![subscribed(200, 1000)]);
  }

  #[test]
  fn finalize_only_once() {
    let (finalized, func) = counter();
    let scheduler = TestScheduler::new();
    let source = scheduler.create_hot_observable(vec![next_at::<i32, ()>(210, 1), completed_at(220)]);

    let c_source = source.clone();
    scheduler.start(move || c_source.finalize(func));

    // Completion at 220 ran it; the disposal at 1000 must not run it again.
    assert_eq!(finalized.load(Ordering::SeqCst), 1);
  }
}
