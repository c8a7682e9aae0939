use crate::observable::Observable;
use crate::observer::Observer;
use crate::subscription::{SingleAssignmentSubscription, Subscription};

/// Wraps an observer so that its sequence ends at the first terminal
/// notification.
///
/// After `error` or `complete` has been forwarded, every later call is
/// dropped and the upstream subscription, once attached, is unsubscribed.
/// If the terminal arrives before the upstream subscription is attached (a
/// source that finishes while it is being subscribed), the subscription is
/// released as soon as it is attached.
pub struct Subscriber<O> {
  observer: O,
  stopped: bool,
  upstream: SingleAssignmentSubscription,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self {
    Self { observer, stopped: false, upstream: SingleAssignmentSubscription::new() }
  }

  /// The slot released on the first terminal notification.
  #[inline]
  pub fn upstream(&self) -> SingleAssignmentSubscription { self.upstream.clone() }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.stopped {
      self.observer.next(value)
    }
  }

  fn error(&mut self, err: Err) {
    if !self.stopped {
      self.stopped = true;
      self.observer.error(err);
      self.upstream.unsubscribe();
    }
  }

  fn complete(&mut self) {
    if !self.stopped {
      self.stopped = true;
      self.observer.complete();
      self.upstream.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.stopped || self.observer.is_closed() }
}

/// Hand `upstream` to the slot of the subscriber that produced it.
pub(crate) fn attach(
  slot: &SingleAssignmentSubscription, upstream: impl Subscription + Send + Sync + 'static,
) {
  // Each slot belongs to one subscriber and is assigned exactly once.
  let assigned = slot.set(upstream);
  debug_assert!(assigned.is_ok());
}

/// Subscribe `observer` to `source` through a [`Subscriber`] and return the
/// subscription that ends the sequence, whether it is unsubscribed by the
/// caller or released by the first terminal notification.
pub fn subscribe_detached<Item, Err, S, O>(source: S, observer: O) -> SingleAssignmentSubscription
where
  S: Observable<Item, Err, Subscriber<O>>,
  S::Unsub: Send + Sync + 'static,
{
  let subscriber = Subscriber::new(observer);
  let slot = subscriber.upstream();
  attach(&slot, source.actual_subscribe(subscriber));
  slot
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use crate::subscriber::{subscribe_detached, Subscriber};

  #[test]
  fn drops_calls_after_terminal() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.create_observer::<i32, &str>();
    let mut subscriber = Subscriber::new(observer.clone());
    subscriber.next(1);
    subscriber.error("ex");
    subscriber.next(2);
    subscriber.complete();

    assert_eq!(observer.messages(), vec![next_at(0, 1), error_at(0, "ex")]);
    assert!(Observer::<i32, &str>::is_closed(&subscriber));
  }

  #[test]
  fn terminal_releases_upstream() {
    let scheduler = TestScheduler::new();
    let mut subscriber = Subscriber::new(scheduler.create_observer::<i32, ()>());
    let slot = subscriber.upstream();
    let upstream = ActionSubscription::new(|| {});
    slot.set(upstream.clone()).unwrap();

    Observer::<i32, ()>::complete(&mut subscriber);
    assert!(upstream.is_closed());
    assert!(slot.is_closed());
  }

  #[test]
  fn synchronous_terminal_releases_on_attach() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.create_observer();
    let subscription = subscribe_detached(observable::of(1), observer.clone());

    assert!(subscription.is_closed());
    assert_eq!(observer.messages(), vec![next_at(0, 1), completed_at(0)]);
  }
}
