use std::sync::Arc;

use super::{Recorded, SubscriptionLog, TestScheduler};
use crate::notification::Notification;
use crate::observable::{Observable, ObservableExt};
use crate::observer::Observer;
use crate::rc::MutArc;
use crate::subscriber::{attach, Subscriber};
use crate::subscription::{ActionSubscription, BoxSubscription, CompositeSubscription};

/// A test source that replays its notifications for every subscriber, each
/// one shifted by the tick the subscription was made at. A terminal
/// notification ends that subscriber's replay.
pub struct ColdObservable<Item, Err> {
  scheduler: TestScheduler,
  messages: Arc<Vec<Recorded<Notification<Item, Err>>>>,
  subscriptions: MutArc<Vec<SubscriptionLog>>,
}

impl<Item, Err> ColdObservable<Item, Err> {
  pub(super) fn new(
    scheduler: TestScheduler, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> Self {
    Self { scheduler, messages: Arc::new(messages), subscriptions: MutArc::own(vec![]) }
  }

  /// Every subscription made so far, in subscription order.
  pub fn subscriptions(&self) -> Vec<SubscriptionLog> { self.subscriptions.lock().clone() }

  pub fn messages(&self) -> &[Recorded<Notification<Item, Err>>] { &self.messages }
}

impl<Item, Err> Clone for ColdObservable<Item, Err> {
  fn clone(&self) -> Self {
    Self {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
      subscriptions: self.subscriptions.clone(),
    }
  }
}

impl<Item, Err, O> Observable<Item, Err, O> for ColdObservable<Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Unsub = CompositeSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ColdObservable { scheduler, messages, subscriptions } = self;
    let now = scheduler.clock();
    let index = {
      let mut logs = subscriptions.lock();
      logs.push(SubscriptionLog::new(now, SubscriptionLog::INFINITE));
      logs.len() - 1
    };

    let subscriber = Subscriber::new(observer);
    let slot = subscriber.upstream();
    let observer = MutArc::own(subscriber);
    let group = CompositeSubscription::new();
    for Recorded { time, value } in messages.iter().cloned() {
      let mut observer = observer.clone();
      group.add(scheduler.schedule_at_tick(
        now.saturating_add(time),
        move |_, n: Notification<Item, Err>| {
          n.accept(&mut observer);
          BoxSubscription::empty()
        },
        value,
      ));
    }
    group.add(ActionSubscription::new(move || {
      let now = scheduler.clock();
      subscriptions.lock()[index].unsubscribe = now;
    }));
    attach(&slot, group.clone());
    group
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ColdObservable<Item, Err> {}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn each_subscriber_gets_its_own_replay() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_cold_observable(vec![next_at::<i32, ()>(5, 1), completed_at(10)]);
    let first = scheduler.create_observer();
    let second = scheduler.create_observer();

    source.clone().actual_subscribe(first.clone());
    let (c_source, c_second) = (source.clone(), second.clone());
    scheduler.schedule_at_tick(
      100,
      move |_, ()| {
        c_source.actual_subscribe(c_second).unsubscribe();
        BoxSubscription::empty()
      },
      (),
    );
    scheduler.flush();

    assert_eq!(first.messages(), vec![next_at(5, 1), completed_at(10)]);
    assert!(second.messages().is_empty());
    assert_eq!(
      source.subscriptions(),
      vec![subscribed(0, 10), subscribed(100, 100)]
    );
  }

  #[test]
  fn unsubscribe_cancels_pending_replay() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_cold_observable(vec![
      next_at::<i32, ()>(10, 1),
      next_at(50, 2),
      completed_at(60),
    ]);
    let c_source = source.clone();
    let observer = scheduler.start_with(
      move || c_source,
      TestTimeline { disposed: 230, ..Default::default() },
    );
    assert_eq!(observer.messages(), vec![next_at(210, 1)]);
    assert_eq!(source.subscriptions(), vec![subscribed(200, 230)]);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn terminal_cancels_the_rest_of_the_replay() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_cold_observable(vec![
      next_at::<i32, &str>(10, 1),
      completed_at(20),
      next_at(30, 2),
      error_at(40, "ex"),
    ]);
    let observer = scheduler.create_observer();
    source.clone().actual_subscribe(observer.clone());
    assert_eq!(scheduler.pending_count(), 4);
    // The entries after the completion are cancelled when it is delivered.
    scheduler.advance_to(20).unwrap();
    assert!(scheduler.is_empty());

    assert_eq!(observer.messages(), vec![next_at(10, 1), completed_at(20)]);
    assert_eq!(source.subscriptions(), vec![subscribed(0, 20)]);
  }
}
