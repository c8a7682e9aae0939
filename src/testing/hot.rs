use std::sync::Arc;

use super::{Recorded, SubscriptionLog, TestScheduler};
use crate::notification::Notification;
use crate::observable::{Observable, ObservableExt};
use crate::observer::{BoxObserver, Observer};
use crate::rc::MutArc;
use crate::subscriber::{attach, Subscriber};
use crate::subscription::{ActionSubscription, BoxSubscription, DynamicSubscriptions};

type Observers<Item, Err> = MutArc<DynamicSubscriptions<MutArc<BoxObserver<Item, Err>>>>;

/// A test source whose notifications fire at fixed absolute ticks, shared by
/// whoever is subscribed at that moment.
///
/// Every notification is scheduled when the source is created. Each one is
/// delivered to a snapshot of the current observers, taken without holding
/// the list lock while observers run, so an observer may unsubscribe itself
/// or others from inside a notification. An observer that receives `error`
/// or `complete` is removed and its subscription logged as ended at that
/// tick.
pub struct HotObservable<Item, Err> {
  scheduler: TestScheduler,
  messages: Arc<Vec<Recorded<Notification<Item, Err>>>>,
  observers: Observers<Item, Err>,
  subscriptions: MutArc<Vec<SubscriptionLog>>,
}

impl<Item, Err> HotObservable<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub(super) fn new(
    scheduler: TestScheduler, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> Self {
    let observers: Observers<Item, Err> = MutArc::own(DynamicSubscriptions::new());
    for Recorded { time, value } in messages.iter().cloned() {
      let observers = observers.clone();
      scheduler.schedule_at_tick(
        time,
        move |_, n: Notification<Item, Err>| {
          let targets: Vec<_> = observers.lock().iter().cloned().collect();
          for mut target in targets {
            n.clone().accept(&mut target);
          }
          BoxSubscription::empty()
        },
        value,
      );
    }
    Self {
      scheduler,
      messages: Arc::new(messages),
      observers,
      subscriptions: MutArc::own(vec![]),
    }
  }
}

impl<Item, Err> HotObservable<Item, Err> {
  /// Every subscription made so far, in subscription order.
  pub fn subscriptions(&self) -> Vec<SubscriptionLog> { self.subscriptions.lock().clone() }

  pub fn messages(&self) -> &[Recorded<Notification<Item, Err>>] { &self.messages }
}

impl<Item, Err> Clone for HotObservable<Item, Err> {
  fn clone(&self) -> Self {
    Self {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
      observers: self.observers.clone(),
      subscriptions: self.subscriptions.clone(),
    }
  }
}

impl<Item, Err, O> Observable<Item, Err, O> for HotObservable<Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  Item: 'static,
  Err: 'static,
{
  type Unsub = ActionSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let HotObservable { scheduler, observers, subscriptions, .. } = self;
    let index = {
      let now = scheduler.clock();
      let mut logs = subscriptions.lock();
      logs.push(SubscriptionLog::new(now, SubscriptionLog::INFINITE));
      logs.len() - 1
    };
    let subscriber = Subscriber::new(observer);
    let slot = subscriber.upstream();
    let boxed: BoxObserver<Item, Err> = Box::new(subscriber);
    let id = observers.lock().add(MutArc::own(boxed));

    let subscription = ActionSubscription::new(move || {
      let removed = observers.lock().remove(id);
      drop(removed);
      let now = scheduler.clock();
      subscriptions.lock()[index].unsubscribe = now;
    });
    attach(&slot, subscription.clone());
    subscription
  }
}

impl<Item, Err> ObservableExt<Item, Err> for HotObservable<Item, Err> {}
