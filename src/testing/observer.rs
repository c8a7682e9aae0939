use super::{Recorded, TestScheduler};
use crate::notification::Notification;
use crate::observer::Observer;
use crate::rc::MutArc;

/// An observer that records each notification with the tick it arrived at.
///
/// Clones share one record, so a clone can be handed to a source while the
/// original is kept for assertions.
pub struct TestObserver<Item, Err> {
  scheduler: TestScheduler,
  messages: MutArc<Vec<Recorded<Notification<Item, Err>>>>,
}

impl<Item, Err> TestObserver<Item, Err> {
  pub(super) fn new(scheduler: TestScheduler) -> Self {
    Self { scheduler, messages: MutArc::own(vec![]) }
  }

  fn record(&self, n: Notification<Item, Err>) {
    let time = self.scheduler.clock();
    self.messages.lock().push(Recorded::new(time, n));
  }

  /// Everything recorded so far, in delivery order.
  pub fn messages(&self) -> Vec<Recorded<Notification<Item, Err>>>
  where
    Item: Clone,
    Err: Clone,
  {
    self.messages.lock().clone()
  }
}

impl<Item, Err> Clone for TestObserver<Item, Err> {
  fn clone(&self) -> Self {
    Self { scheduler: self.scheduler.clone(), messages: self.messages.clone() }
  }
}

impl<Item, Err> Observer<Item, Err> for TestObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.record(Notification::Next(value)); }

  fn error(&mut self, err: Err) { self.record(Notification::Error(err)); }

  fn complete(&mut self) { self.record(Notification::Completed); }
}
