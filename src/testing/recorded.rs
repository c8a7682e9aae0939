use std::fmt::{Debug, Display, Formatter};

use crate::notification::Notification;
use crate::scheduler::Tick;

/// A value stamped with the virtual tick it was seen at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recorded<T> {
  pub time: Tick,
  pub value: T,
}

impl<T> Recorded<T> {
  pub fn new(time: Tick, value: T) -> Self { Self { time, value } }
}

impl<Item: Debug, Err: Debug> Display for Recorded<Notification<Item, Err>> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match &self.value {
      Notification::Next(v) => write!(f, "{}({v:?})@{}", self.value.kind(), self.time),
      Notification::Error(e) => write!(f, "{}({e:?})@{}", self.value.kind(), self.time),
      Notification::Completed => write!(f, "{}@{}", self.value.kind(), self.time),
    }
  }
}

pub fn next_at<Item, Err>(time: Tick, value: Item) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Next(value))
}

pub fn error_at<Item, Err>(time: Tick, err: Err) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Error(err))
}

pub fn completed_at<Item, Err>(time: Tick) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Completed)
}

/// The interval during which one observer was subscribed to a test source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionLog {
  pub subscribe: Tick,
  pub unsubscribe: Tick,
}

impl SubscriptionLog {
  /// Unsubscribe tick of a subscription that is still active.
  pub const INFINITE: Tick = Tick::MAX;

  pub fn new(subscribe: Tick, unsubscribe: Tick) -> Self { Self { subscribe, unsubscribe } }

  pub fn is_active(&self) -> bool { self.unsubscribe == Self::INFINITE }
}

impl Display for SubscriptionLog {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if self.is_active() {
      write!(f, "[{}, inf)", self.subscribe)
    } else {
      write!(f, "[{}, {})", self.subscribe, self.unsubscribe)
    }
  }
}

pub fn subscribed(subscribe: Tick, unsubscribe: Tick) -> SubscriptionLog {
  SubscriptionLog::new(subscribe, unsubscribe)
}
