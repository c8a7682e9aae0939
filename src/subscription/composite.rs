use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{BoxSubscription, DynamicSubscriptions, Subscription};

/// Identifies a child inside a [`CompositeSubscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionKey(usize);

#[derive(Default)]
struct Inner {
  closed: bool,
  children: DynamicSubscriptions<BoxSubscription>,
}

/// A group of subscriptions released together.
///
/// Unsubscribing the group marks it closed and then releases every child
/// exactly once, in the order they were added. A child added to a group that
/// is already closed is released on the spot and never tracked, so nothing
/// can leak past the group's lifetime.
///
/// Children are always released outside the group's lock: a child's teardown
/// may add to, remove from, or unsubscribe the group itself.
#[derive(Clone, Default)]
pub struct CompositeSubscription(Arc<Mutex<Inner>>);

impl CompositeSubscription {
  pub fn new() -> Self { Self::default() }

  /// Track `subscription` as a child of this group.
  ///
  /// If the group is already closed the subscription is released
  /// immediately; the returned key then refers to nothing.
  pub fn add(&self, subscription: impl Subscription + Send + Sync + 'static) -> SubscriptionKey {
    let mut inner = self.0.lock();
    if inner.closed {
      let id = inner.children.reserve_id();
      drop(inner);
      subscription.unsubscribe();
      SubscriptionKey(id)
    } else {
      SubscriptionKey(inner.children.add(BoxSubscription::new(subscription)))
    }
  }

  /// Detach the child behind `key` and release it.
  ///
  /// Returns `false` if the key is unknown, e.g. the child was already
  /// removed or the group was already unsubscribed.
  pub fn remove(&self, key: SubscriptionKey) -> bool {
    let child = self.0.lock().children.remove(key.0);
    match child {
      Some(child) => {
        child.unsubscribe();
        true
      }
      None => false,
    }
  }

  /// Stop tracking the child behind `key` without releasing it.
  pub fn detach(&self, key: SubscriptionKey) -> bool { self.0.lock().children.remove(key.0).is_some() }

  /// Release every current child without closing the group.
  pub fn clear(&self) {
    let children: Vec<_> = self.0.lock().children.drain().collect();
    for child in children {
      child.unsubscribe();
    }
  }

  /// Number of tracked children.
  pub fn len(&self) -> usize { self.0.lock().children.len() }

  pub fn is_empty(&self) -> bool { self.0.lock().children.is_empty() }
}

impl Subscription for CompositeSubscription {
  fn unsubscribe(&self) {
    let children: Vec<_> = {
      let mut inner = self.0.lock();
      if inner.closed {
        return;
      }
      inner.closed = true;
      inner.children.drain().collect()
    };
    for child in children {
      child.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().closed }
}

impl Debug for CompositeSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.lock();
    f.debug_struct("CompositeSubscription")
      .field("closed", &inner.closed)
      .field("children", &inner.children.len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rc::MutArc;
  use crate::subscription::ActionSubscription;

  fn recorder(log: &MutArc<Vec<usize>>, id: usize) -> ActionSubscription {
    let log = log.clone();
    ActionSubscription::new(move || log.lock().push(id))
  }

  #[test]
  fn disposes_children_in_add_order_once() {
    let log = MutArc::own(vec![]);
    let group = CompositeSubscription::new();
    for id in 1..=4 {
      group.add(recorder(&log, id));
    }
    assert_eq!(group.len(), 4);

    group.unsubscribe();
    group.unsubscribe();
    assert_eq!(*log.lock(), vec![1, 2, 3, 4]);
    assert!(group.is_closed());
    assert!(group.is_empty());
  }

  #[test]
  fn add_after_close_disposes_immediately() {
    let log = MutArc::own(vec![]);
    let group = CompositeSubscription::new();
    group.unsubscribe();

    let key = group.add(recorder(&log, 7));
    assert_eq!(*log.lock(), vec![7]);
    assert!(group.is_empty());
    assert!(!group.remove(key));
  }

  #[test]
  fn remove_disposes_only_that_child() {
    let log = MutArc::own(vec![]);
    let group = CompositeSubscription::new();
    group.add(recorder(&log, 1));
    let key = group.add(recorder(&log, 2));
    group.add(recorder(&log, 3));

    assert!(group.remove(key));
    assert!(!group.remove(key));
    assert_eq!(*log.lock(), vec![2]);
    assert_eq!(group.len(), 2);

    group.unsubscribe();
    assert_eq!(*log.lock(), vec![2, 1, 3]);
  }

  #[test]
  fn detach_does_not_dispose() {
    let log = MutArc::own(vec![]);
    let group = CompositeSubscription::new();
    let key = group.add(recorder(&log, 1));
    assert!(group.detach(key));
    group.unsubscribe();
    assert!(log.lock().is_empty());
  }

  #[test]
  fn clear_keeps_group_open() {
    let log = MutArc::own(vec![]);
    let group = CompositeSubscription::new();
    group.add(recorder(&log, 1));
    group.clear();
    assert_eq!(*log.lock(), vec![1]);
    assert!(!group.is_closed());

    group.add(recorder(&log, 2));
    assert_eq!(group.len(), 1);
  }

  #[test]
  fn child_may_touch_group_while_disposed() {
    let group = CompositeSubscription::new();
    let c_group = group.clone();
    group.add(ActionSubscription::new(move || {
      assert!(c_group.is_closed());
      c_group.add(());
    }));
    group.unsubscribe();
    assert!(group.is_empty());
  }
}
