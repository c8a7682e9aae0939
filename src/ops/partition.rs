use std::sync::Arc;

use parking_lot::Mutex;

use crate::observable::{Observable, ObservableExt};
use crate::observer::{BoxObserver, Observer};
use crate::rc::MutArc;
use crate::subscriber::attach;
use crate::subscription::{
  ActionSubscription, DynamicSubscriptions, SingleAssignmentSubscription, Subscription,
};

/// One half of a partitioned source: the values for which the shared
/// predicate returns `keep`.
///
/// Both halves share a single subscription to the source. The first half to
/// subscribe connects it, the last one to unsubscribe releases it, and the
/// predicate runs once per value. A terminal notification reaches every
/// subscribed half and ends the connection, so a later subscription starts a
/// new one.
///
/// # Example
///
/// ```
/// use rxcore::prelude::*;
/// use rxcore::rc::MutArc;
///
/// let (evens, odds) = observable::from_iter(0..6).partition(|v| v % 2 == 0);
/// let (e, o) = (MutArc::own(vec![]), MutArc::own(vec![]));
/// let (c_e, c_o) = (e.clone(), o.clone());
/// evens.subscribe(move |v| c_e.lock().push(v));
/// odds.subscribe(move |v| c_o.lock().push(v));
/// assert_eq!(*e.lock(), vec![0, 2, 4]);
/// assert_eq!(*o.lock(), vec![1, 3, 5]);
/// ```
pub struct PartitionOp<S, F, Item, Err> {
  source: S,
  fanout: Arc<Fanout<F, Item, Err>>,
  keep: bool,
}

type Halves<Item, Err> = DynamicSubscriptions<(bool, MutArc<BoxObserver<Item, Err>>)>;

struct Connection<Item, Err> {
  halves: Halves<Item, Err>,
  upstream: Option<SingleAssignmentSubscription>,
}

struct Fanout<F, Item, Err> {
  predicate: F,
  connection: Mutex<Connection<Item, Err>>,
}

impl<S: Clone, F, Item, Err> PartitionOp<S, F, Item, Err> {
  pub(crate) fn split(source: S, predicate: F) -> (Self, Self) {
    let fanout = Arc::new(Fanout {
      predicate,
      connection: Mutex::new(Connection { halves: DynamicSubscriptions::new(), upstream: None }),
    });
    let matching = Self { source: source.clone(), fanout: fanout.clone(), keep: true };
    let rest = Self { source, fanout, keep: false };
    (matching, rest)
  }
}

impl<S: Clone, F, Item, Err> Clone for PartitionOp<S, F, Item, Err> {
  fn clone(&self) -> Self {
    Self { source: self.source.clone(), fanout: self.fanout.clone(), keep: self.keep }
  }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for PartitionOp<S, F, Item, Err>
where
  S: Observable<Item, Err, PartitionObserver<F, Item, Err>>,
  S::Unsub: Send + Sync + 'static,
  O: Observer<Item, Err> + Send + 'static,
  F: Fn(&Item) -> bool + Send + Sync + 'static,
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Unsub = ActionSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let PartitionOp { source, fanout, keep } = self;
    let half: BoxObserver<Item, Err> = Box::new(observer);
    let (id, connect) = {
      let mut conn = fanout.connection.lock();
      let id = conn.halves.add((keep, MutArc::own(half)));
      let connect = if conn.upstream.is_none() {
        let slot = SingleAssignmentSubscription::new();
        conn.upstream = Some(slot.clone());
        Some(slot)
      } else {
        None
      };
      (id, connect)
    };
    if let Some(slot) = connect {
      attach(&slot, source.actual_subscribe(PartitionObserver(fanout.clone())));
    }

    ActionSubscription::new(move || {
      let mut conn = fanout.connection.lock();
      let removed = conn.halves.remove(id);
      let released = if removed.is_some() && conn.halves.is_empty() {
        conn.upstream.take()
      } else {
        None
      };
      drop(conn);
      drop(removed);
      if let Some(upstream) = released {
        upstream.unsubscribe();
      }
    })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for PartitionOp<S, F, Item, Err> where
  S: ObservableExt<Item, Err>
{
}

/// The single observer subscribed to the source on behalf of both halves.
pub struct PartitionObserver<F, Item, Err>(Arc<Fanout<F, Item, Err>>);

impl<F, Item, Err> PartitionObserver<F, Item, Err> {
  fn targets(&self, keep: bool) -> Vec<MutArc<BoxObserver<Item, Err>>> {
    let conn = self.0.connection.lock();
    conn
      .halves
      .iter()
      .filter(|(k, _)| *k == keep)
      .map(|(_, half)| half.clone())
      .collect()
  }

  /// Detach every half and hand back the upstream, ending the connection.
  fn disconnect(
    &self,
  ) -> (Vec<MutArc<BoxObserver<Item, Err>>>, Option<SingleAssignmentSubscription>) {
    let mut conn = self.0.connection.lock();
    let halves = conn.halves.drain().map(|(_, half)| half).collect();
    (halves, conn.upstream.take())
  }
}

impl<Item, Err, F> Observer<Item, Err> for PartitionObserver<F, Item, Err>
where
  F: Fn(&Item) -> bool,
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    let keep = (self.0.predicate)(&value);
    for mut half in self.targets(keep) {
      half.next(value.clone());
    }
  }

  fn error(&mut self, err: Err) {
    let (halves, upstream) = self.disconnect();
    for mut half in halves {
      half.error(err.clone());
    }
    if let Some(upstream) = upstream {
      upstream.unsubscribe();
    }
  }

  fn complete(&mut self) {
    let (halves, upstream) = self.disconnect();
    for mut half in halves {
      half.complete();
    }
    if let Some(upstream) = upstream {
      upstream.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.connection.lock().halves.is_empty() }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  use crate::prelude::*;
  use crate::rc::MutArc;

  #[test]
  fn each_half_completes() {
    let counts = MutArc::own((0, 0));
    let done = MutArc::own((false, false));
    let (even, odd) = observable::from_iter(0..10).partition(|v| v % 2 == 0);
    let (c_counts, c_done) = (counts.clone(), done.clone());
    even.subscribe_all(move |_| c_counts.lock().0 += 1, |_| {}, move || c_done.lock().0 = true);
    let (c_counts, c_done) = (counts.clone(), done.clone());
    odd.subscribe_all(move |_| c_counts.lock().1 += 1, |_| {}, move || c_done.lock().1 = true);
    assert_eq!(*counts.lock(), (5, 5));
    assert_eq!(*done.lock(), (true, true));
  }

  #[test]
  fn both_halves_see_the_error() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_cold_observable(vec![
      next_at(10, 4),
      next_at(40, 3),
      error_at(90, "ex"),
      next_at(95, 2),
    ]);
    let (matching, rest) = source.clone().partition(|v: &i32| v % 2 == 0);
    let evens = scheduler.create_observer();
    let odds = scheduler.create_observer();
    matching.actual_subscribe(evens.clone());
    rest.actual_subscribe(odds.clone());
    scheduler.flush();

    assert_eq!(evens.messages(), vec![next_at(10, 4), error_at(90, "ex")]);
    assert_eq!(odds.messages(), vec![next_at(40, 3), error_at(90, "ex")]);
    assert_eq!(source.subscriptions(), vec![subscribed(0, 90)]);
  }

  #[test]
  fn halves_share_one_subscription() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_cold_observable(vec![
      next_at::<i32, ()>(10, 1),
      next_at(20, 2),
      completed_at(30),
    ]);
    let calls = Arc::new(AtomicUsize::new(0));
    let c_calls = calls.clone();
    let (matching, rest) = source.clone().partition(move |v: &i32| {
      c_calls.fetch_add(1, Ordering::SeqCst);
      *v > 1
    });
    let large = scheduler.create_observer();
    let small = scheduler.create_observer();
    matching.actual_subscribe(large.clone());
    rest.actual_subscribe(small.clone());
    scheduler.flush();

    assert_eq!(large.messages(), vec![next_at(20, 2), completed_at(30)]);
    assert_eq!(small.messages(), vec![next_at(10, 1), completed_at(30)]);
    assert_eq!(source.subscriptions(), vec![subscribed(0, 30)]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn last_half_releases_the_source() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_hot_observable(vec![next_at::<i32, ()>(10, 1), next_at(30, 2)]);
    let (matching, rest) = source.clone().partition(|v: &i32| *v > 1);
    let first = matching.actual_subscribe(scheduler.create_observer());
    let second = rest.actual_subscribe(scheduler.create_observer());

    scheduler.advance_to(20).unwrap();
    first.unsubscribe();
    assert_eq!(source.subscriptions(), vec![subscribed(0, SubscriptionLog::INFINITE)]);
    second.unsubscribe();
    assert_eq!(source.subscriptions(), vec![subscribed(0, 20)]);
  }
}
