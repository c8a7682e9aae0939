//! Observables and the operator surface.
//!
//! An observable is a value that, once subscribed with an observer, pushes
//! notifications into it and returns a subscription to stop it. Sources and
//! operators are plain structs implementing [`Observable`]; operators are
//! attached through [`ObservableExt`], which each type implements for the
//! item and error types it produces.

use std::convert::Infallible;

use crate::observer::{FnMutObserver, ObserverAll};
use crate::ops::{
  DistinctUntilChangedOp, DistinctUntilKeyChangedOp, FilterOp, FinalizeOp, MapOp, PartitionOp,
  TryDistinctUntilChangedOp, TryFilterOp, TryMapOp,
};
use crate::subscriber::Subscriber;
use crate::subscription::Subscription;

mod from_iter;
mod range;
mod start;
mod trivial;

pub use from_iter::{from_iter, of, ObservableIter};
pub use range::{range, range_on, RangeOn};
pub use start::{start, StartOp};
pub use trivial::{empty, never, throw_err, Empty, Never, ThrowErr};

/// A source of notifications for observers of type `O`.
pub trait Observable<Item, Err, O> {
  type Unsub: Subscription;

  /// Connect `observer` to this source. The returned subscription stops the
  /// delivery; a source that finishes synchronously may return one that is
  /// already closed.
  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

pub trait ObservableExt<Item, Err>: Sized {
  /// Transform each value with `f`.
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Transform each value with a fallible `f`. The first `Err` is sent
  /// downstream as the error and ends the output.
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<B, Err>,
  {
    TryMapOp::new(self, f)
  }

  /// Emit only the values that pass `predicate`.
  fn filter<F>(self, predicate: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    FilterOp::new(self, predicate)
  }

  /// Like [`filter`](Self::filter), with a predicate that may fail.
  fn try_filter<F>(self, predicate: F) -> TryFilterOp<Self, F>
  where
    F: FnMut(&Item) -> Result<bool, Err>,
  {
    TryFilterOp::new(self, predicate)
  }

  /// Drop values equal to the one emitted just before.
  fn distinct_until_changed(self) -> DistinctUntilChangedOp<Self>
  where
    Item: PartialEq + Clone,
  {
    DistinctUntilChangedOp::new(self)
  }

  /// Drop values whose key equals the key of the value emitted just before.
  fn distinct_until_key_changed<K, F>(self, key_selector: F) -> DistinctUntilKeyChangedOp<Self, F>
  where
    F: FnMut(&Item) -> K,
    K: PartialEq,
  {
    DistinctUntilKeyChangedOp::new(self, key_selector)
  }

  /// Drop values whose key is equal, according to `comparer`, to the key of
  /// the value emitted just before. Both closures may fail; the first failure
  /// is sent downstream as the error.
  fn try_distinct_until_changed_by<K, F, C>(
    self, key_selector: F, comparer: C,
  ) -> TryDistinctUntilChangedOp<Self, F, C>
  where
    F: FnMut(&Item) -> Result<K, Err>,
    C: FnMut(&K, &K) -> Result<bool, Err>,
  {
    TryDistinctUntilChangedOp::new(self, key_selector, comparer)
  }

  /// Split into the values that pass `predicate` and those that don't.
  ///
  /// The halves share one subscription to the source while either of them
  /// is subscribed.
  fn partition<F>(
    self, predicate: F,
  ) -> (PartitionOp<Self, F, Item, Err>, PartitionOp<Self, F, Item, Err>)
  where
    Self: Clone,
    F: Fn(&Item) -> bool,
  {
    PartitionOp::split(self, predicate)
  }

  /// Run `f` once, when the source terminates or the subscription is
  /// unsubscribed, whichever comes first.
  fn finalize<F>(self, f: F) -> FinalizeOp<Self, F>
  where
    F: FnOnce(),
  {
    FinalizeOp::new(self, f)
  }

  /// Subscribe with a closure for the values of a sequence that cannot fail.
  fn subscribe<N>(
    self, next: N,
  ) -> <Self as Observable<Item, Infallible, Subscriber<FnMutObserver<N>>>>::Unsub
  where
    Self: Observable<Item, Infallible, Subscriber<FnMutObserver<N>>>,
    N: FnMut(Item),
  {
    self.actual_subscribe(Subscriber::new(FnMutObserver(next)))
  }

  /// Subscribe with one closure per notification kind. Nothing reaches the
  /// closures after the first `error` or `complete`.
  fn subscribe_all<N, E, C>(
    self, next: N, error: E, complete: C,
  ) -> <Self as Observable<Item, Err, Subscriber<ObserverAll<N, E, C>>>>::Unsub
  where
    Self: Observable<Item, Err, Subscriber<ObserverAll<N, E, C>>>,
    N: FnMut(Item),
    E: FnMut(Err),
    C: FnMut(),
  {
    self.actual_subscribe(Subscriber::new(ObserverAll::new(next, error, complete)))
  }
}
