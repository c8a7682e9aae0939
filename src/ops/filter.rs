use crate::observable::{Observable, ObservableExt};
use crate::observer::Observer;

/// Emit only those items from an Observable that pass a predicate test
///
/// # Example
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut coll = vec![];
/// observable::from_iter(0..10)
///   .filter(|v| *v % 2 == 0)
///   .subscribe(|v| coll.push(v));
///
/// // only even numbers received.
/// assert_eq!(coll, vec![0, 2, 4, 6, 8]);
/// ```
#[derive(Clone)]
pub struct FilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> FilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { Self { source, filter } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for FilterOp<S, F>
where
  S: Observable<Item, Err, FilterObserver<O, F>>,
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(FilterObserver { observer, filter: self.filter })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for FilterOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> bool,
{
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[derive(Clone)]
pub struct TryFilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> TryFilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { Self { source, filter } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for TryFilterOp<S, F>
where
  S: Observable<Item, Err, TryFilterObserver<O, F>>,
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<bool, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(TryFilterObserver { observer, filter: self.filter, failed: false })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for TryFilterOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> Result<bool, Err>,
{
}

pub struct TryFilterObserver<O, F> {
  observer: O,
  filter: F,
  failed: bool,
}

impl<Item, Err, O, F> Observer<Item, Err> for TryFilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<bool, Err>,
{
  fn next(&mut self, value: Item) {
    if self.failed {
      return;
    }
    match (self.filter)(&value) {
      Ok(true) => self.observer.next(value),
      Ok(false) => {}
      Err(e) => {
        self.failed = true;
        self.observer.error(e);
      }
    }
  }

  fn error(&mut self, err: Err) {
    if !self.failed {
      self.observer.error(err)
    }
  }

  fn complete(&mut self) {
    if !self.failed {
      self.observer.complete()
    }
  }

  fn is_closed(&self) -> bool { self.failed || self.observer.is_closed() }
}
