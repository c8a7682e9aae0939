//! DistinctUntilChanged operator implementation
//!
//! This module contains the `DistinctUntilChanged`, `DistinctUntilKeyChanged`
//! and `TryDistinctUntilChanged` operators, which filter consecutive duplicate
//! items emitted by the source observable.

use crate::observable::{Observable, ObservableExt};
use crate::observer::Observer;

/// DistinctUntilChanged operator: Emits items only if they are different from
/// the previous item.
///
/// It requires the item type to implement `PartialEq` and `Clone`.
#[derive(Clone)]
pub struct DistinctUntilChangedOp<S>(S);

impl<S> DistinctUntilChangedOp<S> {
  pub(crate) fn new(source: S) -> Self { Self(source) }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for DistinctUntilChangedOp<S>
where
  S: Observable<Item, Err, DistinctUntilChangedObserver<O, Item>>,
  O: Observer<Item, Err>,
  Item: PartialEq + Clone,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .0
      .actual_subscribe(DistinctUntilChangedObserver { observer, last: None })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for DistinctUntilChangedOp<S> where
  S: ObservableExt<Item, Err>
{
}

/// DistinctUntilChangedObserver wrapper for filtering consecutive duplicates
pub struct DistinctUntilChangedObserver<O, Item> {
  observer: O,
  last: Option<Item>,
}

impl<O, Item, Err> Observer<Item, Err> for DistinctUntilChangedObserver<O, Item>
where
  O: Observer<Item, Err>,
  Item: PartialEq + Clone,
{
  fn next(&mut self, value: Item) {
    if self.last.as_ref() != Some(&value) {
      self.last = Some(value.clone());
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err); }

  fn complete(&mut self) { self.observer.complete(); }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// DistinctUntilKeyChanged operator: Emits items where the keys derived from
/// consecutive items are different.
#[derive(Clone)]
pub struct DistinctUntilKeyChangedOp<S, F> {
  source: S,
  key_selector: F,
}

impl<S, F> DistinctUntilKeyChangedOp<S, F> {
  pub(crate) fn new(source: S, key_selector: F) -> Self { Self { source, key_selector } }
}

impl<Item, Err, O, S, F, Key> Observable<Item, Err, O> for DistinctUntilKeyChangedOp<S, F>
where
  S: Observable<Item, Err, DistinctUntilKeyChangedObserver<O, F, Key>>,
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Key,
  Key: PartialEq,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let DistinctUntilKeyChangedOp { source, key_selector } = self;
    source.actual_subscribe(DistinctUntilKeyChangedObserver { observer, key_selector, last_key: None })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for DistinctUntilKeyChangedOp<S, F> where
  S: ObservableExt<Item, Err>
{
}

/// DistinctUntilKeyChangedObserver wrapper for filtering duplicates by key
pub struct DistinctUntilKeyChangedObserver<O, F, Key> {
  observer: O,
  key_selector: F,
  last_key: Option<Key>,
}

impl<O, F, Key, Item, Err> Observer<Item, Err> for DistinctUntilKeyChangedObserver<O, F, Key>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Key,
  Key: PartialEq,
{
  fn next(&mut self, value: Item) {
    let key = (self.key_selector)(&value);
    if self.last_key.as_ref() != Some(&key) {
      self.last_key = Some(key);
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err); }

  fn complete(&mut self) { self.observer.complete(); }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Distinct-until-changed with a fallible key selector and a fallible
/// equality comparer. The first failure of either is sent downstream as the
/// error and ends the output.
#[derive(Clone)]
pub struct TryDistinctUntilChangedOp<S, F, C> {
  source: S,
  key_selector: F,
  comparer: C,
}

impl<S, F, C> TryDistinctUntilChangedOp<S, F, C> {
  pub(crate) fn new(source: S, key_selector: F, comparer: C) -> Self {
    Self { source, key_selector, comparer }
  }
}

impl<Item, Err, O, S, F, C, Key> Observable<Item, Err, O> for TryDistinctUntilChangedOp<S, F, C>
where
  S: Observable<Item, Err, TryDistinctUntilChangedObserver<O, F, C, Key>>,
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<Key, Err>,
  C: FnMut(&Key, &Key) -> Result<bool, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let TryDistinctUntilChangedOp { source, key_selector, comparer } = self;
    source.actual_subscribe(TryDistinctUntilChangedObserver {
      observer,
      key_selector,
      comparer,
      last_key: None,
      failed: false,
    })
  }
}

impl<Item, Err, S, F, C> ObservableExt<Item, Err> for TryDistinctUntilChangedOp<S, F, C> where
  S: ObservableExt<Item, Err>
{
}

pub struct TryDistinctUntilChangedObserver<O, F, C, Key> {
  observer: O,
  key_selector: F,
  comparer: C,
  last_key: Option<Key>,
  failed: bool,
}

impl<O, F, C, Key> TryDistinctUntilChangedObserver<O, F, C, Key> {
  fn changed<Item, Err>(&mut self, value: &Item) -> Result<Option<Key>, Err>
  where
    F: FnMut(&Item) -> Result<Key, Err>,
    C: FnMut(&Key, &Key) -> Result<bool, Err>,
  {
    let key = (self.key_selector)(value)?;
    let same = match &self.last_key {
      Some(last) => (self.comparer)(last, &key)?,
      None => false,
    };
    Ok((!same).then_some(key))
  }
}

impl<O, F, C, Key, Item, Err> Observer<Item, Err> for TryDistinctUntilChangedObserver<O, F, C, Key>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<Key, Err>,
  C: FnMut(&Key, &Key) -> Result<bool, Err>,
{
  fn next(&mut self, value: Item) {
    if self.failed {
      return;
    }
    match self.changed(&value) {
      Ok(Some(key)) => {
        self.last_key = Some(key);
        self.observer.next(value);
      }
      Ok(None) => {}
      Err(e) => {
        self.failed = true;
        self.observer.error(e);
      }
    }
  }

  fn error(&mut self, err: Err) {
    if !self.failed {
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if !self.failed {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.failed || self.observer.is_closed() }
}
