use std::marker::PhantomData;

use crate::observable::{Observable, ObservableExt};
use crate::observer::Observer;

pub struct MapOp<S, F, Item> {
  source: S,
  func: F,
  _p: PhantomData<fn(Item)>,
}

impl<S, F, Item> MapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { Self { source, func, _p: PhantomData } }
}

impl<S: Clone, F: Clone, Item> Clone for MapOp<S, F, Item> {
  fn clone(&self) -> Self { Self::new(self.source.clone(), self.func.clone()) }
}

impl<Item, B, Err, O, S, F> Observable<B, Err, O> for MapOp<S, F, Item>
where
  S: Observable<Item, Err, MapObserver<O, F>>,
  F: FnMut(Item) -> B,
  O: Observer<B, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(MapObserver { observer, func: self.func })
  }
}

impl<Item, B, Err, S, F> ObservableExt<B, Err> for MapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> B,
{
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub struct TryMapOp<S, F, Item> {
  source: S,
  func: F,
  _p: PhantomData<fn(Item)>,
}

impl<S, F, Item> TryMapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { Self { source, func, _p: PhantomData } }
}

impl<S: Clone, F: Clone, Item> Clone for TryMapOp<S, F, Item> {
  fn clone(&self) -> Self { Self::new(self.source.clone(), self.func.clone()) }
}

impl<Item, B, Err, O, S, F> Observable<B, Err, O> for TryMapOp<S, F, Item>
where
  S: Observable<Item, Err, TryMapObserver<O, F>>,
  F: FnMut(Item) -> Result<B, Err>,
  O: Observer<B, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(TryMapObserver { observer, func: self.func, failed: false })
  }
}

impl<Item, B, Err, S, F> ObservableExt<B, Err> for TryMapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
}

/// Once `func` has failed, every later notification is ignored.
pub struct TryMapObserver<O, F> {
  observer: O,
  func: F,
  failed: bool,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.failed {
      return;
    }
    match (self.func)(value) {
      Ok(v) => self.observer.next(v),
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
