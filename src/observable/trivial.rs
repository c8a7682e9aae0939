use std::convert::Infallible;
use std::marker::PhantomData;

use super::{Observable, ObservableExt};
use crate::observer::Observer;

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_err<Item, Err>(e: Err) -> ThrowErr<Item, Err> { ThrowErr(e, PhantomData) }

pub struct ThrowErr<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for ThrowErr<Item, Err> {
  fn clone(&self) -> Self { Self(self.0.clone(), PhantomData) }
}

impl<Item, Err, O> Observable<Item, Err, O> for ThrowErr<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub { observer.error(self.0) }
}

impl<Item, Err> ObservableExt<Item, Err> for ThrowErr<Item, Err> {}

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
pub fn empty<Item>() -> Empty<Item> { Empty(PhantomData) }

pub struct Empty<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for Empty<Item> {
  fn clone(&self) -> Self { Self(PhantomData) }
}

impl<Item, O> Observable<Item, Infallible, O> for Empty<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub { observer.complete() }
}

impl<Item> ObservableExt<Item, Infallible> for Empty<Item> {}

/// Creates an observable that never emits anything.
///
/// Neither emits a value, nor completes, nor emits an error.
pub fn never<Item>() -> Never<Item> { Never(PhantomData) }

pub struct Never<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for Never<Item> {
  fn clone(&self) -> Self { Self(PhantomData) }
}

impl<Item, O> Observable<Item, Infallible, O> for Never<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, _: O) -> Self::Unsub {}
}

impl<Item> ObservableExt<Item, Infallible> for Never<Item> {}
