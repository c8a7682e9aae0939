//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).
//!
//! All three take `&mut self`. A well-behaved producer calls `next` any number
//! of times and then at most one of `error` / `complete`; the type system does
//! not enforce that, [`CheckedObserver`] does at run time.

use std::convert::Infallible;

use crate::rc::MutArc;

mod checked;
pub use checked::{CheckedObserver, GuardState};

/// Observer trait: The consumer of data in reactive programming
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable; no notification may follow.
  fn error(&mut self, err: Err);

  /// Handle completion of the observable; no notification may follow.
  fn complete(&mut self);

  /// Checks if the observer is closed.
  ///
  /// Sources may use this to stop producing early. Returns `true` if the
  /// observer will not accept more values.
  fn is_closed(&self) -> bool { false }
}

/// A boxed, thread-safe observer.
pub type BoxObserver<Item, Err> = Box<dyn Observer<Item, Err> + Send>;

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Shared observer: every call locks and forwards.
impl<Item, Err, O> Observer<Item, Err> for MutArc<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.lock().next(value) }

  #[inline]
  fn error(&mut self, err: Err) { self.lock().error(err) }

  #[inline]
  fn complete(&mut self) { self.lock().complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.lock().is_closed() }
}

/// Extension methods available on every observer.
pub trait ObserverExt<Item, Err>: Observer<Item, Err> + Sized {
  /// Wrap this observer in a contract-enforcing [`CheckedObserver`].
  fn checked(self) -> CheckedObserver<Self> { CheckedObserver::new(self) }
}

impl<Item, Err, O> ObserverExt<Item, Err> for O where O: Observer<Item, Err> {}

// ============================================================================
// Closure adapters
// ============================================================================

/// Observer built from a `next` closure, for sequences that cannot fail.
///
/// This enables ergonomic subscription syntax: `observable.subscribe(|v|
/// println!("{}", v))`. Completion is ignored.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item, Infallible> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  #[inline]
  fn error(&mut self, err: Infallible) { match err {} }

  #[inline]
  fn complete(&mut self) {}
}

/// Observer built from three closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { Self { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) { (self.complete)() }
}
