use std::convert::Infallible;
use std::iter::Once;

use super::{Observable, ObservableExt};
use crate::observer::Observer;

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error. Stops
/// early if the observer reports itself closed.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut sum = 0;
/// observable::from_iter(vec![1, 2, 3]).subscribe(|v| sum += v);
/// assert_eq!(sum, 6);
/// ```
pub fn from_iter<Iter>(iter: Iter) -> ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  ObservableIter(iter)
}

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
pub fn of<Item>(v: Item) -> ObservableIter<Once<Item>> { from_iter(std::iter::once(v)) }

#[derive(Clone)]
pub struct ObservableIter<Iter>(Iter);

impl<O, Iter> Observable<Iter::Item, Infallible, O> for ObservableIter<Iter>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      if observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    observer.complete();
  }
}

impl<Iter> ObservableExt<Iter::Item, Infallible> for ObservableIter<Iter> where Iter: IntoIterator {}

#[cfg(test)]
mod test {
  use std::convert::Infallible;

  use crate::prelude::*;
  use crate::rc::MutArc;

  #[test]
  fn from_range() {
    let mut hit_count = 0;
    let mut completed = false;
    observable::from_iter(0..100).subscribe_all(|_| hit_count += 1, |_| {}, || completed = true);

    assert_eq!(hit_count, 100);
    assert!(completed);
  }

  #[test]
  fn from_vec() {
    let mut values = vec![];
    observable::from_iter(vec!["a", "b"]).subscribe(|v| values.push(v));
    assert_eq!(values, vec!["a", "b"]);
  }

  #[test]
  fn of_emits_once() {
    let mut hits = vec![];
    let mut completed = 0;
    observable::of(123).subscribe_all(|v| hits.push(v), |_| {}, || completed += 1);
    assert_eq!(hits, vec![123]);
    assert_eq!(completed, 1);
  }

  #[test]
  fn stops_when_observer_closes() {
    let observer = MutArc::own(TakeTwo { values: vec![], completed: false });
    observable::from_iter(0..10).actual_subscribe(observer.clone());
    assert_eq!(observer.lock().values, vec![0, 1]);
    assert!(!observer.lock().completed);
  }

  /// Reports itself closed once it holds two values.
  struct TakeTwo {
    values: Vec<i32>,
    completed: bool,
  }

  impl Observer<i32, Infallible> for TakeTwo {
    fn next(&mut self, v: i32) { self.values.push(v); }

    fn error(&mut self, err: Infallible) { match err {} }

    fn complete(&mut self) { self.completed = true; }

    fn is_closed(&self) -> bool { self.values.len() >= 2 }
  }
}
