use std::convert::Infallible;
use std::ops::RangeInclusive;

use super::{from_iter, Observable, ObservableExt, ObservableIter};
use crate::observer::Observer;
use crate::scheduler::{schedule_recursive, Scheduler};
use crate::subscription::CompositeSubscription;

/// `count` consecutive integers starting at `start`, emitted synchronously.
///
/// The sequence stops at `i64::MAX`: values past it are not emitted.
pub fn range(start: i64, count: usize) -> ObservableIter<RangeInclusive<i64>> {
  let span = count
    .checked_sub(1)
    .map(|last| i64::try_from(last).unwrap_or(i64::MAX));
  match span {
    Some(span) => from_iter(start..=start.saturating_add(span)),
    // An exhausted inclusive range.
    None => from_iter(1..=0),
  }
}

/// The `i`-th value of a range from `start`, if it fits in an `i64`.
fn nth(start: i64, i: usize) -> Option<i64> { start.checked_add(i64::try_from(i).ok()?) }

/// `count` consecutive integers starting at `start`, one per scheduled step
/// on `scheduler`, followed by completion on a step of its own. Like
/// [`range`], it completes instead of emitting a value past `i64::MAX`.
///
/// On a virtual clock in next-tick mode, subscribing at tick `t` emits at
/// `t + 1 ..= t + count` and completes at `t + count + 1`.
pub fn range_on<Sch: Scheduler>(start: i64, count: usize, scheduler: Sch) -> RangeOn<Sch> {
  RangeOn { start, count, scheduler }
}

#[derive(Clone)]
pub struct RangeOn<Sch> {
  start: i64,
  count: usize,
  scheduler: Sch,
}

impl<O, Sch> Observable<i64, Infallible, O> for RangeOn<Sch>
where
  O: Observer<i64, Infallible> + Send + 'static,
  Sch: Scheduler,
{
  type Unsub = CompositeSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let RangeOn { start, count, scheduler } = self;
    schedule_recursive(&scheduler, 0, move |_, i: usize| {
      if observer.is_closed() {
        return None;
      }
      match nth(start, i).filter(|_| i < count) {
        Some(value) => {
          observer.next(value);
          Some(i + 1)
        }
        None => {
          observer.complete();
          None
        }
      }
    })
  }
}

impl<Sch: Scheduler> ObservableExt<i64, Infallible> for RangeOn<Sch> {}
