use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{BoxSubscription, Subscription};
use crate::error::ContractViolation;

#[derive(Default)]
enum Slot {
  #[default]
  Empty,
  Assigned(BoxSubscription),
  Disposed,
}

/// A subscription slot that accepts exactly one inner subscription.
///
/// Disposing the slot disposes what it holds. If the slot is disposed before
/// anything is assigned, the value assigned later is disposed on the spot,
/// which is what makes it the authority on whether an asynchronously produced
/// effect "landed": schedulers assign an action's result here once the action
/// has run, and a cancellation that raced with the action still releases the
/// result.
#[derive(Clone, Default)]
pub struct SingleAssignmentSubscription(Arc<Mutex<Slot>>);

impl SingleAssignmentSubscription {
  pub fn new() -> Self { Self::default() }

  /// Assign the inner subscription.
  ///
  /// Returns [`ContractViolation::AlreadyAssigned`] if a value is already
  /// held; the rejected subscription is dropped without being disposed.
  pub fn set(
    &self, subscription: impl Subscription + Send + Sync + 'static,
  ) -> Result<(), ContractViolation> {
    let mut slot = self.0.lock();
    if matches!(*slot, Slot::Assigned(_)) {
      return Err(ContractViolation::AlreadyAssigned);
    }
    if matches!(*slot, Slot::Disposed) {
      drop(slot);
      subscription.unsubscribe();
      return Ok(());
    }
    *slot = Slot::Assigned(BoxSubscription::new(subscription));
    Ok(())
  }

  /// Whether a value has been assigned and not yet disposed.
  pub fn is_assigned(&self) -> bool { matches!(&*self.0.lock(), Slot::Assigned(_)) }
}

impl Subscription for SingleAssignmentSubscription {
  fn unsubscribe(&self) {
    let prev = std::mem::replace(&mut *self.0.lock(), Slot::Disposed);
    if let Slot::Assigned(inner) = prev {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { matches!(&*self.0.lock(), Slot::Disposed) }
}

impl Debug for SingleAssignmentSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = match &*self.0.lock() {
      Slot::Empty => "empty",
      Slot::Assigned(_) => "assigned",
      Slot::Disposed => "disposed",
    };
    f.debug_tuple("SingleAssignmentSubscription")
      .field(&state)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::subscription::ActionSubscription;

  fn counter() -> (Arc<AtomicUsize>, ActionSubscription) {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    let s = ActionSubscription::new(move || {
      c_hits.fetch_add(1, Ordering::SeqCst);
    });
    (hits, s)
  }

  #[test]
  fn dispose_after_assign() {
    let slot = SingleAssignmentSubscription::new();
    let (hits, inner) = counter();
    slot.set(inner).unwrap();
    assert!(slot.is_assigned());
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    slot.unsubscribe();
    slot.unsubscribe();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(slot.is_closed());
    assert!(!slot.is_assigned());
  }

  #[test]
  fn assign_after_dispose_disposes_immediately() {
    let slot = SingleAssignmentSubscription::new();
    slot.unsubscribe();
    let (hits, inner) = counter();
    assert_eq!(slot.set(inner.clone()), Ok(()));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(inner.is_closed());
    assert!(!slot.is_assigned());
  }

  #[test]
  fn double_assign_is_violation() {
    let slot = SingleAssignmentSubscription::new();
    let (first_hits, first) = counter();
    let (second_hits, second) = counter();
    slot.set(first).unwrap();
    assert_eq!(slot.set(second), Err(ContractViolation::AlreadyAssigned));

    slot.unsubscribe();
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);
  }
}
