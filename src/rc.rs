use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// A shared, lock-guarded cell.
///
/// Used wherever a value has to be reached from several closures, e.g. an
/// observer fed by scheduled actions, or a slot filled by one action and read
/// by another.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn lock(&self) -> MutexGuard<'_, T> { self.0.lock() }

  /// Replace the inner value, returning the old one.
  pub fn replace(&self, value: T) -> T { std::mem::replace(&mut *self.0.lock(), value) }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl<T> MutArc<Option<T>> {
  /// Take the value out, leaving `None`.
  ///
  /// The lock is released before the value is returned, so dropping or using
  /// it never runs under the lock.
  pub fn take(&self) -> Option<T> { self.0.lock().take() }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> From<T> for MutArc<T> {
  #[inline]
  fn from(v: T) -> Self { Self::own(v) }
}

impl<T: std::fmt::Debug> std::fmt::Debug for MutArc<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("MutArc").field(&*self.0.lock()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_share_value() {
    let a = MutArc::own(1);
    let b = a.clone();
    *b.lock() += 1;
    assert_eq!(*a.lock(), 2);
    assert!(a.ptr_eq(&b));
  }

  #[test]
  fn take_leaves_none() {
    let slot = MutArc::own(Some("v"));
    assert_eq!(slot.take(), Some("v"));
    assert_eq!(slot.take(), None);
  }
}
