use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Observer;
use crate::error::ContractViolation;

const IDLE: u8 = 0;
const BUSY: u8 = 1;
const DONE: u8 = 2;

/// Where a [`CheckedObserver`] stands in the notification grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
  /// Ready for the next notification.
  Idle,
  /// A notification is being delivered right now.
  Busy,
  /// `error` or `complete` has been delivered; nothing else will pass.
  Done,
}

struct Shared<O> {
  state: AtomicU8,
  observer: Mutex<O>,
}

/// An observer wrapper that enforces the notification grammar
/// `next* (error | complete)?` and rejects overlapping calls.
///
/// Every call first moves the guard from idle to busy in a single atomic
/// step, so a second call that arrives while one is in flight, whether
/// recursively from the handler or from another thread, is rejected with
/// [`ContractViolation::Reentrant`] instead of being delivered. A call after a
/// terminal notification is rejected with
/// [`ContractViolation::AlreadyCompleted`].
///
/// After a non-terminal call the guard returns to idle even if the inner
/// handler panicked; after a terminal call it is done for good.
///
/// The `try_*` methods report violations as values. The [`Observer`] impl
/// panics with the violation instead, which surfaces a misbehaving producer
/// at the call site.
///
/// Clones share the same guard and inner observer.
pub struct CheckedObserver<O>(Arc<Shared<O>>);

impl<O> CheckedObserver<O> {
  pub fn new(observer: O) -> Self {
    Self(Arc::new(Shared { state: AtomicU8::new(IDLE), observer: Mutex::new(observer) }))
  }

  pub fn state(&self) -> GuardState {
    match self.0.state.load(Ordering::Acquire) {
      IDLE => GuardState::Idle,
      BUSY => GuardState::Busy,
      _ => GuardState::Done,
    }
  }

  fn enter(&self, terminal: bool) -> Result<Exit<'_>, ContractViolation> {
    match self
      .0
      .state
      .compare_exchange(IDLE, BUSY, Ordering::AcqRel, Ordering::Acquire)
    {
      Ok(_) => Ok(Exit { state: &self.0.state, to: if terminal { DONE } else { IDLE } }),
      Err(BUSY) => Err(ContractViolation::Reentrant),
      Err(_) => Err(ContractViolation::AlreadyCompleted),
    }
  }

  pub fn try_next<Item, Err>(&self, value: Item) -> Result<(), ContractViolation>
  where
    O: Observer<Item, Err>,
  {
    let _exit = self.enter(false)?;
    self.0.observer.lock().next(value);
    Ok(())
  }

  pub fn try_error<Item, Err>(&self, err: Err) -> Result<(), ContractViolation>
  where
    O: Observer<Item, Err>,
  {
    let _exit = self.enter(true)?;
    self.0.observer.lock().error(err);
    Ok(())
  }

  pub fn try_complete<Item, Err>(&self) -> Result<(), ContractViolation>
  where
    O: Observer<Item, Err>,
  {
    let _exit = self.enter(true)?;
    Observer::<Item, Err>::complete(&mut *self.0.observer.lock());
    Ok(())
  }
}

/// Leaves the busy state when dropped, including during unwinding.
struct Exit<'a> {
  state: &'a AtomicU8,
  to: u8,
}

impl Drop for Exit<'_> {
  fn drop(&mut self) { self.state.store(self.to, Ordering::Release); }
}

impl<O> Clone for CheckedObserver<O> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item, Err, O> Observer<Item, Err> for CheckedObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Err(e) = self.try_next::<Item, Err>(value) {
      panic!("{e}");
    }
  }

  fn error(&mut self, err: Err) {
    if let Err(e) = self.try_error::<Item, Err>(err) {
      panic!("{e}");
    }
  }

  fn complete(&mut self) {
    if let Err(e) = self.try_complete::<Item, Err>() {
      panic!("{e}");
    }
  }

  /// Never touches the inner observer, so it is safe to ask from inside a
  /// handler.
  fn is_closed(&self) -> bool { self.0.state.load(Ordering::Acquire) == DONE }
}
