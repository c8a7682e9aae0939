//! Error types.
//!
//! Two families live here. [`ContractViolation`] reports a broken observer
//! grammar or a misused single-assignment slot; these are programming errors
//! in an operator or a source and are never turned into an `error`
//! notification. [`VirtualTimeError`] reports misuse of the virtual clock.
//!
//! Failures of user computations inside operators are not represented here:
//! they travel downstream through `Observer::error` with the stream's own
//! error type.

use thiserror::Error;

use crate::scheduler::Tick;

/// A violation of the reactive contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ContractViolation {
  /// A notification entered while another one was still being delivered to
  /// the same observer, either recursively or from another thread.
  #[error("contract violation: reentrant call")]
  Reentrant,

  /// A notification arrived after `error` or `complete`.
  #[error("contract violation: already completed")]
  AlreadyCompleted,

  /// A single-assignment subscription was assigned twice.
  #[error("contract violation: already assigned")]
  AlreadyAssigned,
}

/// Misuse of a [`VirtualTimeScheduler`](crate::scheduler::VirtualTimeScheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VirtualTimeError {
  #[error("virtual clock cannot move backward from {now} to {target}")]
  ClockRegression { now: Tick, target: Tick },

  #[error("virtual time scheduler is already running")]
  AlreadyRunning,
}
