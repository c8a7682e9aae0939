//! # rxcore: the core of a Reactive Extensions runtime
//!
//! Subscriptions, contract-checked observers, schedulers, and a virtual clock
//! for testing timed sequences deterministically.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let mut out = vec![];
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| out.push(v));
//! assert_eq!(out, vec![0, 4, 8, 12, 16]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Subscription`] | Handle to release a resource, idempotent |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`CheckedObserver`] | Enforces the observer grammar at run time |
//! | [`Subscriber`] | Ends a sequence at its first terminal notification |
//! | [`Scheduler`] | Runs actions now, after a delay, or at a due time |
//! | [`VirtualTimeScheduler`] | A scheduler whose clock only moves when told |
//! | [`TestScheduler`] | Virtual time plus recording sources and observers |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ThreadPoolScheduler`] on a
//!   `futures` thread pool.
//!
//! [`Subscription`]: subscription::Subscription
//! [`Observer`]: observer::Observer
//! [`CheckedObserver`]: observer::CheckedObserver
//! [`Subscriber`]: subscriber::Subscriber
//! [`Scheduler`]: scheduler::Scheduler
//! [`VirtualTimeScheduler`]: scheduler::VirtualTimeScheduler
//! [`TestScheduler`]: testing::TestScheduler
//! [`ThreadPoolScheduler`]: scheduler::ThreadPoolScheduler

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subscriber;
pub mod subscription;
pub mod testing;
pub mod trace;

pub use prelude::*;

#[cfg(doctest)]
mod readme {
  #![doc = include_str!("../README.md")]
}
