//! Deterministic testing on a virtual clock.
//!
//! [`TestScheduler`] drives a virtual clock in next-tick mode and hands out
//! recording sources and observers:
//!
//! - a *hot* observable fires its notifications at absolute ticks whether or
//!   not anyone listens,
//! - a *cold* observable replays them relative to each subscription,
//! - a [`TestObserver`] records every notification with the tick it arrived.
//!
//! Sources also log each subscription as a `[subscribe, unsubscribe)` tick
//! interval. A subscription ends when it is disposed or when its observer
//! receives `error` or `complete`, whichever comes first.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let source = scheduler.create_hot_observable(vec![
//!   next_at::<i32, ()>(150, 1),
//!   next_at(210, 2),
//!   completed_at(250),
//! ]);
//! let c_source = source.clone();
//! let observer = scheduler.start(move || c_source.map(|v| v * 10));
//!
//! assert_eq!(observer.messages(), vec![next_at(210, 20), completed_at(250)]);
//! assert_eq!(source.subscriptions(), vec![subscribed(200, 250)]);
//! ```

mod cold;
mod hot;
mod observer;
mod recorded;
mod test_scheduler;

pub use cold::ColdObservable;
pub use hot::HotObservable;
pub use observer::TestObserver;
pub use recorded::{completed_at, error_at, next_at, subscribed, Recorded, SubscriptionLog};
pub use test_scheduler::{TestScheduler, TestTimeline};
