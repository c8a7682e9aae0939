//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::error::{ContractViolation, VirtualTimeError};
pub use crate::notification::Notification;
pub use crate::observable;
pub use crate::observable::{Observable, ObservableExt};
pub use crate::observer::{
  BoxObserver, CheckedObserver, FnMutObserver, GuardState, Observer, ObserverAll, ObserverExt,
};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
pub use crate::scheduler::{
  schedule_recursive, DuePolicy, Duration, HostScheduler, NewThreadScheduler, Scheduler, Tick,
  TimerHost, VirtualTimeConfig, VirtualTimeScheduler,
};
pub use crate::subscriber::{subscribe_detached, Subscriber};
pub use crate::subscription::{
  ActionSubscription, BoxSubscription, CompositeSubscription, SingleAssignmentSubscription,
  Subscription, SubscriptionGuard,
};
pub use crate::testing::{
  completed_at, error_at, next_at, subscribed, Recorded, SubscriptionLog, TestObserver,
  TestScheduler, TestTimeline,
};
pub use crate::trace::Tracer;
