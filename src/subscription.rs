//! Subscriptions: handles to cancelable resources.
//!
//! A subscription (a *disposable* in other Rx dialects) represents ownership
//! of something that can be released: an observer registration, a pending
//! scheduled action, a group of those. [`Subscription::unsubscribe`] is
//! idempotent: however many times and from however many threads it is
//! called, the release effect happens at most once.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ActionSubscription`] | Runs a closure on first unsubscribe |
//! | [`SingleAssignmentSubscription`] | A slot filled at most once, cancel-aware |
//! | [`CompositeSubscription`] | A group released together, in add order |
//! | [`BoxSubscription`] | Type-erased, thread-safe subscription |
//! | [`SubscriptionGuard`] | Unsubscribes when dropped |
//!
//! All concrete types are cheap handles over shared state; a clone refers to
//! the same subscription.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

mod action;
mod composite;
mod dynamic;
mod single_assignment;

pub use action::ActionSubscription;
pub use composite::{CompositeSubscription, SubscriptionKey};
pub use dynamic::DynamicSubscriptions;
pub use single_assignment::SingleAssignmentSubscription;

/// A handle that can release the resource it stands for.
pub trait Subscription {
  /// Release the resource. Calling this more than once has no further effect.
  fn unsubscribe(&self);

  /// Whether the resource is already released.
  fn is_closed(&self) -> bool;

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard(self)
  }
}

/// The empty subscription: nothing to release, always closed.
impl Subscription for () {
  #[inline]
  fn unsubscribe(&self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: Subscription + ?Sized> Subscription for Box<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<T: Subscription + ?Sized> Subscription for Arc<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<T: Subscription> Subscription for Option<T> {
  fn unsubscribe(&self) {
    if let Some(s) = self {
      s.unsubscribe()
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(Subscription::is_closed) }
}

/// Aborting a spawned future is releasing it.
impl Subscription for futures::future::AbortHandle {
  #[inline]
  fn unsubscribe(&self) { self.abort() }

  #[inline]
  fn is_closed(&self) -> bool { self.is_aborted() }
}

/// A type-erased, thread-safe subscription.
///
/// This is what scheduled actions return and what schedulers hand back, so
/// heterogeneous subscriptions can be stored side by side.
pub struct BoxSubscription(Box<dyn Subscription + Send + Sync>);

impl BoxSubscription {
  #[inline]
  pub fn new(subscription: impl Subscription + Send + Sync + 'static) -> Self {
    Self(Box::new(subscription))
  }

  /// A subscription with nothing behind it.
  #[inline]
  pub fn empty() -> Self { Self::new(()) }
}

impl Subscription for BoxSubscription {
  #[inline]
  fn unsubscribe(&self) { self.0.unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl Debug for BoxSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BoxSubscription")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(T);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }

  /// The guarded subscription.
  pub fn inner(&self) -> &T { &self.0 }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}
