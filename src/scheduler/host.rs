use std::sync::Arc;

use tracing::Level;

use super::{Duration, Scheduler};
use crate::subscription::{BoxSubscription, CompositeSubscription, SingleAssignmentSubscription, Subscription};
use crate::trace::Tracer;

/// The one primitive an event loop has to offer to drive a [`Scheduler`].
pub trait TimerHost: Send + Sync + 'static {
  /// Cancels a pending callback.
  type Handle: Subscription + Send + Sync + 'static;

  /// The host's current time, measured from any fixed epoch.
  fn now(&self) -> Duration;

  /// Call `callback` on the host once `delay` has passed.
  fn call_later(&self, delay: Duration, callback: Box<dyn FnOnce() + Send>) -> Self::Handle;
}

/// A [`Scheduler`] on top of a host event loop.
///
/// Immediate work is `call_later` with a zero delay, and absolute times are
/// turned into delays against the host clock.
pub struct HostScheduler<H> {
  host: Arc<H>,
  tracer: Tracer,
}

impl<H: TimerHost> HostScheduler<H> {
  pub fn new(host: H) -> Self { Self::with_tracer(host, Tracer::disabled()) }

  pub fn with_tracer(host: H, tracer: Tracer) -> Self { Self { host: Arc::new(host), tracer } }

  pub fn host(&self) -> &H { &self.host }
}

impl<H> Clone for HostScheduler<H> {
  fn clone(&self) -> Self { Self { host: self.host.clone(), tracer: self.tracer.clone() } }
}

impl<H: TimerHost> Scheduler for HostScheduler<H> {
  fn now(&self) -> Duration { self.host.now() }

  fn schedule_relative<S: Send + 'static>(
    &self, delay: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription {
    let slot = SingleAssignmentSubscription::new();
    let c_slot = slot.clone();
    let this = self.clone();
    let host_handle = self.host.call_later(
      delay,
      Box::new(move || {
        if c_slot.is_closed() {
          return;
        }
        let assigned = c_slot.set(action(&this, state));
        debug_assert!(assigned.is_ok());
      }),
    );
    self
      .tracer
      .emit(Level::TRACE, || tracing::trace!(?delay, "host callback requested"));

    let handle = CompositeSubscription::new();
    handle.add(slot);
    handle.add(host_handle);
    BoxSubscription::new(handle)
  }
}
