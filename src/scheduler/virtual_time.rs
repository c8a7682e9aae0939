//! Virtual time scheduler for deterministic testing of time-based code.
//!
//! Time is a counter of [`Tick`]s that only moves when the run loop takes the
//! next due action, or when the caller moves it explicitly. Nothing sleeps:
//! `start()` drains the queue as fast as it can, in due order.
//!
//! # Ordering
//!
//! Pending actions are keyed by `(due tick, sequence number)`. Two actions due
//! at the same tick run in the order they were scheduled, including actions
//! scheduled from inside a running action.
//!
//! # Locking
//!
//! The queue lives behind one lock that is never held while user code runs:
//! actions, the disposal of their results, and the drop of a cancelled action
//! all happen after the lock is released. An action may therefore schedule,
//! cancel, or query the clock freely.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::Level;

use super::{Duration, Scheduler, Tick};
use crate::error::VirtualTimeError;
use crate::subscription::{BoxSubscription, SingleAssignmentSubscription, Subscription};
use crate::trace::Tracer;

/// Where work that is due at or before the current tick lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuePolicy {
  /// Run at the current tick, after everything already queued for it.
  #[default]
  Clamp,
  /// Run one tick after the current one. A subscription made at tick 200
  /// then sees its first immediate emission at 201.
  NextTick,
}

#[derive(Debug, Clone)]
pub struct VirtualTimeConfig {
  /// Real duration one tick stands for, used to convert delays.
  pub tick: Duration,
  pub due_policy: DuePolicy,
  pub tracer: Tracer,
}

impl Default for VirtualTimeConfig {
  fn default() -> Self {
    Self { tick: Duration::from_millis(1), due_policy: DuePolicy::Clamp, tracer: Tracer::disabled() }
  }
}

type Action = Box<dyn FnOnce(&VirtualTimeScheduler) -> BoxSubscription + Send>;

struct ScheduledItem {
  action: Action,
  slot: SingleAssignmentSubscription,
}

#[derive(Default)]
struct VirtualState {
  clock: Tick,
  next_seq: u64,
  queue: BTreeMap<(Tick, u64), ScheduledItem>,
  running: bool,
  stop_requested: bool,
}

/// A scheduler whose clock is a tick counter driven by its own run loop.
///
/// Clones share the clock and the queue.
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler {
  state: Arc<Mutex<VirtualState>>,
  config: Arc<VirtualTimeConfig>,
}

impl VirtualTimeScheduler {
  pub fn new() -> Self { Self::default() }

  pub fn with_config(config: VirtualTimeConfig) -> Self {
    Self { state: Default::default(), config: Arc::new(config) }
  }

  pub fn config(&self) -> &VirtualTimeConfig { &self.config }

  /// The current tick.
  pub fn clock(&self) -> Tick { self.state.lock().clock }

  /// Number of actions waiting to run.
  pub fn pending_count(&self) -> usize { self.state.lock().queue.len() }

  pub fn is_empty(&self) -> bool { self.state.lock().queue.is_empty() }

  /// Schedule `action` at tick `due`, subject to the [`DuePolicy`].
  pub fn schedule_at_tick<S: Send + 'static>(
    &self, due: Tick, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static, state: S,
  ) -> BoxSubscription {
    self.enqueue(|_| due, Box::new(move |sch: &Self| action(sch, state)))
  }

  fn enqueue(&self, due: impl FnOnce(Tick) -> Tick, action: Action) -> BoxSubscription {
    let slot = SingleAssignmentSubscription::new();
    let key = {
      let mut state = self.state.lock();
      let clock = state.clock;
      let due = match self.config.due_policy {
        DuePolicy::Clamp => due(clock).max(clock),
        DuePolicy::NextTick => {
          let due = due(clock);
          if due <= clock { clock.saturating_add(1) } else { due }
        }
      };
      let seq = state.next_seq;
      state.next_seq += 1;
      state
        .queue
        .insert((due, seq), ScheduledItem { action, slot: slot.clone() });
      (due, seq)
    };
    self
      .config
      .tracer
      .emit(Level::TRACE, || tracing::trace!(due = key.0, seq = key.1, "action scheduled"));

    BoxSubscription::new(ScheduledHandle {
      key,
      state: Arc::downgrade(&self.state),
      slot,
      tracer: self.config.tracer.clone(),
    })
  }

  /// Run every pending action, including the ones scheduled while running,
  /// until the queue is empty or [`stop`](Self::stop) is called.
  ///
  /// Calling it from inside a running action does nothing.
  pub fn start(&self) { self.start_until(Tick::MAX) }

  /// Run pending actions due at or before `stop`.
  ///
  /// Calling it from inside a running action does nothing.
  pub fn start_until(&self, stop: Tick) {
    if let Err(err) = self.run(stop) {
      self
        .config
        .tracer
        .emit(Level::WARN, || tracing::warn!(%err, "nested run ignored"));
    }
  }

  /// Run everything due at or before `target`, then set the clock to
  /// `target`.
  pub fn advance_to(&self, target: Tick) -> Result<(), VirtualTimeError> {
    {
      let state = self.state.lock();
      if state.running {
        return Err(VirtualTimeError::AlreadyRunning);
      }
      if target < state.clock {
        return Err(VirtualTimeError::ClockRegression { now: state.clock, target });
      }
    }
    self.run(target)?;
    let mut state = self.state.lock();
    state.clock = state.clock.max(target);
    let clock = state.clock;
    drop(state);
    self
      .config
      .tracer
      .emit(Level::DEBUG, || tracing::debug!(clock, "clock advanced"));
    Ok(())
  }

  /// [`advance_to`](Self::advance_to) the current tick plus `ticks`.
  pub fn advance_by(&self, ticks: Tick) -> Result<(), VirtualTimeError> {
    let target = self.clock().saturating_add(ticks);
    self.advance_to(target)
  }

  /// Move the clock forward by `ticks` without running anything.
  pub fn sleep(&self, ticks: Tick) {
    let clock = {
      let mut state = self.state.lock();
      state.clock = state.clock.saturating_add(ticks);
      state.clock
    };
    self
      .config
      .tracer
      .emit(Level::DEBUG, || tracing::debug!(clock, "clock moved without running"));
  }

  /// Make the current run return once the running action finishes.
  pub fn stop(&self) { self.state.lock().stop_requested = true; }

  fn run(&self, stop: Tick) -> Result<(), VirtualTimeError> {
    {
      let mut state = self.state.lock();
      if state.running {
        return Err(VirtualTimeError::AlreadyRunning);
      }
      state.running = true;
      state.stop_requested = false;
    }
    let _running = RunningGuard(&self.state);

    loop {
      let (due, item) = {
        let mut state = self.state.lock();
        if state.stop_requested {
          break;
        }
        let Some(entry) = state.queue.first_entry() else {
          break;
        };
        let due = entry.key().0;
        if due > stop {
          break;
        }
        let item = entry.remove();
        state.clock = state.clock.max(due);
        (due, item)
      };

      let ScheduledItem { action, slot } = item;
      if slot.is_closed() {
        continue;
      }
      self
        .config
        .tracer
        .emit(Level::TRACE, || tracing::trace!(due, "action running"));
      let assigned = slot.set(action(self));
      debug_assert!(assigned.is_ok());
    }
    Ok(())
  }

  fn ticks_to_duration(&self, ticks: Tick) -> Duration {
    let nanos = self.config.tick.as_nanos().saturating_mul(ticks as u128);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
  }

  /// Whole ticks covering `d`, rounded up.
  fn duration_to_ticks(&self, d: Duration) -> Tick {
    let tick = self.config.tick.as_nanos().max(1);
    Tick::try_from(d.as_nanos().div_ceil(tick)).unwrap_or(Tick::MAX)
  }
}

struct RunningGuard<'a>(&'a Mutex<VirtualState>);

impl Drop for RunningGuard<'_> {
  fn drop(&mut self) { self.0.lock().running = false; }
}

impl Scheduler for VirtualTimeScheduler {
  fn now(&self) -> Duration { self.ticks_to_duration(self.clock()) }

  fn schedule_relative<S: Send + 'static>(
    &self, delay: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription {
    let delay = self.duration_to_ticks(delay);
    self.enqueue(
      |clock| clock.saturating_add(delay),
      Box::new(move |sch: &Self| action(sch, state)),
    )
  }

  fn schedule_absolute<S: Send + 'static>(
    &self, due: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription {
    let due = self.duration_to_ticks(due);
    self.enqueue(|_| due, Box::new(move |sch: &Self| action(sch, state)))
  }
}

impl Debug for VirtualTimeScheduler {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = self.state.lock();
    f.debug_struct("VirtualTimeScheduler")
      .field("clock", &state.clock)
      .field("pending", &state.queue.len())
      .field("running", &state.running)
      .finish()
  }
}

/// Cancels one queued action.
struct ScheduledHandle {
  key: (Tick, u64),
  state: Weak<Mutex<VirtualState>>,
  slot: SingleAssignmentSubscription,
  tracer: Tracer,
}

impl Subscription for ScheduledHandle {
  fn unsubscribe(&self) {
    if let Some(state) = self.state.upgrade() {
      let removed = state.lock().queue.remove(&self.key);
      if removed.is_some() {
        let (due, seq) = self.key;
        self
          .tracer
          .emit(Level::DEBUG, || tracing::debug!(due, seq, "action cancelled"));
      }
      drop(removed);
    }
    self.slot.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.slot.is_closed() }
}
