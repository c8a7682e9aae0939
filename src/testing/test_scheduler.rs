use super::{ColdObservable, HotObservable, Recorded, TestObserver};
use crate::error::VirtualTimeError;
use crate::notification::Notification;
use crate::observable::Observable;
use crate::rc::MutArc;
use crate::scheduler::{
  DuePolicy, Duration, Scheduler, Tick, VirtualTimeConfig, VirtualTimeScheduler,
};
use crate::subscriber::{attach, Subscriber};
use crate::subscription::{BoxSubscription, SingleAssignmentSubscription, Subscription};
use crate::trace::Tracer;

/// When [`TestScheduler::start_with`] creates, subscribes and disposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestTimeline {
  pub created: Tick,
  pub subscribed: Tick,
  pub disposed: Tick,
}

impl Default for TestTimeline {
  fn default() -> Self { Self { created: 100, subscribed: 200, disposed: 1000 } }
}

/// A virtual time scheduler for tests.
///
/// Work due at or before the current tick runs one tick later, so a
/// subscription made at 200 sees its first immediate emission at 201.
/// Clones share the clock and the queue.
#[derive(Clone, Debug)]
pub struct TestScheduler(VirtualTimeScheduler);

impl Default for TestScheduler {
  fn default() -> Self { Self::new() }
}

impl TestScheduler {
  pub fn new() -> Self { Self::with_tracer(Tracer::disabled()) }

  pub fn with_tracer(tracer: Tracer) -> Self {
    Self(VirtualTimeScheduler::with_config(VirtualTimeConfig {
      due_policy: DuePolicy::NextTick,
      tracer,
      ..Default::default()
    }))
  }

  /// The underlying virtual time scheduler.
  pub fn virtual_time(&self) -> &VirtualTimeScheduler { &self.0 }

  #[inline]
  pub fn clock(&self) -> Tick { self.0.clock() }

  pub fn pending_count(&self) -> usize { self.0.pending_count() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Run every pending action until the queue is empty.
  pub fn flush(&self) { self.0.start() }

  pub fn advance_to(&self, target: Tick) -> Result<(), VirtualTimeError> { self.0.advance_to(target) }

  pub fn advance_by(&self, ticks: Tick) -> Result<(), VirtualTimeError> { self.0.advance_by(ticks) }

  pub fn sleep(&self, ticks: Tick) { self.0.sleep(ticks) }

  pub fn stop(&self) { self.0.stop() }

  pub fn schedule_at_tick<S: Send + 'static>(
    &self, due: Tick, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static, state: S,
  ) -> BoxSubscription {
    self.0.schedule_at_tick(due, wrap(action), state)
  }

  /// A source that emits `messages` at their absolute ticks.
  pub fn create_hot_observable<Item, Err>(
    &self, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> HotObservable<Item, Err>
  where
    Item: Clone + Send + 'static,
    Err: Clone + Send + 'static,
  {
    HotObservable::new(self.clone(), messages)
  }

  /// A source that replays `messages` relative to each subscription.
  pub fn create_cold_observable<Item, Err>(
    &self, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> ColdObservable<Item, Err> {
    ColdObservable::new(self.clone(), messages)
  }

  pub fn create_observer<Item, Err>(&self) -> TestObserver<Item, Err> { TestObserver::new(self.clone()) }

  /// [`start_with`](Self::start_with) the default timeline: create at 100,
  /// subscribe at 200, dispose at 1000.
  pub fn start<F, Src, Item, Err>(&self, create: F) -> TestObserver<Item, Err>
  where
    F: FnOnce() -> Src + Send + 'static,
    Src: Observable<Item, Err, Subscriber<TestObserver<Item, Err>>> + Send + 'static,
    Src::Unsub: Send + Sync + 'static,
    Item: Send + 'static,
    Err: Send + 'static,
  {
    self.start_with(create, TestTimeline::default())
  }

  /// Create the source at `timeline.created`, subscribe a recording observer
  /// at `timeline.subscribed`, unsubscribe at `timeline.disposed`, run until
  /// the queue is empty and return the observer.
  ///
  /// The observer is wrapped in a [`Subscriber`], so the first terminal
  /// notification unsubscribes the whole chain at that tick.
  pub fn start_with<F, Src, Item, Err>(&self, create: F, timeline: TestTimeline) -> TestObserver<Item, Err>
  where
    F: FnOnce() -> Src + Send + 'static,
    Src: Observable<Item, Err, Subscriber<TestObserver<Item, Err>>> + Send + 'static,
    Src::Unsub: Send + Sync + 'static,
    Item: Send + 'static,
    Err: Send + 'static,
  {
    let observer = self.create_observer();
    let source = MutArc::own(None);
    let subscription = SingleAssignmentSubscription::new();

    let c_source = source.clone();
    self.schedule_at_tick(
      timeline.created,
      move |_, ()| {
        *c_source.lock() = Some(create());
        BoxSubscription::empty()
      },
      (),
    );

    let (c_subscription, c_observer) = (subscription.clone(), observer.clone());
    self.schedule_at_tick(
      timeline.subscribed,
      move |_, ()| {
        if let Some(source) = source.take() {
          let subscriber = Subscriber::new(c_observer);
          let slot = subscriber.upstream();
          attach(&slot, source.actual_subscribe(subscriber));
          attach(&c_subscription, slot);
        }
        BoxSubscription::empty()
      },
      (),
    );

    self.schedule_at_tick(
      timeline.disposed,
      move |_, ()| {
        subscription.unsubscribe();
        BoxSubscription::empty()
      },
      (),
    );

    self.flush();
    observer
  }
}

/// Adapt an action taking `&TestScheduler` to the inner scheduler.
fn wrap<S>(
  action: impl FnOnce(&TestScheduler, S) -> BoxSubscription + Send + 'static,
) -> impl FnOnce(&VirtualTimeScheduler, S) -> BoxSubscription + Send + 'static {
  move |sch: &VirtualTimeScheduler, state| action(&TestScheduler(sch.clone()), state)
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Duration { self.0.now() }

  fn schedule_relative<S: Send + 'static>(
    &self, delay: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription {
    self.0.schedule_relative(delay, wrap(action), state)
  }

  fn schedule_absolute<S: Send + 'static>(
    &self, due: Duration, action: impl FnOnce(&Self, S) -> BoxSubscription + Send + 'static,
    state: S,
  ) -> BoxSubscription {
    self.0.schedule_absolute(due, wrap(action), state)
  }
}

#[cfg(test)]
mod tests {
  use tracing::level_filters::LevelFilter;

  use crate::prelude::*;
  use crate::rc::MutArc;
  use crate::trace::tests::{capture, captured};

  #[test]
  fn hot_source_emits_at_absolute_ticks() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_hot_observable(vec![
      next_at::<i32, ()>(150, 1),
      next_at(210, 2),
      next_at(250, 3),
      completed_at(300),
    ]);
    let c_source = source.clone();
    let observer = scheduler.start(move || c_source);

    assert_eq!(observer.messages(), vec![next_at(210, 2), next_at(250, 3), completed_at(300)]);
    assert_eq!(source.subscriptions(), vec![subscribed(200, 300)]);
  }

  #[test]
  fn cold_source_replays_relative_to_subscription() {
    let scheduler = TestScheduler::new();
    let source =
      scheduler.create_cold_observable(vec![next_at::<&str, ()>(10, "a"), completed_at(20)]);
    let c_source = source.clone();
    let observer = scheduler.start(move || c_source);

    assert_eq!(observer.messages(), vec![next_at(210, "a"), completed_at(220)]);
    assert_eq!(source.subscriptions(), vec![subscribed(200, 220)]);
  }

  #[test]
  fn custom_timeline_disposes_early() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_hot_observable(vec![
      next_at::<i32, ()>(210, 1),
      next_at(290, 2),
      completed_at(300),
    ]);
    let c_source = source.clone();
    let observer = scheduler.start_with(
      move || c_source,
      TestTimeline { disposed: 280, ..Default::default() },
    );

    assert_eq!(observer.messages(), vec![next_at(210, 1)]);
    assert_eq!(source.subscriptions(), vec![subscribed(200, 280)]);
  }

  #[test]
  fn create_runs_at_created_tick() {
    let scheduler = TestScheduler::new();
    let created_at = MutArc::own(None);
    let (c_at, c_sch) = (created_at.clone(), scheduler.clone());
    scheduler.start(move || {
      *c_at.lock() = Some(c_sch.clock());
      observable::empty::<i32>()
    });
    assert_eq!(*created_at.lock(), Some(100));
  }

  #[test]
  fn immediate_work_lands_on_next_tick() {
    let scheduler = TestScheduler::new();
    let c_sch = scheduler.clone();
    let observer = scheduler.start(move || observable::start(|| Ok::<_, ()>(42), c_sch));
    assert_eq!(observer.messages(), vec![next_at(201, 42), completed_at(201)]);
  }

  #[test]
  fn actions_receive_the_test_scheduler() {
    let scheduler = TestScheduler::new();
    let seen = MutArc::own(vec![]);
    let c_seen = seen.clone();
    scheduler.schedule_relative(
      Duration::from_millis(5),
      move |sch, ()| {
        c_seen.lock().push(sch.clock());
        let c_seen = c_seen.clone();
        sch.schedule(
          move |sch, ()| {
            c_seen.lock().push(sch.clock());
            BoxSubscription::empty()
          },
          (),
        )
      },
      (),
    );
    scheduler.flush();
    assert_eq!(*seen.lock(), vec![5, 6]);
  }

  #[test]
  fn advance_rejects_going_backward() {
    let scheduler = TestScheduler::new();
    scheduler.advance_to(300).unwrap();
    assert_eq!(
      scheduler.advance_to(200),
      Err(VirtualTimeError::ClockRegression { now: 300, target: 200 })
    );
  }

  #[test]
  fn nested_flush_is_reported() {
    let (tracer, buf) = capture(LevelFilter::WARN);
    let scheduler = TestScheduler::with_tracer(tracer);
    scheduler.schedule_at_tick(
      10,
      |sch, ()| {
        sch.flush();
        BoxSubscription::empty()
      },
      (),
    );
    scheduler.flush();
    assert!(captured(&buf).contains("nested run ignored"));
  }
}
