//! Injected observability sink.
//!
//! Schedulers report what they do through a [`Tracer`] handed to them at
//! construction. A tracer owns its own `tracing` dispatcher, so events go only
//! where the caller routed them and nothing is written to a process-wide
//! logger. The default tracer is disabled and costs one comparison per event.

use std::fmt::{Debug, Formatter};

use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Level};

#[derive(Clone)]
pub struct Tracer {
  dispatch: Option<Dispatch>,
  filter: LevelFilter,
}

impl Tracer {
  /// Route events at or above `filter` to `dispatch`.
  pub fn new(dispatch: Dispatch, filter: LevelFilter) -> Self {
    Self { dispatch: Some(dispatch), filter }
  }

  pub fn disabled() -> Self { Self { dispatch: None, filter: LevelFilter::OFF } }

  #[inline]
  pub fn enabled(&self, level: Level) -> bool { self.dispatch.is_some() && self.filter >= level }

  /// Run `f` with this tracer's dispatcher as the current default, if `level`
  /// passes the filter. `f` is expected to emit `tracing` events.
  #[inline]
  pub fn emit(&self, level: Level, f: impl FnOnce()) {
    if !self.enabled(level) {
      return;
    }
    if let Some(dispatch) = &self.dispatch {
      tracing::dispatcher::with_default(dispatch, f);
    }
  }
}

impl Default for Tracer {
  fn default() -> Self { Self::disabled() }
}

impl Debug for Tracer {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Tracer")
      .field("enabled", &self.dispatch.is_some())
      .field("filter", &self.filter)
      .finish()
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use std::io;
  use std::sync::Arc;

  use parking_lot::Mutex;

  use super::*;

  /// A tracer writing plain formatted events into a shared buffer.
  pub(crate) fn capture(filter: LevelFilter) -> (Tracer, Arc<Mutex<Vec<u8>>>) {
    let buf = Arc::new(Mutex::new(vec![]));
    let c_buf = buf.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_ansi(false)
      .with_max_level(Level::TRACE)
      .with_writer(move || BufWriter(c_buf.clone()))
      .finish();
    (Tracer::new(Dispatch::new(subscriber), filter), buf)
  }

  pub(crate) fn captured(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8_lossy(&buf.lock()).into_owned()
  }

  struct BufWriter(Arc<Mutex<Vec<u8>>>);

  impl io::Write for BufWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
      self.0.lock().extend_from_slice(data);
      Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
  }

  #[test]
  fn disabled_never_runs() {
    let tracer = Tracer::default();
    let mut ran = false;
    tracer.emit(Level::ERROR, || ran = true);
    assert!(!ran);
    assert!(!tracer.enabled(Level::ERROR));
  }

  #[test]
  fn filter_by_level() {
    let (tracer, buf) = capture(LevelFilter::DEBUG);
    assert!(tracer.enabled(Level::DEBUG));
    assert!(!tracer.enabled(Level::TRACE));

    tracer.emit(Level::DEBUG, || tracing::debug!(tick = 3, "kept"));
    tracer.emit(Level::TRACE, || tracing::trace!("dropped"));
    let out = captured(&buf);
    assert!(out.contains("kept"));
    assert!(out.contains("tick=3"));
    assert!(!out.contains("dropped"));
  }
}
