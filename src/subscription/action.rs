use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Subscription;

type Teardown = Box<dyn FnOnce() + Send>;

/// A subscription that runs a teardown closure the first time it is
/// unsubscribed.
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let count = Arc::new(AtomicUsize::new(0));
/// let c_count = count.clone();
/// let subscription = ActionSubscription::new(move || {
///   c_count.fetch_add(1, Ordering::SeqCst);
/// });
/// subscription.unsubscribe();
/// subscription.unsubscribe();
/// assert_eq!(count.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct ActionSubscription(Arc<Mutex<Option<Teardown>>>);

impl ActionSubscription {
  pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
    Self(Arc::new(Mutex::new(Some(Box::new(teardown)))))
  }
}

impl Subscription for ActionSubscription {
  fn unsubscribe(&self) {
    let teardown = self.0.lock().take();
    if let Some(teardown) = teardown {
      teardown();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().is_none() }
}

impl Debug for ActionSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ActionSubscription")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}
