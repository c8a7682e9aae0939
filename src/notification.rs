use std::fmt::{Display, Formatter};

use crate::observer::Observer;

/// One emitted item of a sequence: a value, an error, or the completion
/// signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

/// The tag of a [`Notification`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
  Next,
  Error,
  Completed,
}

impl<Item, Err> Notification<Item, Err> {
  pub fn kind(&self) -> NotificationKind {
    match self {
      Notification::Next(_) => NotificationKind::Next,
      Notification::Error(_) => NotificationKind::Error,
      Notification::Completed => NotificationKind::Completed,
    }
  }

  /// `Error` and `Completed` end a sequence.
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  /// Deliver this notification to `observer`.
  pub fn accept<O>(self, observer: &mut O)
  where
    O: Observer<Item, Err> + ?Sized,
  {
    match self {
      Notification::Next(v) => observer.next(v),
      Notification::Error(e) => observer.error(e),
      Notification::Completed => observer.complete(),
    }
  }
}

impl Display for NotificationKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let tag = match self {
      NotificationKind::Next => "N",
      NotificationKind::Error => "E",
      NotificationKind::Completed => "C",
    };
    f.write_str(tag)
  }
}
