use smallvec::SmallVec;

/// A container for managing multiple items with ID-based tracking.
///
/// Items keep insertion order, which is the order [`drain`](Self::drain)
/// yields them in. It backs [`CompositeSubscription`] and the observer lists
/// of hot test sources.
///
/// # Design
///
/// - **SmallVec Optimization**: Uses `SmallVec<[_; 2]>` to avoid heap
///   allocation for the common case of 0-2 items.
/// - **Stable IDs**: IDs are never reused, so a stale ID can't remove a newer
///   item.
///
/// # Examples
///
/// ```rust
/// use rxcore::subscription::DynamicSubscriptions;
///
/// let mut subs: DynamicSubscriptions<&str> = DynamicSubscriptions::default();
///
/// let id1 = subs.add("a");
/// let _id2 = subs.add("b");
/// assert_eq!(subs.len(), 2);
///
/// assert_eq!(subs.remove(id1), Some("a"));
/// assert_eq!(subs.remove(id1), None);
/// assert_eq!(subs.drain().collect::<Vec<_>>(), vec!["b"]);
/// ```
///
/// [`CompositeSubscription`]: super::CompositeSubscription
pub struct DynamicSubscriptions<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for DynamicSubscriptions<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> DynamicSubscriptions<U> {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Add an item and return its unique ID.
  #[inline]
  pub fn add(&mut self, item: U) -> usize {
    let id = self.reserve_id();
    self.items.push((id, item));
    id
  }

  /// Reserve the next ID without adding an item.
  #[inline]
  pub fn reserve_id(&mut self) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  /// Remove an item by ID.
  pub fn remove(&mut self, id: usize) -> Option<U> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Drain all items in insertion order.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = U> + '_ {
    self.items.drain(..).map(|(_, item)| item)
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &U> { self.items.iter().map(|(_, item)| item) }
}
