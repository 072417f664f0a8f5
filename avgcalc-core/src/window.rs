//! Bounded, insertion-ordered window of unique numbers.
//!
//! [`Window`] is the plain data structure; [`WindowStore`] is the shared,
//! lock-guarded instance a server hands to every request.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use crate::types::Number;

/// Fixed-capacity FIFO of distinct values.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
	items: VecDeque<Number>,
	capacity: usize,
}

impl Window {
	/// Empty window holding at most `capacity` values.
	pub fn new(capacity: usize) -> Self {
		Self { items: VecDeque::with_capacity(capacity), capacity }
	}

	/// Configured maximum length.
	pub fn capacity(&self) -> usize { self.capacity }

	/// Current length.
	pub fn len(&self) -> usize { self.items.len() }

	/// Whether the window holds no values.
	pub fn is_empty(&self) -> bool { self.items.is_empty() }

	/// Whether `value` is currently held.
	pub fn contains(&self, value: Number) -> bool { self.items.contains(&value) }

	/// Owned copy of the contents, oldest first.
	pub fn to_vec(&self) -> Vec<Number> { self.items.iter().copied().collect() }

	/// Insert `value` unless already present, evicting the oldest entry when full.
	///
	/// Returns whether the value was inserted.
	pub fn push(&mut self, value: Number) -> bool {
		if self.capacity == 0 || self.contains(value) {
			return false;
		}
		if self.items.len() >= self.capacity {
			self.items.pop_front();
		}
		self.items.push_back(value);
		true
	}

	/// Fold `batch` in order; each element is checked against the live state.
	pub fn extend_unique(&mut self, batch: &[Number]) -> usize {
		batch.iter().filter(|&&v| self.push(v)).count()
	}
}

/// Before and after copies of the window around one update.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowUpdate {
	/// Contents before the batch was applied.
	pub previous: Vec<Number>,
	/// Contents after the batch was applied.
	pub current: Vec<Number>,
}

/// Process-wide window shared by all requests.
///
/// Every method takes the lock once, so an [`update`](Self::update) is
/// atomic with respect to other callers: its `previous` never reflects a
/// half-applied batch from someone else.
#[derive(Debug)]
pub struct WindowStore {
	inner: Mutex<Window>,
}

impl WindowStore {
	/// Empty store with the given capacity.
	pub fn new(capacity: usize) -> Self {
		Self { inner: Mutex::new(Window::new(capacity)) }
	}

	/// Apply `batch` and return snapshots taken on either side of it.
	pub fn update(&self, batch: &[Number]) -> WindowUpdate {
		let mut w = self.inner.lock();
		let previous = w.to_vec();
		let inserted = w.extend_unique(batch);
		let current = w.to_vec();
		debug!(batch = batch.len(), inserted, len = w.len(), "window updated");
		WindowUpdate { previous, current }
	}

	/// Copy of the current contents.
	pub fn snapshot(&self) -> Vec<Number> { self.inner.lock().to_vec() }

	/// Configured capacity.
	pub fn capacity(&self) -> usize { self.inner.lock().capacity() }

	/// Current length.
	pub fn len(&self) -> usize { self.inner.lock().len() }

	/// Whether the window is empty.
	pub fn is_empty(&self) -> bool { self.inner.lock().is_empty() }
}
