//! Single-slot compute-once cell.
//!
//! State machine: `Empty -> Computing -> Ready`. The first caller to find the
//! slot empty becomes the producer; every other caller, concurrent or later,
//! blocks until the slot is ready and then shares the same `Arc`. Only one
//! producer runs per fill, so exactly one result is ever retained. If the
//! producer panics the slot returns to `Empty` and one waiter takes over.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Observable state of a [`MemoCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
	Empty,
	Computing,
	Ready,
}

enum Slot<T> {
	Empty,
	Computing,
	Ready(Arc<T>),
}

/// Blocking get-or-compute cell holding at most one value.
pub struct MemoCell<T> {
	slot: Mutex<Slot<T>>,
	ready: Condvar,
}

impl<T> Default for MemoCell<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> std::fmt::Debug for MemoCell<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoCell").field("state", &self.state()).finish()
	}
}

impl<T> MemoCell<T> {
	/// Creates an empty cell.
	pub const fn new() -> Self {
		Self {
			slot: Mutex::new(Slot::Empty),
			ready: Condvar::new(),
		}
	}

	/// Returns the current state without blocking on a running producer.
	pub fn state(&self) -> MemoState {
		match &*self.slot.lock() {
			Slot::Empty => MemoState::Empty,
			Slot::Computing => MemoState::Computing,
			Slot::Ready(_) => MemoState::Ready,
		}
	}

	/// Returns the value if it has been computed.
	pub fn get(&self) -> Option<Arc<T>> {
		match &*self.slot.lock() {
			Slot::Ready(value) => Some(Arc::clone(value)),
			_ => None,
		}
	}

	/// Returns the cached value, computing it with `producer` if the cell is empty.
	///
	/// Calling this re-entrantly from inside `producer` on the same cell deadlocks.
	pub fn get_or_compute(&self, producer: impl FnOnce() -> T) -> Arc<T> {
		let mut slot = self.slot.lock();
		loop {
			if let Slot::Ready(value) = &*slot {
				return Arc::clone(value);
			}
			if matches!(*slot, Slot::Empty) {
				break;
			}
			self.ready.wait(&mut slot);
		}
		*slot = Slot::Computing;
		drop(slot);

		let guard = ResetOnUnwind { cell: self, armed: true };
		let value = Arc::new(producer());
		guard.disarm();

		*self.slot.lock() = Slot::Ready(Arc::clone(&value));
		self.ready.notify_all();
		value
	}
}

struct ResetOnUnwind<'a, T> {
	cell: &'a MemoCell<T>,
	armed: bool,
}

impl<T> ResetOnUnwind<'_, T> {
	fn disarm(mut self) {
		self.armed = false;
	}
}

impl<T> Drop for ResetOnUnwind<'_, T> {
	fn drop(&mut self) {
		if self.armed {
			*self.cell.slot.lock() = Slot::Empty;
			self.cell.ready.notify_all();
		}
	}
}
