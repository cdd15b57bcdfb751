//! Insertion-ordered listener collections with snapshot dispatch.
//!
//! A dispatch iterates over a snapshot taken when it begins, so listeners
//! may add or remove listeners (including themselves) from inside a
//! callback without invalidating the iteration. Removal is by `Rc`
//! identity, matching how hosts hold on to the listener they registered.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

/// Stack capacity for listener snapshots; most components carry one or two
/// listeners.
const SNAPSHOT_INLINE: usize = 4;

pub struct ListenerList<T: ?Sized> {
    entries: RefCell<Vec<Rc<T>>>,
}

impl<T: ?Sized> ListenerList<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Appends a listener. A listener registered twice is called twice.
    pub fn add(&self, listener: Rc<T>) {
        self.entries.borrow_mut().push(listener);
    }

    /// Removes the first entry pointing at the same allocation as
    /// `listener`. No-op when it was never registered.
    pub fn remove(&self, listener: &Rc<T>) {
        let mut entries = self.entries.borrow_mut();
        if let Some(index) = entries.iter().position(|e| Rc::ptr_eq(e, listener)) {
            entries.remove(index);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Stable snapshot of the current listeners, in registration order.
    pub fn snapshot(&self) -> SmallVec<[Rc<T>; SNAPSHOT_INLINE]> {
        self.entries.borrow().iter().cloned().collect()
    }

    /// Invokes `f` for each listener registered at the moment of the call.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        for listener in self.snapshot() {
            f(&listener);
        }
    }
}

impl<T: ?Sized> Default for ListenerList<T> {
    fn default() -> Self {
        Self::new()
    }
}
