//! Tagged one-shot timers with wait-until scheduling.
//!
//! Components own a queue of tagged deadlines and expose `tick(now)` to the
//! host event loop; [`TimerQueue::next_deadline`] tells the host how long it
//! may sleep. Cancellation removes the pending deadline for a tag and is
//! safe to call when nothing is pending.

use std::cell::RefCell;

use smallvec::SmallVec;
use web_time::Instant;

/// Inline capacity; the selection controller runs two timers.
const PENDING_INLINE: usize = 2;

pub struct TimerQueue<T> {
    pending: RefCell<SmallVec<[(T, Instant); PENDING_INLINE]>>,
}

impl<T: Copy + Eq> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: RefCell::new(SmallVec::new()),
        }
    }

    /// Schedules `tag` to fire at `deadline`, replacing any deadline already
    /// pending for the same tag.
    pub fn schedule(&self, tag: T, deadline: Instant) {
        let mut pending = self.pending.borrow_mut();
        if let Some(entry) = pending.iter_mut().find(|(t, _)| *t == tag) {
            entry.1 = deadline;
        } else {
            pending.push((tag, deadline));
        }
    }

    /// Removes the pending deadline for `tag`. Idempotent.
    pub fn cancel(&self, tag: T) {
        self.pending.borrow_mut().retain(|(t, _)| *t != tag);
    }

    pub fn is_scheduled(&self, tag: T) -> bool {
        self.pending.borrow().iter().any(|(t, _)| *t == tag)
    }

    /// Earliest pending deadline, for host wait-until scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.borrow().iter().map(|(_, d)| *d).min()
    }

    /// Removes and returns every tag whose deadline has passed, ordered by
    /// deadline. Handlers may reschedule from inside the loop that consumes
    /// the result.
    pub fn fire_due(&self, now: Instant) -> SmallVec<[T; PENDING_INLINE]> {
        let mut due: SmallVec<[(T, Instant); PENDING_INLINE]> = SmallVec::new();
        {
            let mut pending = self.pending.borrow_mut();
            let mut i = 0;
            while i < pending.len() {
                if pending[i].1 <= now {
                    due.push(pending.remove(i));
                } else {
                    i += 1;
                }
            }
        }
        due.sort_by_key(|(_, deadline)| *deadline);
        due.into_iter().map(|(tag, _)| tag).collect()
    }
}

impl<T: Copy + Eq> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
