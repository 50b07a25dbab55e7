//! ReactiveSlot - the reactive property primitive.
//!
//! One mutable cell plus the re-render sink of the controller that owns it.
//! A write never mutates silently: it stores the value and requests a
//! re-render on the owner, unconditionally. There is no equality
//! short-circuit - writing the value a slot already holds still schedules a
//! re-render.
//!
//! The request is asynchronous in the host's sense: it sets pending state and
//! returns. Rendering happens at the host's next commit opportunity.

use std::cell::RefCell;

use crate::host::HostHandle;

/// A single reactive cell.
///
/// Created lazily by the fields layer on first access to a declared field,
/// not at controller construction time.
pub struct ReactiveSlot<T> {
    /// The owning controller's re-render sink - shared, not owned.
    owner: HostHandle,
    value: RefCell<T>,
}

impl<T: Clone> ReactiveSlot<T> {
    /// Create a slot seeded with `initial`, wired to `owner`.
    pub fn new(owner: HostHandle, initial: T) -> Self {
        Self {
            owner,
            value: RefCell::new(initial),
        }
    }

    /// The most recently written value. No side effects.
    pub fn read(&self) -> T {
        self.value.borrow().clone()
    }

    /// Store `v` and request exactly one re-render on the owner.
    pub fn write(&self, v: T) {
        *self.value.borrow_mut() = v;
        self.owner.request_rerender();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::host::RecordingHost;

    #[test]
    fn test_read_returns_seed_before_any_write() {
        let host = Rc::new(RecordingHost::default());
        let handle: HostHandle = host.clone();
        let slot = ReactiveSlot::new(handle, 7);
        assert_eq!(slot.read(), 7);
        assert_eq!(host.requests(), 0);
    }

    #[test]
    fn test_last_write_wins() {
        let host = Rc::new(RecordingHost::default());
        let handle: HostHandle = host.clone();
        let slot = ReactiveSlot::new(handle, 0);
        slot.write(1);
        slot.write(2);
        assert_eq!(slot.read(), 2);
    }

    #[test]
    fn test_every_write_requests_a_rerender() {
        let host = Rc::new(RecordingHost::default());
        let handle: HostHandle = host.clone();
        let slot = ReactiveSlot::new(handle, 5);

        // Same value both times - still two requests.
        slot.write(5);
        slot.write(5);
        assert_eq!(host.requests(), 2);
    }

    #[test]
    fn test_reads_do_not_request_rerenders() {
        let host = Rc::new(RecordingHost::default());
        let handle: HostHandle = host.clone();
        let slot = ReactiveSlot::new(handle, "x".to_string());
        let _ = slot.read();
        let _ = slot.read();
        assert_eq!(host.requests(), 0);
    }
}
