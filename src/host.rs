//! Host component - commit scheduling and discovery composition.
//!
//! The host owns the root element and the view that fills it. Its commit
//! cycle is composed with registry discovery: every commit ends by walking
//! the fresh subtree and mounting or updating fragments. Controllers never
//! call discovery themselves; they only request re-renders.
//!
//! Scheduling is cooperative and coalescing. `request_rerender` sets a
//! pending flag and returns - any number of requests between commits collapse
//! into one cycle, run by the next [`Host::flush`].
//!
//! # Example
//!
//! ```ignore
//! use fraglet::{Element, Host, Markup};
//!
//! let root = Element::new("div");
//! let host = Host::mount(root, || {
//!     Markup::element("section").marker("counter").into()
//! })?;
//!
//! // ... a handler writes a reactive field ...
//! host.flush()?; // one commit + discovery pass
//! ```

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::dom::Element;
use crate::error::Result;
use crate::markup::{self, Markup};
use crate::registry;

/// Re-render cycles `settle` will run before giving up on a view that keeps
/// scheduling more work.
const MAX_SETTLE_CYCLES: usize = 64;

// =============================================================================
// Host contract
// =============================================================================

/// The scheduling surface controllers see.
///
/// `request_rerender` must not render synchronously and may coalesce; it only
/// guarantees a commit at the host's next opportunity.
pub trait RenderHost {
    fn request_rerender(&self);
}

/// Shared handle to a host - what slots hold and constructors receive.
pub type HostHandle = Rc<dyn RenderHost>;

// =============================================================================
// Host
// =============================================================================

/// The host's view function.
pub type ViewFn = Box<dyn Fn() -> Markup>;

/// A concrete host component.
///
/// Owns the root element and the view, counts incoming re-render requests
/// (observable for tests), and coalesces them into single commit cycles.
pub struct Host {
    me: Weak<Host>,
    root: Rc<Element>,
    view: ViewFn,
    pending: Cell<bool>,
    requests: Cell<usize>,
}

impl Host {
    /// Mount a host: commit the view into `root` and run the first discovery
    /// pass. Marker registration must already have happened.
    pub fn mount(root: Rc<Element>, view: impl Fn() -> Markup + 'static) -> Result<Rc<Host>> {
        let host = Rc::new_cyclic(|me| Host {
            me: me.clone(),
            root,
            view: Box::new(view),
            pending: Cell::new(false),
            requests: Cell::new(0),
        });
        host.render_cycle()?;
        Ok(host)
    }

    /// The element this host renders into.
    pub fn root(&self) -> &Rc<Element> {
        &self.root
    }

    /// Total re-render requests received so far.
    pub fn rerender_requests(&self) -> usize {
        self.requests.get()
    }

    /// Whether a re-render is scheduled but not yet committed.
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Run one commit cycle if a re-render is pending.
    ///
    /// Returns whether a cycle ran.
    pub fn flush(&self) -> Result<bool> {
        if !self.pending.get() {
            return Ok(false);
        }
        self.pending.set(false);
        self.render_cycle()?;
        Ok(true)
    }

    /// Flush until no re-render is pending, up to a cycle budget.
    ///
    /// Returns the number of cycles run. A view that schedules new work on
    /// every commit exhausts the budget and stops.
    pub fn settle(&self) -> Result<usize> {
        let mut cycles = 0;
        while self.flush()? {
            cycles += 1;
            if cycles >= MAX_SETTLE_CYCLES {
                tracing::warn!(cycles, "settle budget exhausted; view keeps scheduling re-renders");
                break;
            }
        }
        Ok(cycles)
    }

    /// One full commit: paint the view, then discover and mount fragments.
    fn render_cycle(&self) -> Result<()> {
        tracing::trace!("host commit");
        let output = (self.view)();
        markup::commit(&output, &self.root);

        // The upgrade only fails while the host is mid-drop, when no cycle
        // can be running.
        let Some(strong) = self.me.upgrade() else {
            return Ok(());
        };
        let handle: HostHandle = strong;
        registry::discover_and_mount(&handle, &self.root)
    }
}

impl RenderHost for Host {
    fn request_rerender(&self) {
        self.requests.set(self.requests.get() + 1);
        self.pending.set(true);
    }
}

// =============================================================================
// Test support
// =============================================================================

/// Host stub that records requests and never commits.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingHost {
    requests: Cell<usize>,
}

#[cfg(test)]
impl RecordingHost {
    pub(crate) fn requests(&self) -> usize {
        self.requests.get()
    }
}

#[cfg(test)]
impl RenderHost for RecordingHost {
    fn request_rerender(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldHandle, FieldSchema};
    use crate::fragment::{Fragment, Handlers};
    use crate::registry::{register_fragment, reset_registry};

    #[derive(Default)]
    struct Counter;

    impl Fragment for Counter {
        fn fields(&self) -> FieldSchema {
            FieldSchema::new().field("count", 0)
        }

        fn handlers(&self, fields: &FieldHandle) -> Handlers {
            let fields = fields.clone();
            Handlers::new().on("increment", move || {
                let next = fields.get("count").as_int() + 1;
                fields.set("count", next);
            })
        }

        fn render(&self, fields: &FieldHandle) -> Result<Markup> {
            Ok(Markup::text(format!("count={}", fields.get("count"))))
        }
    }

    fn counter_view() -> Markup {
        Markup::element("section").marker("counter").into()
    }

    fn marker_of(host: &Rc<Host>) -> Rc<Element> {
        crate::dom::query_marker_elements(host.root())
            .into_iter()
            .next()
            .expect("view renders one marker")
    }

    #[test]
    fn test_mount_commits_and_discovers() {
        reset_registry();
        register_fragment::<Counter>("counter");

        let host = Host::mount(Element::new("div"), counter_view).unwrap();
        let marker = marker_of(&host);
        assert_eq!(marker.marker_name(), Some("counter".to_string()));
        assert_eq!(marker.text_content(), "count=0");
        assert!(!host.is_pending());
    }

    #[test]
    fn test_requests_coalesce_into_one_flush() {
        reset_registry();
        register_fragment::<Counter>("counter");
        let host = Host::mount(Element::new("div"), counter_view).unwrap();

        let instance = registry::instance_for(&marker_of(&host)).unwrap();
        let increment = instance.handler("increment").unwrap();
        increment();
        increment();
        increment();

        assert_eq!(host.rerender_requests(), 3);
        assert!(host.is_pending());

        // Three requests, one cycle.
        assert!(host.flush().unwrap());
        assert!(!host.flush().unwrap());
        assert_eq!(marker_of(&host).text_content(), "count=3");
    }

    #[test]
    fn test_flush_without_pending_is_a_no_op() {
        reset_registry();
        let host = Host::mount(Element::new("div"), || Markup::text("static")).unwrap();
        assert!(!host.flush().unwrap());
        assert_eq!(host.root().text_content(), "static");
    }

    #[test]
    fn test_marker_identity_is_stable_across_commits() {
        reset_registry();
        register_fragment::<Counter>("counter");
        let host = Host::mount(Element::new("div"), counter_view).unwrap();
        let before = marker_of(&host).id();

        let instance = registry::instance_for(&marker_of(&host)).unwrap();
        instance.handler("increment").unwrap()();
        host.flush().unwrap();

        assert_eq!(marker_of(&host).id(), before);
    }

    #[test]
    fn test_settle_drains_pending_work() {
        reset_registry();
        register_fragment::<Counter>("counter");
        let host = Host::mount(Element::new("div"), counter_view).unwrap();

        let instance = registry::instance_for(&marker_of(&host)).unwrap();
        instance.handler("increment").unwrap()();
        let cycles = host.settle().unwrap();
        assert_eq!(cycles, 1);
        assert_eq!(marker_of(&host).text_content(), "count=1");
    }

    #[test]
    fn test_host_view_with_unmarked_content_only() {
        reset_registry();
        let host = Host::mount(Element::new("div"), || {
            Markup::element("p")
                .attr("class", "plain")
                .child(Markup::text("no fragments here"))
                .into()
        })
        .unwrap();
        assert_eq!(host.root().text_content(), "no fragments here");
        assert_eq!(registry::mounted_count(), 0);
    }
}
