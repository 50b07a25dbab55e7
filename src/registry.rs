//! Fragment registry - marker constructors and per-element instances.
//!
//! Two thread-local tables drive the mount protocol:
//! - marker name -> controller constructor, written at host-definition time
//! - element node id -> live controller instance, written on first discovery
//!
//! [`discover_and_mount`] runs after every host commit: it walks the rendered
//! subtree for marker elements, constructs a controller for each unseen one,
//! and commits every controller's output into its element. An element seen
//! before gets its existing instance back, which is how fragment state
//! survives host re-renders.
//!
//! Instance entries for elements that have left the tree are never looked up
//! again; they are inert garbage until [`sweep`] or [`reset_registry`] drops
//! them.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::dom::{self, Element, NodeId};
use crate::error::Result;
use crate::fragment::{Fragment, FragmentController};
use crate::host::HostHandle;

/// Constructor invoked on first discovery of a marker element.
pub type FragmentCtor = Rc<dyn Fn(HostHandle, Rc<Element>) -> Rc<FragmentController>>;

// =============================================================================
// Registry state
// =============================================================================

thread_local! {
    /// Marker name -> controller constructor.
    static CONSTRUCTORS: RefCell<HashMap<String, FragmentCtor>> = RefCell::new(HashMap::new());

    /// Element node id -> live controller instance.
    static INSTANCES: RefCell<HashMap<NodeId, Rc<FragmentController>>> = RefCell::new(HashMap::new());
}

// =============================================================================
// Registration
// =============================================================================

/// Map a marker name to a controller constructor.
///
/// Last writer wins: re-registering a name silently replaces the earlier
/// constructor. Must complete before the first `discover_and_mount` that
/// depends on it - in practice, registration happens at host-definition time,
/// before any host instance exists.
pub fn register_marker(
    name: &str,
    ctor: impl Fn(HostHandle, Rc<Element>) -> Rc<FragmentController> + 'static,
) {
    let replaced = CONSTRUCTORS.with(|map| {
        map.borrow_mut()
            .insert(name.to_string(), Rc::new(ctor))
            .is_some()
    });
    if replaced {
        tracing::debug!(marker = name, "marker registration overwritten");
    } else {
        tracing::debug!(marker = name, "marker registered");
    }
}

/// Register a fragment type whose controller is built from its `Default`.
pub fn register_fragment<F: Fragment + Default>(name: &str) {
    register_marker(name, |host, element| {
        FragmentController::new(F::default(), host, element)
    });
}

/// Whether a constructor is registered for `name`.
pub fn is_registered(name: &str) -> bool {
    CONSTRUCTORS.with(|map| map.borrow().contains_key(name))
}

// =============================================================================
// Discovery protocol
// =============================================================================

/// Walk `root`'s rendered subtree and mount or update every marker element.
///
/// For each discovered element, in document order:
/// - unregistered marker name: skipped silently (typos fail open)
/// - unseen element: construct the controller, record the association, run
///   its attach hook (install fields + initial commit)
/// - known element: run its update hook (re-commit with current state)
///
/// Running this twice with no state change in between creates nothing new and
/// re-renders existing controllers unchanged.
pub fn discover_and_mount(host: &HostHandle, root: &Rc<Element>) -> Result<()> {
    let markers = dom::query_marker_elements(root);
    tracing::trace!(markers = markers.len(), "discovery pass");

    for element in markers {
        let Some(name) = element.marker_name() else {
            continue;
        };
        let Some(ctor) = CONSTRUCTORS.with(|map| map.borrow().get(&name).cloned()) else {
            tracing::trace!(marker = %name, "skipping unregistered marker");
            continue;
        };

        let existing = INSTANCES.with(|map| map.borrow().get(&element.id()).cloned());
        match existing {
            Some(instance) => instance.on_host_updated()?,
            None => {
                let instance = ctor(host.clone(), element.clone());
                INSTANCES.with(|map| {
                    map.borrow_mut().insert(element.id(), instance.clone());
                });
                tracing::debug!(marker = %name, node = element.id(), "fragment mounted");
                instance.on_attached()?;
            }
        }
    }

    Ok(())
}

// =============================================================================
// Introspection
// =============================================================================

/// The controller associated with `element`, if any.
pub fn instance_for(element: &Rc<Element>) -> Option<Rc<FragmentController>> {
    INSTANCES.with(|map| map.borrow().get(&element.id()).cloned())
}

/// Number of live controller associations.
pub fn mounted_count() -> usize {
    INSTANCES.with(|map| map.borrow().len())
}

// =============================================================================
// Cleanup
// =============================================================================

/// Drop associations whose element is no longer in `root`'s subtree.
///
/// Returns the number of entries dropped. Purely a memory facility - stale
/// entries are never consulted by discovery, so calling this is optional.
pub fn sweep(root: &Rc<Element>) -> usize {
    let mut live = HashSet::new();
    collect_ids(root, &mut live);
    let dropped = INSTANCES.with(|map| {
        let mut map = map.borrow_mut();
        let before = map.len();
        map.retain(|id, _| live.contains(id));
        before - map.len()
    });
    if dropped > 0 {
        tracing::trace!(dropped, "swept stale fragment associations");
    }
    dropped
}

fn collect_ids(element: &Rc<Element>, out: &mut HashSet<NodeId>) {
    out.insert(element.id());
    for child in element.children() {
        if let crate::dom::Node::Element(el) = child {
            collect_ids(&el, out);
        }
    }
}

/// Clear all registry state (for testing).
pub fn reset_registry() {
    CONSTRUCTORS.with(|map| map.borrow_mut().clear());
    INSTANCES.with(|map| map.borrow_mut().clear());
}
