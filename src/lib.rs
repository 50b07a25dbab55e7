//! # fraglet
//!
//! Marker-addressed fragment controllers with reactive state.
//!
//! A host component renders whatever view it likes; any element in that view
//! carrying the `data-fragment` attribute becomes a mount point. Each mount
//! point is claimed by a fragment controller - a small stateful object that
//! owns the markup inside that element, keeps its state across host
//! re-renders, and schedules a host re-render whenever one of its reactive
//! fields is written.
//!
//! ## Architecture
//!
//! The whole system is one loop, driven by the host's commit cycle:
//!
//! ```text
//! field write → re-render request → host commit → discovery → fragment commits
//! ```
//!
//! Discovery walks the freshly committed subtree for marker elements. A
//! marker seen for the first time gets a controller constructed and attached;
//! a marker seen before gets its existing controller back, state intact.
//! Element identity (not marker name, not position) is the association key.
//!
//! ## Modules
//!
//! - [`types`] - the dynamic [`Value`] reactive fields hold
//! - [`dom`] - in-memory element tree, node identity, marker query
//! - [`markup`] - declarative render results and the commit step
//! - [`slot`] - [`ReactiveSlot`], the reactive property primitive
//! - [`fields`] - field schema, per-instance slot storage, field handles
//! - [`fragment`] - the [`Fragment`] trait and [`FragmentController`]
//! - [`registry`] - marker registration and the discovery protocol
//! - [`host`] - a concrete host with coalescing re-render scheduling
//!
//! ## Example
//!
//! ```ignore
//! use fraglet::{register_fragment, Element, Host, Markup};
//!
//! register_fragment::<Counter>("counter");
//!
//! let root = Element::new("div");
//! let host = Host::mount(root.clone(), || {
//!     Markup::element("section").marker("counter").into()
//! })?;
//!
//! // Invoke a bound handler from anywhere, then let the host catch up.
//! let marker = fraglet::query_marker_elements(&root).remove(0);
//! let counter = fraglet::instance_for(&marker).unwrap();
//! counter.handler("increment").unwrap()();
//! host.flush()?;
//! ```

pub mod dom;
pub mod error;
pub mod fields;
pub mod fragment;
pub mod host;
pub mod markup;
pub mod registry;
pub mod slot;
pub mod types;

// Re-export commonly used items
pub use types::Value;

pub use error::{FragmentError, Result};

pub use dom::{query_marker_elements, Element, Node, NodeId, MARKER_ATTR};

pub use markup::{commit, Markup, MarkupElement};

pub use slot::ReactiveSlot;

pub use fields::{FieldHandle, FieldSchema};

pub use fragment::{Fragment, FragmentController, Handler, Handlers};

pub use registry::{
    discover_and_mount, instance_for, is_registered, mounted_count, register_fragment,
    register_marker, reset_registry, sweep, FragmentCtor,
};

pub use host::{Host, HostHandle, RenderHost, ViewFn};
