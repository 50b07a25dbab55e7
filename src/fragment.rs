//! Fragment controllers and the author-facing [`Fragment`] trait.
//!
//! A fragment author supplies three things:
//! - a [`FieldSchema`] declaring the reactive fields (class-level, static per type)
//! - named handlers, built once at construction as closures over the field
//!   handle, so they stay bound to their instance no matter how they travel
//! - a `render` producing the desired markup for the bound element
//!
//! The [`FragmentController`] wraps that behavior with the state the host
//! tracks per marker element: the host handle re-render requests forward to,
//! the bound element, the reactive field store, and the bound handlers.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Default)]
//! struct Counter;
//!
//! impl Fragment for Counter {
//!     fn fields(&self) -> FieldSchema {
//!         FieldSchema::new().field("count", 0)
//!     }
//!
//!     fn handlers(&self, fields: &FieldHandle) -> Handlers {
//!         let fields = fields.clone();
//!         Handlers::new().on("increment", move || {
//!             let next = fields.get("count").as_int() + 1;
//!             fields.set("count", next);
//!         })
//!     }
//!
//!     fn render(&self, fields: &FieldHandle) -> Result<Markup> {
//!         Ok(Markup::text(format!("count={}", fields.get("count"))))
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::Element;
use crate::error::Result;
use crate::fields::{FieldHandle, FieldSchema, ReactiveFields};
use crate::host::HostHandle;
use crate::markup::{self, Markup};

// =============================================================================
// Handlers
// =============================================================================

/// A bound callback. Invoking it anywhere keeps the instance context it
/// captured at construction.
pub type Handler = Rc<dyn Fn()>;

/// Named bound callbacks for one controller instance.
#[derive(Clone, Default)]
pub struct Handlers {
    map: HashMap<String, Handler>,
}

impl Handlers {
    /// No handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named handler.
    pub fn on(mut self, name: &str, action: impl Fn() + 'static) -> Self {
        self.map.insert(name.to_string(), Rc::new(action));
        self
    }

    /// Look up a handler by name.
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.map.get(name).cloned()
    }
}

// =============================================================================
// Fragment trait
// =============================================================================

/// Behavior supplied by fragment authors.
pub trait Fragment: 'static {
    /// Reactive field declaration, evaluated once per instance at install
    /// time. Defaults to no fields.
    fn fields(&self) -> FieldSchema {
        FieldSchema::new()
    }

    /// Named handlers, built once at controller construction. Each handler
    /// should clone the field handle (and anything else it needs) into its
    /// closure. Defaults to none.
    fn handlers(&self, fields: &FieldHandle) -> Handlers {
        let _ = fields;
        Handlers::new()
    }

    /// Produce the desired content for the bound element's subtree.
    ///
    /// Must be pure with respect to controller state: read fields, build
    /// markup, no writes. A failure propagates out of the host commit cycle
    /// unrecovered.
    fn render(&self, fields: &FieldHandle) -> Result<Markup>;
}

// =============================================================================
// Controller
// =============================================================================

/// One mounted fragment: author behavior plus per-marker-element state.
///
/// Constructed by the registry on first discovery of its marker element and
/// reused for every later sighting of that same element node. Never
/// explicitly destroyed by this crate - stale instances are garbage once
/// their element leaves the tree.
pub struct FragmentController {
    behavior: Box<dyn Fragment>,
    host: HostHandle,
    element: Rc<Element>,
    fields: Rc<ReactiveFields>,
    handlers: Handlers,
}

impl FragmentController {
    /// Wrap `behavior` for the given host and bound element.
    ///
    /// Handlers are bound here, eagerly; reactive fields are not installed
    /// until a lifecycle hook runs.
    pub fn new(
        behavior: impl Fragment,
        host: HostHandle,
        element: Rc<Element>,
    ) -> Rc<FragmentController> {
        let behavior: Box<dyn Fragment> = Box::new(behavior);
        let fields = Rc::new(ReactiveFields::new(host.clone()));
        let handlers = behavior.handlers(&FieldHandle::new(fields.clone()));
        Rc::new(FragmentController {
            behavior,
            host,
            element,
            fields,
            handlers,
        })
    }

    /// The element this controller renders into.
    pub fn element(&self) -> &Rc<Element> {
        &self.element
    }

    /// The host re-render requests forward to.
    pub fn host(&self) -> &HostHandle {
        &self.host
    }

    /// Handle to this controller's reactive fields.
    pub fn fields(&self) -> FieldHandle {
        FieldHandle::new(self.fields.clone())
    }

    /// A bound handler by name, usable as a bare callback.
    pub fn handler(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name)
    }

    /// Install the declared reactive fields. Safe to call any number of
    /// times; only the first call evaluates the schema.
    pub fn install_reactive_fields(&self) {
        self.fields.install(self.behavior.fields());
    }

    /// The author's render, against the current field state.
    pub fn render(&self) -> Result<Markup> {
        self.behavior.render(&FieldHandle::new(self.fields.clone()))
    }

    /// Connection hook: the controller has joined the host's controller set.
    ///
    /// Installs reactive fields, then performs the initial commit into the
    /// bound element. May recur if the host signals connection again; the
    /// install guard keeps that harmless.
    pub fn on_attached(&self) -> Result<()> {
        self.install_reactive_fields();
        self.commit_into_element()
    }

    /// Per-commit hook: the host just committed.
    ///
    /// Installs reactive fields if connection hooks fired in an unexpected
    /// order, then re-commits the current render output.
    pub fn on_host_updated(&self) -> Result<()> {
        self.install_reactive_fields();
        self.commit_into_element()
    }

    fn commit_into_element(&self) -> Result<()> {
        let output = self.render()?;
        markup::commit(&output, &self.element);
        Ok(())
    }
}
