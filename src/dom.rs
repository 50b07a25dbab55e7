//! In-memory element tree.
//!
//! Models the tree the host renders into:
//! - `Element` nodes with a tag, an attribute map, and children
//! - Node identity via a thread-local `NodeId` counter
//! - Attribute-based subtree query for marker discovery
//!
//! `Rc<Element>` is the identity unit: two handles point at "the same node"
//! exactly when they share the allocation, and the registry keys its
//! per-element state on [`Element::id`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// The attribute that turns an element into a fragment mount point.
///
/// Its value is the marker name handed to `registry::register_marker`.
pub const MARKER_ATTR: &str = "data-fragment";

/// Unique identity of one element node for the lifetime of the thread.
pub type NodeId = u64;

thread_local! {
    /// Counter for generating node identities.
    static NODE_COUNTER: Cell<NodeId> = const { Cell::new(0) };
}

fn next_node_id() -> NodeId {
    NODE_COUNTER.with(|counter| {
        let id = counter.get();
        counter.set(id + 1);
        id
    })
}

// =============================================================================
// Nodes
// =============================================================================

/// One child position in an element: a nested element or a run of text.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Rc<Element>),
    Text(String),
}

/// An element node.
///
/// Interior mutability keeps the tree shared-and-mutable the way a document
/// tree is: commits rewrite attributes and children through `&Element` while
/// any number of handles stay live.
#[derive(Debug)]
pub struct Element {
    id: NodeId,
    tag: String,
    attributes: RefCell<BTreeMap<String, String>>,
    children: RefCell<Vec<Node>>,
}

impl Element {
    /// Create a detached element with the given tag.
    pub fn new(tag: &str) -> Rc<Element> {
        Rc::new(Element {
            id: next_node_id(),
            tag: tag.to_string(),
            attributes: RefCell::new(BTreeMap::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    /// This node's identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The element's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Read one attribute.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    /// Set one attribute, inserting or overwriting.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Replace the whole attribute map.
    pub fn set_attributes(&self, attributes: BTreeMap<String, String>) {
        *self.attributes.borrow_mut() = attributes;
    }

    /// The marker name, if this element is a mount point.
    pub fn marker_name(&self) -> Option<String> {
        self.attribute(MARKER_ATTR)
    }

    /// Snapshot of the current children.
    pub fn children(&self) -> Vec<Node> {
        self.children.borrow().clone()
    }

    /// Replace the children wholesale.
    pub fn replace_children(&self, children: Vec<Node>) {
        *self.children.borrow_mut() = children;
    }

    /// Append one child.
    pub fn append_child(&self, child: Node) {
        self.children.borrow_mut().push(child);
    }

    /// Concatenated text of this subtree, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in element.children.borrow().iter() {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(el, out),
        }
    }
}

// =============================================================================
// Marker query
// =============================================================================

/// Collect every descendant of `root` carrying the marker attribute.
///
/// Depth-first preorder, so results come back in document order. The root
/// itself is not a candidate - a host does not mount a fragment into its own
/// root.
pub fn query_marker_elements(root: &Rc<Element>) -> Vec<Rc<Element>> {
    let mut found = Vec::new();
    collect_markers(root, &mut found);
    found
}

fn collect_markers(element: &Rc<Element>, found: &mut Vec<Rc<Element>>) {
    for child in element.children() {
        if let Node::Element(el) = child {
            if el.marker_name().is_some() {
                found.push(el.clone());
            }
            collect_markers(&el, found);
        }
    }
}
