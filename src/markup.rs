//! Declarative render results and the commit step.
//!
//! A render produces [`Markup`] - a description of the desired content, not
//! the content itself. [`commit`] materializes that description into an
//! element, replacing whatever was there.
//!
//! Commit reuses an existing child element when its tag matches the desired
//! one at the same position. That positional reuse is what keeps marker
//! elements reference-identical across repeated host commits of a same-shaped
//! view, which in turn is what lets the registry hand re-discovered markers
//! back to their existing controllers.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::{Element, Node, MARKER_ATTR};

// =============================================================================
// Markup
// =============================================================================

/// A declarative description of subtree content.
#[derive(Debug, Clone)]
pub enum Markup {
    /// Nothing. Committing this clears the target.
    Empty,
    /// A run of text.
    Text(String),
    /// An element with attributes and children.
    Element(MarkupElement),
    /// Several siblings in order.
    Sequence(Vec<Markup>),
}

impl Markup {
    /// Text content.
    pub fn text(content: impl Into<String>) -> Markup {
        Markup::Text(content.into())
    }

    /// Start building an element.
    pub fn element(tag: &str) -> MarkupElement {
        MarkupElement {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// A sequence of siblings.
    pub fn sequence(items: impl IntoIterator<Item = Markup>) -> Markup {
        Markup::Sequence(items.into_iter().collect())
    }
}

/// Builder for element markup.
#[derive(Debug, Clone)]
pub struct MarkupElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Markup>,
}

impl MarkupElement {
    /// Set an attribute.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Mark this element as a fragment mount point for `name`.
    pub fn marker(self, name: &str) -> Self {
        self.attr(MARKER_ATTR, name)
    }

    /// Append a child.
    pub fn child(mut self, child: Markup) -> Self {
        self.children.push(child);
        self
    }

    /// The element's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl From<MarkupElement> for Markup {
    fn from(element: MarkupElement) -> Self {
        Markup::Element(element)
    }
}

// =============================================================================
// Commit
// =============================================================================

/// Flattened view of markup: the actual sibling positions, with sequences
/// spliced inline.
enum FlatNode<'a> {
    Text(&'a str),
    Element(&'a MarkupElement),
}

fn flatten<'a>(markup: &'a Markup, out: &mut Vec<FlatNode<'a>>) {
    match markup {
        Markup::Empty => {}
        Markup::Text(text) => out.push(FlatNode::Text(text)),
        Markup::Element(element) => out.push(FlatNode::Element(element)),
        Markup::Sequence(items) => {
            for item in items {
                flatten(item, out);
            }
        }
    }
}

/// Materialize `markup` into `target`, replacing prior content.
///
/// Child elements are reused when tag and position match; everything else is
/// rebuilt. Attributes are always rewritten from the markup, so a reused
/// element ends up exactly as described.
pub fn commit(markup: &Markup, target: &Rc<Element>) {
    let mut desired = Vec::new();
    flatten(markup, &mut desired);
    reconcile(target, &desired);
}

fn reconcile(target: &Rc<Element>, desired: &[FlatNode<'_>]) {
    let existing = target.children();
    let mut next = Vec::with_capacity(desired.len());

    for (position, want) in desired.iter().enumerate() {
        match want {
            FlatNode::Text(text) => next.push(Node::Text((*text).to_string())),
            FlatNode::Element(want_el) => {
                let reused = match existing.get(position) {
                    Some(Node::Element(have)) if have.tag() == want_el.tag => Some(have.clone()),
                    _ => None,
                };
                let element = reused.unwrap_or_else(|| Element::new(&want_el.tag));
                element.set_attributes(want_el.attributes.clone());

                let mut child_desired = Vec::new();
                for child in &want_el.children {
                    flatten(child, &mut child_desired);
                }
                reconcile(&element, &child_desired);

                next.push(Node::Element(element));
            }
        }
    }

    target.replace_children(next);
}
