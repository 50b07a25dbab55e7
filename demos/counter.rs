//! Counter Example - fragment state across host re-renders
//!
//! This example demonstrates the core loop:
//! - Registering a fragment for a marker name
//! - Mounting a host whose view contains marker elements
//! - Invoking a bound handler as a bare callback
//! - Flushing the host and watching fragment content update in place
//!
//! Run with: cargo run --example counter

use fraglet::{
    instance_for, query_marker_elements, register_fragment, Element, FieldHandle, FieldSchema,
    Fragment, Handlers, Host, Markup, Result,
};

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

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== fraglet Counter Example ===\n");

    // Registration happens once, before any host exists.
    register_fragment::<Counter>("counter");

    // The host view: a heading plus two independent counter mount points.
    let root = Element::new("app");
    let host = Host::mount(root.clone(), || {
        Markup::sequence([
            Markup::element("h1").child(Markup::text("counters")).into(),
            Markup::element("section").marker("counter").into(),
            Markup::element("section").marker("counter").into(),
        ])
    })?;

    let markers = query_marker_elements(&root);
    println!("After mount:");
    println!("  left:  \"{}\"", markers[0].text_content());
    println!("  right: \"{}\"", markers[1].text_content());

    // Grab the left counter's bound handler. It is a plain callback - it can
    // be stored, cloned, or handed to event plumbing without its instance.
    let left = instance_for(&markers[0]).expect("left counter mounted");
    let increment = left.handler("increment").expect("handler declared");

    println!("\n--- Incrementing the left counter twice ---\n");
    increment();
    increment();

    // Writes coalesce: two requests, one commit cycle.
    println!("Pending re-render requests: {}", host.rerender_requests());
    host.flush()?;

    let markers = query_marker_elements(&root);
    println!("After flush:");
    println!("  left:  \"{}\"", markers[0].text_content());
    println!("  right: \"{}\"", markers[1].text_content());

    println!("\n=== Fragment state survives host re-renders! ===");
    Ok(())
}
