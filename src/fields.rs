//! Reactive field schema and per-instance slot storage.
//!
//! A fragment type declares its reactive fields once, as a [`FieldSchema`] of
//! names and defaults. Each controller instance evaluates that schema exactly
//! once, at installation time, into a [`ReactiveFields`] store. Slots are not
//! created at installation: a field's [`ReactiveSlot`] comes into being on the
//! first read or write of that field, seeded with the declared default.
//!
//! Undeclared names fail open - reads return [`Value::Null`], writes are
//! ignored. A typo in a render never takes the host down.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::host::HostHandle;
use crate::slot::ReactiveSlot;
use crate::types::Value;

// =============================================================================
// Schema
// =============================================================================

/// Declared reactive field names with their defaults.
///
/// Built fluently; static per fragment type.
///
/// # Example
///
/// ```ignore
/// FieldSchema::new()
///     .field("count", 0)
///     .field("label", "items")
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    fields: Vec<(String, Value)>,
}

impl FieldSchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare one reactive field with its default value.
    ///
    /// Re-declaring a name overwrites the earlier default.
    pub fn field(mut self, name: &str, default: impl Into<Value>) -> Self {
        let default = default.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = default;
        } else {
            self.fields.push((name.to_string(), default));
        }
        self
    }

    /// The declared default for `name`, if declared.
    pub fn default_of(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// Per-instance store
// =============================================================================

/// The reactive field state of one controller instance.
///
/// Holds the installed schema, the lazily-populated name-to-slot map, and the
/// installation guard. Every slot it creates is wired to `owner`, so field
/// writes request re-renders on the controller's host.
pub struct ReactiveFields {
    owner: HostHandle,
    schema: RefCell<FieldSchema>,
    slots: RefCell<HashMap<String, Rc<ReactiveSlot<Value>>>>,
    installed: Cell<bool>,
}

impl ReactiveFields {
    /// Create an empty, not-yet-installed store.
    pub fn new(owner: HostHandle) -> Self {
        Self {
            owner,
            schema: RefCell::new(FieldSchema::new()),
            slots: RefCell::new(HashMap::new()),
            installed: Cell::new(false),
        }
    }

    /// Install the schema. Idempotent: the second and later calls are no-ops,
    /// so live slots are never re-wrapped and values never reset.
    pub fn install(&self, schema: FieldSchema) {
        if self.installed.get() {
            return;
        }
        self.installed.set(true);
        tracing::trace!(fields = schema.len(), "reactive fields installed");
        *self.schema.borrow_mut() = schema;
    }

    /// Whether installation has happened.
    pub fn installed(&self) -> bool {
        self.installed.get()
    }

    /// The slot backing `name`, creating it on first access.
    ///
    /// Returns None for names the schema never declared.
    fn slot(&self, name: &str) -> Option<Rc<ReactiveSlot<Value>>> {
        if let Some(slot) = self.slots.borrow().get(name) {
            return Some(slot.clone());
        }
        let default = self.schema.borrow().default_of(name)?.clone();
        let slot = Rc::new(ReactiveSlot::new(self.owner.clone(), default));
        self.slots.borrow_mut().insert(name.to_string(), slot.clone());
        Some(slot)
    }

    /// Read a field. Undeclared names read as [`Value::Null`].
    pub fn get(&self, name: &str) -> Value {
        match self.slot(name) {
            Some(slot) => slot.read(),
            None => Value::Null,
        }
    }

    /// Write a field, scheduling a re-render on the owner.
    ///
    /// Undeclared names are ignored.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        match self.slot(name) {
            Some(slot) => slot.write(value.into()),
            None => tracing::trace!(field = name, "write to undeclared field ignored"),
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Cheap cloneable view of one controller's [`ReactiveFields`].
///
/// This is what renders receive and what handlers capture at construction
/// time: cloning the handle fixes the instance context into the closure, so
/// the closure can travel anywhere as a bare callback.
#[derive(Clone)]
pub struct FieldHandle {
    fields: Rc<ReactiveFields>,
}

impl FieldHandle {
    pub(crate) fn new(fields: Rc<ReactiveFields>) -> Self {
        Self { fields }
    }

    /// Read a field.
    pub fn get(&self, name: &str) -> Value {
        self.fields.get(name)
    }

    /// Write a field, scheduling a re-render on the owning host.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.fields.set(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    fn store(host: &Rc<RecordingHost>) -> ReactiveFields {
        let handle: HostHandle = host.clone();
        ReactiveFields::new(handle)
    }

    #[test]
    fn test_read_before_write_returns_default() {
        let host = Rc::new(RecordingHost::default());
        let fields = store(&host);
        fields.install(FieldSchema::new().field("count", 0).field("label", "items"));

        assert_eq!(fields.get("count"), Value::Int(0));
        assert_eq!(fields.get("label"), Value::Text("items".to_string()));
        assert_eq!(host.requests(), 0);
    }

    #[test]
    fn test_write_then_read_is_last_write_wins() {
        let host = Rc::new(RecordingHost::default());
        let fields = store(&host);
        fields.install(FieldSchema::new().field("count", 0));

        fields.set("count", 1);
        fields.set("count", 2);
        assert_eq!(fields.get("count"), Value::Int(2));
        assert_eq!(host.requests(), 2);
    }

    #[test]
    fn test_equal_writes_still_request_rerenders() {
        let host = Rc::new(RecordingHost::default());
        let fields = store(&host);
        fields.install(FieldSchema::new().field("count", 3));

        fields.set("count", 3);
        fields.set("count", 3);
        assert_eq!(host.requests(), 2);
    }

    #[test]
    fn test_write_without_prior_read_creates_slot() {
        let host = Rc::new(RecordingHost::default());
        let fields = store(&host);
        fields.install(FieldSchema::new().field("count", 0));

        fields.set("count", 9);
        assert_eq!(fields.get("count"), Value::Int(9));
        assert_eq!(host.requests(), 1);
    }

    #[test]
    fn test_undeclared_fields_fail_open() {
        let host = Rc::new(RecordingHost::default());
        let fields = store(&host);
        fields.install(FieldSchema::new().field("count", 0));

        assert!(fields.get("missing").is_null());
        fields.set("missing", 5);
        assert!(fields.get("missing").is_null());
        assert_eq!(host.requests(), 0);
    }

    #[test]
    fn test_install_is_idempotent() {
        let host = Rc::new(RecordingHost::default());
        let fields = store(&host);
        fields.install(FieldSchema::new().field("count", 0));
        fields.set("count", 5);

        // A second install must not reset values or re-wrap slots.
        fields.install(FieldSchema::new().field("count", 100));
        assert_eq!(fields.get("count"), Value::Int(5));
        assert_eq!(host.requests(), 1);
    }

    #[test]
    fn test_schema_redeclaration_overwrites_default() {
        let schema = FieldSchema::new().field("n", 1).field("n", 2);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.default_of("n"), Some(&Value::Int(2)));
    }
}
