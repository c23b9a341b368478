//! Structured JSON emission for the query DSL
//!
//! Nodes never build JSON strings by hand. They write into a [`JsonWriter`],
//! which only offers scoped operations (a property always receives exactly
//! one value, an object or array is always closed), so emitted output is
//! well-formed by construction. Keys keep their emission order.

use serde_json::{Map, Value};

/// Anything that can write itself into the current JSON object.
///
/// A node writes itself as a single property of the enclosing object, e.g. a
/// term query writes `"term": { ... }`.
pub trait Emit {
    fn emit(&self, w: &mut JsonWriter);

    /// Emit into a fresh object and return it as a JSON value
    fn to_json_value(&self) -> Value {
        let mut w = JsonWriter::new();
        self.emit(&mut w);
        w.into_value()
    }

    /// Emit into a fresh object and render it compactly
    fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }
}

/// Writer for one JSON object
#[derive(Debug, Default)]
pub struct JsonWriter {
    map: Map<String, Value>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a required field.
    pub fn field(&mut self, name: &str, value: impl Into<Value>) {
        self.map.insert(name.to_string(), value.into());
    }

    /// Write an optional field. `None` means "never set" and writes nothing;
    /// `Some(default)` is always written.
    pub fn field_opt<T>(&mut self, name: &str, value: &Option<T>)
    where
        T: Clone + Into<Value>,
    {
        if let Some(v) = value {
            self.field(name, v.clone());
        }
    }

    /// Write a list field unconditionally.
    pub fn list<T>(&mut self, name: &str, values: &[T])
    where
        T: Clone + Into<Value>,
    {
        let items = values.iter().cloned().map(Into::into).collect();
        self.map.insert(name.to_string(), Value::Array(items));
    }

    /// Write a list only when it was explicitly assigned. An assigned empty
    /// list is written as `[]`.
    pub fn list_opt<T>(&mut self, name: &str, values: &Option<Vec<T>>)
    where
        T: Clone + Into<Value>,
    {
        if let Some(values) = values {
            self.list(name, values);
        }
    }

    /// Write a nested object property.
    pub fn object(&mut self, name: &str, f: impl FnOnce(&mut JsonWriter)) {
        let mut child = JsonWriter::new();
        f(&mut child);
        self.map.insert(name.to_string(), child.into_value());
    }

    /// Write a nested array property.
    pub fn array(&mut self, name: &str, f: impl FnOnce(&mut ArrayWriter)) {
        let mut child = ArrayWriter::default();
        f(&mut child);
        self.map.insert(name.to_string(), Value::Array(child.items));
    }

    /// Let a node write its own property into this object.
    pub fn emit<E: Emit + ?Sized>(&mut self, node: &E) {
        node.emit(self);
    }

    /// Wrap a node in a named object: `"name": { <node> }`.
    pub fn emit_in<E: Emit + ?Sized>(&mut self, name: &str, node: &E) {
        self.object(name, |w| node.emit(w));
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.map)
    }

    pub fn into_string(self) -> String {
        self.into_value().to_string()
    }
}

/// Writer for one JSON array
#[derive(Debug, Default)]
pub struct ArrayWriter {
    items: Vec<Value>,
}

impl ArrayWriter {
    pub fn value(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    pub fn object(&mut self, f: impl FnOnce(&mut JsonWriter)) {
        let mut child = JsonWriter::new();
        f(&mut child);
        self.items.push(child.into_value());
    }

    /// Push `{ <node> }` as the next element.
    pub fn emit<E: Emit + ?Sized>(&mut self, node: &E) {
        self.object(|w| node.emit(w));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
