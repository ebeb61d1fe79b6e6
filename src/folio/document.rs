//! # Structural Editor
//!
//! Edits a JSON document by [`PathAddress`] instead of by text. The document
//! is held as a [`serde_json::Value`] built with the `preserve_order` feature,
//! so object keys keep their insertion order through parse, edit and
//! serialize.
//!
//! ## Non-interference
//!
//! Every mutation touches exactly one entry of one container. Siblings keep
//! their values and their position; serializing before and after an edit
//! differs only inside the edited subtree. Array deletion is the one operation
//! that renumbers: later items shift down by one.
//!
//! ## Value coercion
//!
//! All value-entry points that take user text go through [`coerce_value`]:
//! text that parses as JSON is stored structurally (`42`, `true`, `[1,2]`,
//! `{"a":1}`, `"quoted"`), anything else is stored as a literal string.

use crate::error::{FolioError, Result};
use crate::path::{PathAddress, Segment};
use serde_json::{Map, Value};

/// A node of the document tree.
pub type DocumentNode = Value;

/// Most `null` slots `set` will add to reach an index past the end of an array.
pub const MAX_ARRAY_GAP: usize = 1024;

/// Try structured, fall back to literal.
pub fn coerce_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parses a document into an editor.
pub fn parse_document(text: &str) -> Result<StructuralEditor> {
    StructuralEditor::parse(text)
}

fn not_found(path: &PathAddress, reason: &str) -> FolioError {
    let shown = if path.is_root() {
        "<root>".to_string()
    } else {
        path.render()
    };
    FolioError::PathNotFound(format!("{}: {}", shown, reason))
}

fn empty_container(index_follows: bool) -> Value {
    if index_follows {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuralEditor {
    root: Value,
}

impl StructuralEditor {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        Ok(Self { root })
    }

    pub fn value(&self) -> &Value {
        &self.root
    }

    pub fn get(&self, path: &PathAddress) -> Result<&Value> {
        let mut node = &self.root;
        for segment in path.segments() {
            node = match (node, segment) {
                (Value::Object(map), Segment::Key(k)) => map.get(k),
                (Value::Array(items), Segment::Index(i)) => items.get(*i),
                _ => None,
            }
            .ok_or_else(|| not_found(path, "no such entry"))?;
        }
        Ok(node)
    }

    fn get_mut(&mut self, path: &PathAddress) -> Result<&mut Value> {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = match (node, segment) {
                (Value::Object(map), Segment::Key(k)) => map.get_mut(k),
                (Value::Array(items), Segment::Index(i)) => items.get_mut(*i),
                _ => None,
            }
            .ok_or_else(|| not_found(path, "no such entry"))?;
        }
        Ok(node)
    }

    /// Writes `value` at `path`, creating missing intermediate containers.
    ///
    /// A missing intermediate becomes an array when the segment after it is an
    /// index and an object otherwise. Existing scalars are never replaced by a
    /// container on the way down; that is reported as `PathNotFound`. An index
    /// past the end of an array pads with `null`, at most [`MAX_ARRAY_GAP`]
    /// slots.
    pub fn set(&mut self, path: &PathAddress, value: Value) -> Result<()> {
        let Some((parent, last)) = path.parent() else {
            self.root = value;
            return Ok(());
        };

        let segments = parent.segments();
        let mut node = &mut self.root;
        for (i, segment) in segments.iter().enumerate() {
            let next = segments.get(i + 1).unwrap_or(last);
            node = descend_or_create(node, segment, next.is_index(), path)?;
        }

        match last {
            Segment::Key(k) => {
                if node.is_null() {
                    *node = Value::Object(Map::new());
                }
                let map = node
                    .as_object_mut()
                    .ok_or_else(|| not_found(path, "parent is not an object"))?;
                map.insert(k.clone(), value);
            }
            Segment::Index(i) => {
                if node.is_null() {
                    *node = Value::Array(Vec::new());
                }
                let items = node
                    .as_array_mut()
                    .ok_or_else(|| not_found(path, "parent is not an array"))?;
                *slot(items, *i, path)? = value;
            }
        }
        Ok(())
    }

    /// [`set`](Self::set) with the value coerced from user text.
    pub fn set_raw(&mut self, path: &PathAddress, raw: &str) -> Result<()> {
        self.set(path, coerce_value(raw))
    }

    /// Removes the entry at `path` and returns it.
    pub fn delete(&mut self, path: &PathAddress) -> Result<Value> {
        let (parent, last) = path
            .parent()
            .ok_or_else(|| not_found(path, "cannot delete the root"))?;
        let container = self
            .get_mut(&parent)
            .map_err(|_| not_found(path, "parent does not exist"))?;

        match (container, last) {
            (Value::Object(map), Segment::Key(k)) => map
                .shift_remove(k)
                .ok_or_else(|| not_found(path, "no such key")),
            (Value::Array(items), Segment::Index(i)) if *i < items.len() => Ok(items.remove(*i)),
            _ => Err(not_found(path, "no such entry")),
        }
    }

    /// Adds a new key to the object at `parent`.
    pub fn add_field(&mut self, parent: &PathAddress, key: &str, raw: &str) -> Result<()> {
        if key.is_empty() {
            return Err(FolioError::InvalidInput("field name cannot be empty".into()));
        }
        let node = self.get_mut(parent)?;
        let map = node
            .as_object_mut()
            .ok_or_else(|| not_found(parent, "not an object"))?;
        if map.contains_key(key) {
            return Err(FolioError::DuplicateKey(format!(
                "'{}' already exists at {}",
                key,
                if parent.is_root() {
                    "<root>".to_string()
                } else {
                    parent.render()
                }
            )));
        }
        map.insert(key.to_string(), coerce_value(raw));
        Ok(())
    }

    /// Appends to the array at `parent`, returning the new item's index.
    pub fn add_item(&mut self, parent: &PathAddress, raw: &str) -> Result<usize> {
        let node = self.get_mut(parent)?;
        let items = node
            .as_array_mut()
            .ok_or_else(|| not_found(parent, "not an array"))?;
        items.push(coerce_value(raw));
        Ok(items.len() - 1)
    }

    /// Canonical text: two-space indentation, keys in insertion order.
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Merges a sparse set of changed values back into the tree.
    ///
    /// Each change is applied with [`set`](Self::set). Either every change
    /// applies or the tree is left as it was.
    pub fn apply_changes(&mut self, changes: &[(PathAddress, Value)]) -> Result<()> {
        let mut staged = self.clone();
        for (path, value) in changes {
            staged.set(path, value.clone())?;
        }
        *self = staged;
        Ok(())
    }

    /// Every scalar (and every empty container) with its address, in document
    /// order.
    pub fn leaves(&self) -> Vec<(PathAddress, &Value)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, PathAddress::root(), &mut out);
        out
    }
}

/// The item at `index`, padding the array with `null` up to it.
fn slot<'a>(items: &'a mut Vec<Value>, index: usize, path: &PathAddress) -> Result<&'a mut Value> {
    if index.saturating_sub(items.len()) > MAX_ARRAY_GAP {
        return Err(not_found(path, "index is too far past the end of the array"));
    }
    let len = index
        .checked_add(1)
        .ok_or_else(|| not_found(path, "index is too large"))?;
    if items.len() < len {
        items.resize(len, Value::Null);
    }
    Ok(&mut items[index])
}

fn descend_or_create<'a>(
    node: &'a mut Value,
    segment: &Segment,
    index_follows: bool,
    path: &PathAddress,
) -> Result<&'a mut Value> {
    let not_container = || not_found(path, "intermediate entry is not a container");
    let child = match segment {
        Segment::Key(k) => {
            if node.is_null() {
                *node = Value::Object(Map::new());
            }
            node.as_object_mut()
                .ok_or_else(not_container)?
                .entry(k.clone())
                .or_insert_with(|| empty_container(index_follows))
        }
        Segment::Index(i) => {
            if node.is_null() {
                *node = Value::Array(Vec::new());
            }
            let items = node.as_array_mut().ok_or_else(not_container)?;
            slot(items, *i, path)?
        }
    };
    if child.is_null() {
        *child = empty_container(index_follows);
    }
    match child {
        Value::Object(_) | Value::Array(_) => Ok(child),
        _ => Err(not_container()),
    }
}

fn collect_leaves<'a>(node: &'a Value, at: PathAddress, out: &mut Vec<(PathAddress, &'a Value)>) {
    match node {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                collect_leaves(v, at.child_key(k.clone()), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, v) in items.iter().enumerate() {
                collect_leaves(v, at.child_index(i), out);
            }
        }
        _ => out.push((at, node)),
    }
}
