//! Read-only traversal over an untyped document tree.
//!
//! The tree is a `serde_json::Value`: objects, arrays and scalars. Paths are
//! rendered the same way everywhere in the workspace:
//!
//! ```text
//! root.study.versions[0].studyDesigns[1].epochs[3]
//! ```
//!
//! `visit` is a plain iterator over an immutable tree, so every pass can
//! start its own walk without coordination.

use crate::error::{DocumentError, value_kind};
use serde_json::{Map, Value};

/// Path prefix used for the document root.
pub const ROOT_PATH: &str = "root";

/// A validated document: the root is known to be an object.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    root: &'a Value,
    object: &'a Map<String, Value>,
}

impl<'a> Document<'a> {
    /// Wrap a parsed tree. Fails once, up front, when the root is not an
    /// object.
    pub fn new(root: &'a Value) -> Result<Self, DocumentError> {
        match root {
            Value::Object(object) => Ok(Self { root, object }),
            other => Err(DocumentError::RootNotObject {
                found: value_kind(other),
            }),
        }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn root_object(&self) -> &'a Map<String, Value> {
        self.object
    }

    /// Every object node of the document, depth-first.
    pub fn visit(&self) -> Visit<'a> {
        visit(self.root, ROOT_PATH)
    }
}

/// One object node together with its location.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub object: &'a Map<String, Value>,
    pub path: String,
    /// Nearest field name above this object. Array elements inherit the
    /// field name of their array; the root has none.
    pub container: Option<&'a str>,
}

impl<'a> Node<'a> {
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&'a str> {
        self.object.get(field).and_then(Value::as_str)
    }

    /// `instanceType` of the object, when it is a string.
    pub fn instance_type(&self) -> Option<&'a str> {
        self.str_field("instanceType")
    }
}

struct Frame<'a> {
    value: &'a Value,
    path: String,
    container: Option<&'a str>,
}

/// Depth-first, pre-order iterator over object nodes.
///
/// Fields are visited in document order, array elements by index. Scalars
/// are never descended into.
pub struct Visit<'a> {
    stack: Vec<Frame<'a>>,
}

/// Enumerate every object node reachable from `value`.
pub fn visit<'a>(value: &'a Value, path_prefix: &str) -> Visit<'a> {
    Visit {
        stack: vec![Frame {
            value,
            path: path_prefix.to_string(),
            container: None,
        }],
    }
}

impl<'a> Iterator for Visit<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            match frame.value {
                Value::Object(map) => {
                    // Reverse push so the first field is popped first.
                    for (key, child) in map.iter().rev() {
                        if is_container(child) {
                            self.stack.push(Frame {
                                value: child,
                                path: field_path(&frame.path, key),
                                container: Some(key.as_str()),
                            });
                        }
                    }
                    return Some(Node {
                        object: map,
                        path: frame.path,
                        container: frame.container,
                    });
                }
                Value::Array(items) => {
                    for (index, child) in items.iter().enumerate().rev() {
                        if is_container(child) {
                            self.stack.push(Frame {
                                value: child,
                                path: index_path(&frame.path, index),
                                container: frame.container,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

pub fn field_path(prefix: &str, field: &str) -> String {
    format!("{prefix}.{field}")
}

pub fn index_path(prefix: &str, index: usize) -> String {
    format!("{prefix}[{index}]")
}

/// Follow a dotted field path (`category.decode`) through nested objects.
pub fn lookup_dotted<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| current.get(segment))
}

/// Whether a value carries content: not null, and not an empty string,
/// array or object.
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Array field of an object, or an empty slice when absent or not an array.
pub fn array_field<'a>(object: &'a Value, field: &str) -> &'a [Value] {
    object
        .get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
