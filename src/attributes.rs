//! Typed attribute values and the node attribute store

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Declared type of an attribute column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrType {
    String,
    Floating,
    Integer,
    Boolean,
}

/// A single attribute value on a node or an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Boolean(bool),
    Integer(i64),
    Floating(f64),
    String(String),
}

impl AttrValue {
    pub fn kind(&self) -> AttrType {
        match self {
            AttrValue::Boolean(_) => AttrType::Boolean,
            AttrValue::Integer(_) => AttrType::Integer,
            AttrValue::Floating(_) => AttrType::Floating,
            AttrValue::String(_) => AttrType::String,
        }
    }

    /// Numeric view of the value; `None` for strings and booleans
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Integer(v) => Some(*v as f64),
            AttrValue::Floating(v) => Some(*v),
            AttrValue::Boolean(_) | AttrValue::String(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Boolean(v) => write!(f, "{}", v),
            AttrValue::Integer(v) => write!(f, "{}", v),
            AttrValue::Floating(v) => write!(f, "{}", v),
            AttrValue::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Floating(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

/// Narrow capability interface onto the host's node attribute storage.
///
/// The engine never looks at host-specific types; everything it needs is the
/// declared type of a column, a way to write one cell, and a way to drop a
/// whole column so it can be re-registered with another type.
pub trait AttributeStore {
    /// Declared type of the attribute, or `None` when it does not exist
    fn attribute_type(&self, name: &str) -> Option<AttrType>;

    fn set_attribute(&mut self, node_id: &str, name: &str, value: AttrValue) -> Result<()>;

    /// Remove the attribute and all of its values; no-op when absent
    fn delete_attribute(&mut self, name: &str);
}

/// One attribute column: its declared type and per-node values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeColumn {
    pub kind: AttrType,
    pub values: HashMap<String, AttrValue>,
}

/// In-memory node attribute store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeAttributes {
    columns: HashMap<String, AttributeColumn>,
}

impl NodeAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty attribute column with the given type.
    ///
    /// Replaces any existing column of the same name.
    pub fn declare(&mut self, name: &str, kind: AttrType) {
        self.columns.insert(
            name.to_string(),
            AttributeColumn {
                kind,
                values: HashMap::new(),
            },
        );
    }

    pub fn get(&self, node_id: &str, name: &str) -> Option<&AttrValue> {
        self.columns.get(name)?.values.get(node_id)
    }

    pub fn column(&self, name: &str) -> Option<&AttributeColumn> {
        self.columns.get(name)
    }

    /// Total number of stored values across all columns
    pub fn value_count(&self) -> usize {
        self.columns.values().map(|c| c.values.len()).sum()
    }
}

impl AttributeStore for NodeAttributes {
    fn attribute_type(&self, name: &str) -> Option<AttrType> {
        self.columns.get(name).map(|c| c.kind)
    }

    fn set_attribute(&mut self, node_id: &str, name: &str, value: AttrValue) -> Result<()> {
        let column = self
            .columns
            .entry(name.to_string())
            .or_insert_with(|| AttributeColumn {
                kind: value.kind(),
                values: HashMap::new(),
            });

        if column.kind != value.kind() {
            return Err(EngineError::AttributeTypeMismatch {
                attribute: name.to_string(),
                expected: column.kind,
                found: value.kind(),
            });
        }

        column.values.insert(node_id.to_string(), value);
        Ok(())
    }

    fn delete_attribute(&mut self, name: &str) {
        self.columns.remove(name);
    }
}
