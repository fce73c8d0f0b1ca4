//! The typed node model: a closed recursive variant for self-describing
//! hierarchical objects.
//!
//! A [`Node`] is one of eight variants: four dense primitive vectors
//! (integer, number, boolean, string), a factor with a level dictionary, a
//! list of child nodes, a null placeholder, and an external reference into a
//! caller-owned registry. Vector-like variants carry a predeclared length,
//! an `is_scalar` marker (length-1 vectors treated as single values), an
//! optional name per element, and an explicit missing-index set; values are
//! never grown after creation.
//!
//! Nodes are produced by [`crate::builder::NodeArena`] and are immutable once
//! built: this module only exposes read access. List children are owned
//! exclusively by their parent; `External` never owns the registry object it
//! points at.

use std::collections::BTreeSet;

/// Primitive vector kinds understood by the builder contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    Integer,
    Number,
    Boolean,
    String,
}

impl VectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorKind::Integer => "integer",
            VectorKind::Number => "number",
            VectorKind::Boolean => "boolean",
            VectorKind::String => "string",
        }
    }
}

/// Dense 32-bit integer vector with an explicit missing-index set.
///
/// Slots named in `missing` hold an unspecified filler in `values`; readers
/// must consult the mask rather than interpret the filler.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerVector {
    pub(crate) values: Vec<i32>,
    pub(crate) missing: BTreeSet<usize>,
    pub(crate) names: Option<Vec<String>>,
    pub(crate) is_scalar: bool,
}

/// Dense 64-bit float vector with an explicit missing-index set.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberVector {
    pub(crate) values: Vec<f64>,
    pub(crate) missing: BTreeSet<usize>,
    pub(crate) names: Option<Vec<String>>,
    pub(crate) is_scalar: bool,
}

/// Tri-state boolean vector; `None` marks a missing element.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanVector {
    pub(crate) values: Vec<Option<bool>>,
    pub(crate) names: Option<Vec<String>>,
    pub(crate) is_scalar: bool,
}

/// String vector; `None` marks a missing element.
#[derive(Debug, Clone, PartialEq)]
pub struct StringVector {
    pub(crate) values: Vec<Option<String>>,
    pub(crate) names: Option<Vec<String>>,
    pub(crate) is_scalar: bool,
}

/// Factor vector: per-element optional level codes plus the level dictionary.
///
/// Every `Some(code)` is a valid index into `levels`; `levels` entries are
/// unique. `ordered` records whether the levels carry an ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorVector {
    pub(crate) codes: Vec<Option<usize>>,
    pub(crate) levels: Vec<String>,
    pub(crate) ordered: bool,
    pub(crate) names: Option<Vec<String>>,
    pub(crate) is_scalar: bool,
}

/// Ordered children with optional names; names, when present, are exactly as
/// long as `children`. A list never collapses to a scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNode {
    pub(crate) children: Vec<Node>,
    pub(crate) names: Option<Vec<String>>,
}

/// One node of the recursive hierarchical model.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Integer(IntegerVector),
    Number(NumberVector),
    Boolean(BooleanVector),
    String(StringVector),
    Factor(FactorVector),
    List(ListNode),
    Nothing,
    External(usize),
}

macro_rules! vector_accessors {
    ($ty:ident) => {
        impl $ty {
            pub fn len(&self) -> usize {
                self.values.len()
            }

            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }

            pub fn is_scalar(&self) -> bool {
                self.is_scalar
            }

            pub fn names(&self) -> Option<&[String]> {
                self.names.as_deref()
            }
        }
    };
}

vector_accessors!(IntegerVector);
vector_accessors!(NumberVector);
vector_accessors!(BooleanVector);
vector_accessors!(StringVector);

impl IntegerVector {
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn missing(&self) -> &BTreeSet<usize> {
        &self.missing
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.missing.contains(&index)
    }
}

impl NumberVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn missing(&self) -> &BTreeSet<usize> {
        &self.missing
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.missing.contains(&index)
    }
}

impl BooleanVector {
    pub fn values(&self) -> &[Option<bool>] {
        &self.values
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(|v| v.is_none())
    }
}

impl StringVector {
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(|v| v.is_none())
    }
}

impl FactorVector {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn is_scalar(&self) -> bool {
        self.is_scalar
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    pub fn codes(&self) -> &[Option<usize>] {
        &self.codes
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn ordered(&self) -> bool {
        self.ordered
    }

    /// Level string for one element, or `None` when that element is missing.
    pub fn level_of(&self, index: usize) -> Option<&str> {
        self.codes
            .get(index)
            .and_then(|code| code.map(|c| self.levels[c].as_str()))
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.codes.get(index).is_some_and(|c| c.is_none())
    }
}

impl ListNode {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }
}

impl Node {
    /// Human-readable variant tag, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Integer(_) => "integer",
            Node::Number(_) => "number",
            Node::Boolean(_) => "boolean",
            Node::String(_) => "string",
            Node::Factor(_) => "factor",
            Node::List(_) => "list",
            Node::Nothing => "nothing",
            Node::External(_) => "external",
        }
    }

    /// Element count for vector-like variants; `None` for `Nothing` and
    /// `External`.
    pub fn len(&self) -> Option<usize> {
        match self {
            Node::Integer(v) => Some(v.len()),
            Node::Number(v) => Some(v.len()),
            Node::Boolean(v) => Some(v.len()),
            Node::String(v) => Some(v.len()),
            Node::Factor(v) => Some(v.len()),
            Node::List(v) => Some(v.len()),
            Node::Nothing | Node::External(_) => None,
        }
    }
}
