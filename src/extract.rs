//! Conversion of a fully built [`Node`] tree into host-native values.
//!
//! The extractor never talks to a host runtime directly: all construction
//! goes through the [`HostConstructors`] callback trait, so the core stays
//! host-agnostic and testable. [`SimpleHost`] is the default implementation,
//! producing the plain [`HostValue`] enum with an in-process registry for
//! external objects.
//!
//! Extraction precedence, applied recursively:
//!
//! 1. `Nothing` becomes the host null.
//! 2. `External` is looked up in the registry, never copied.
//! 3. An unnamed scalar vector/factor/string node becomes its single
//!    element, or the host's masked-scalar marker when that element is
//!    missing.
//! 4. A named vector becomes a name-to-value mapping in node order, with
//!    missing indices mapped to the host missing marker.
//! 5. Any other vector becomes an ordered sequence plus an explicit missing
//!    set, preserved exactly.
//! 6. A `List` becomes an ordered or named sequence of extracted children
//!    and never collapses to a scalar.
//!
//! Extraction is read-only and idempotent; a tree may be extracted from
//! multiple threads once construction has completed.

use std::collections::BTreeSet;

use crate::node::{FactorVector, Node};

/// Constructor callbacks supplied by the host binding.
///
/// Implementations decide the concrete representation of sequences, masks,
/// and missing markers; the extractor guarantees it hands over (order,
/// values, missing set) exactly as stored in the node.
pub trait HostConstructors {
    type Value;

    /// Host null/unit, for `Nothing` nodes.
    fn null(&self) -> Self::Value;

    /// Host marker for a scalar whose single element is missing.
    fn masked_scalar(&self) -> Self::Value;

    fn integer_scalar(&self, value: i32) -> Self::Value;
    fn number_scalar(&self, value: f64) -> Self::Value;
    fn boolean_scalar(&self, value: bool) -> Self::Value;
    fn string_scalar(&self, value: &str) -> Self::Value;

    fn integer_vector(&self, values: &[i32], missing: &BTreeSet<usize>) -> Self::Value;
    fn number_vector(&self, values: &[f64], missing: &BTreeSet<usize>) -> Self::Value;
    fn boolean_vector(&self, values: &[Option<bool>]) -> Self::Value;
    fn string_vector(&self, values: &[Option<String>]) -> Self::Value;
    fn factor(&self, codes: &[Option<usize>], levels: &[String], ordered: bool) -> Self::Value;

    /// Name-to-value mapping; insertion order is node order.
    fn named_map(&self, entries: Vec<(String, Self::Value)>) -> Self::Value;

    /// Ordered sequence of extracted list children.
    fn sequence(&self, values: Vec<Self::Value>) -> Self::Value;

    /// The registry object at `index`. Ownership stays with the registry.
    fn external(&self, index: usize) -> Self::Value;
}

/// Converts `node` into the host representation defined by `host`.
pub fn extract<H: HostConstructors>(node: &Node, host: &H) -> H::Value {
    match node {
        Node::Nothing => host.null(),
        Node::External(index) => host.external(*index),
        Node::Integer(v) => {
            if let Some(names) = v.names() {
                let entries = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let value = if v.is_missing(i) {
                            host.masked_scalar()
                        } else {
                            host.integer_scalar(v.values()[i])
                        };
                        (name.clone(), value)
                    })
                    .collect();
                host.named_map(entries)
            } else if v.is_scalar() {
                if v.is_missing(0) {
                    host.masked_scalar()
                } else {
                    host.integer_scalar(v.values()[0])
                }
            } else {
                host.integer_vector(v.values(), v.missing())
            }
        }
        Node::Number(v) => {
            if let Some(names) = v.names() {
                let entries = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let value = if v.is_missing(i) {
                            host.masked_scalar()
                        } else {
                            host.number_scalar(v.values()[i])
                        };
                        (name.clone(), value)
                    })
                    .collect();
                host.named_map(entries)
            } else if v.is_scalar() {
                if v.is_missing(0) {
                    host.masked_scalar()
                } else {
                    host.number_scalar(v.values()[0])
                }
            } else {
                host.number_vector(v.values(), v.missing())
            }
        }
        Node::Boolean(v) => {
            if let Some(names) = v.names() {
                let entries = names
                    .iter()
                    .zip(v.values())
                    .map(|(name, value)| {
                        let value = match value {
                            Some(b) => host.boolean_scalar(*b),
                            None => host.masked_scalar(),
                        };
                        (name.clone(), value)
                    })
                    .collect();
                host.named_map(entries)
            } else if v.is_scalar() {
                match v.values()[0] {
                    Some(b) => host.boolean_scalar(b),
                    None => host.masked_scalar(),
                }
            } else {
                host.boolean_vector(v.values())
            }
        }
        Node::String(v) => {
            if let Some(names) = v.names() {
                let entries = names
                    .iter()
                    .zip(v.values())
                    .map(|(name, value)| {
                        let value = match value {
                            Some(s) => host.string_scalar(s),
                            None => host.masked_scalar(),
                        };
                        (name.clone(), value)
                    })
                    .collect();
                host.named_map(entries)
            } else if v.is_scalar() {
                match v.values()[0].as_deref() {
                    Some(s) => host.string_scalar(s),
                    None => host.masked_scalar(),
                }
            } else {
                host.string_vector(v.values())
            }
        }
        Node::Factor(v) => extract_factor(v, host),
        Node::List(list) => {
            let children: Vec<H::Value> = list
                .children()
                .iter()
                .map(|child| extract(child, host))
                .collect();
            match list.names() {
                Some(names) => {
                    let entries = names.iter().cloned().zip(children).collect();
                    host.named_map(entries)
                }
                None => host.sequence(children),
            }
        }
    }
}

fn extract_factor<H: HostConstructors>(v: &FactorVector, host: &H) -> H::Value {
    if let Some(names) = v.names() {
        // Factors have no direct named representation; expose level strings
        // keyed by element name, as the host would see them.
        let entries = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = match v.level_of(i) {
                    Some(level) => host.string_scalar(level),
                    None => host.masked_scalar(),
                };
                (name.clone(), value)
            })
            .collect();
        host.named_map(entries)
    } else if v.is_scalar() {
        match v.level_of(0) {
            Some(level) => host.string_scalar(level),
            None => host.masked_scalar(),
        }
    } else {
        host.factor(v.codes(), v.levels(), v.ordered())
    }
}

/// Plain-Rust host representation produced by [`SimpleHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Masked,
    Integer(i32),
    Number(f64),
    Boolean(bool),
    String(String),
    Integers(Vec<Option<i32>>),
    Numbers(Vec<Option<f64>>),
    Booleans(Vec<Option<bool>>),
    Strings(Vec<Option<String>>),
    Factor {
        codes: Vec<Option<usize>>,
        levels: Vec<String>,
        ordered: bool,
    },
    Sequence(Vec<HostValue>),
    Map(Vec<(String, HostValue)>),
}

/// Default host binding with an owned registry of external objects.
#[derive(Debug, Default)]
pub struct SimpleHost {
    registry: Vec<HostValue>,
}

impl SimpleHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with `registry` serving `Node::External` lookups by position.
    pub fn with_registry(registry: Vec<HostValue>) -> Self {
        SimpleHost { registry }
    }
}

impl HostConstructors for SimpleHost {
    type Value = HostValue;

    fn null(&self) -> HostValue {
        HostValue::Null
    }

    fn masked_scalar(&self) -> HostValue {
        HostValue::Masked
    }

    fn integer_scalar(&self, value: i32) -> HostValue {
        HostValue::Integer(value)
    }

    fn number_scalar(&self, value: f64) -> HostValue {
        HostValue::Number(value)
    }

    fn boolean_scalar(&self, value: bool) -> HostValue {
        HostValue::Boolean(value)
    }

    fn string_scalar(&self, value: &str) -> HostValue {
        HostValue::String(value.to_string())
    }

    fn integer_vector(&self, values: &[i32], missing: &BTreeSet<usize>) -> HostValue {
        HostValue::Integers(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (!missing.contains(&i)).then_some(*v))
                .collect(),
        )
    }

    fn number_vector(&self, values: &[f64], missing: &BTreeSet<usize>) -> HostValue {
        HostValue::Numbers(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (!missing.contains(&i)).then_some(*v))
                .collect(),
        )
    }

    fn boolean_vector(&self, values: &[Option<bool>]) -> HostValue {
        HostValue::Booleans(values.to_vec())
    }

    fn string_vector(&self, values: &[Option<String>]) -> HostValue {
        HostValue::Strings(values.to_vec())
    }

    fn factor(&self, codes: &[Option<usize>], levels: &[String], ordered: bool) -> HostValue {
        HostValue::Factor {
            codes: codes.to_vec(),
            levels: levels.to_vec(),
            ordered,
        }
    }

    fn named_map(&self, entries: Vec<(String, HostValue)>) -> HostValue {
        HostValue::Map(entries)
    }

    fn sequence(&self, values: Vec<HostValue>) -> HostValue {
        HostValue::Sequence(values)
    }

    fn external(&self, index: usize) -> HostValue {
        self.registry[index].clone()
    }
}
