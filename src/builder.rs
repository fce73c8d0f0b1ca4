//! Handle-based factory contract for constructing [`Node`] trees bottom-up.
//!
//! An external streaming parser (JSON tokenizer, HDF5 dataset reader)
//! discovers each node's variant tag and cardinality before requesting
//! construction, then populates elements index-by-index in any order:
//!
//! - [`NodeArena::new_vector`] / [`NodeArena::new_factor`] /
//!   [`NodeArena::new_list`] / [`NodeArena::new_nothing`] /
//!   [`NodeArena::new_external`] preallocate a node and return a [`Handle`];
//! - [`NodeArena::set`], [`NodeArena::set_missing`], [`NodeArena::set_name`],
//!   and [`NodeArena::set_level`] fill one slot each;
//! - [`NodeArena::finish`] checks that every declared slot was populated and
//!   assembles the exclusively-owned tree rooted at the given handle.
//!
//! Assignment is exactly-once per index: assigning a value and a missing
//! flag to the same index, or assigning either twice, is rejected with
//! [`FrameError::DoubleAssignment`]. No node accepts structural mutation
//! (length change) after creation.

use std::collections::BTreeSet;

use crate::error::{FrameError, Result};
use crate::node::{
    BooleanVector, FactorVector, IntegerVector, ListNode, Node, NumberVector, StringVector,
    VectorKind,
};

/// Opaque reference to a node under construction in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(usize);

/// One element assignment. The variant must agree with the target node's
/// kind; `Code` addresses factor levels and `Child` attaches a previously
/// built node to a list.
#[derive(Debug, Clone)]
pub enum SetValue {
    Integer(i32),
    Number(f64),
    Boolean(bool),
    Text(String),
    Code(usize),
    Child(Handle),
}

impl SetValue {
    fn kind_name(&self) -> &'static str {
        match self {
            SetValue::Integer(_) => "integer",
            SetValue::Number(_) => "number",
            SetValue::Boolean(_) => "boolean",
            SetValue::Text(_) => "string",
            SetValue::Code(_) => "factor code",
            SetValue::Child(_) => "list child",
        }
    }
}

#[derive(Debug)]
enum PendingBody {
    Integer {
        values: Vec<i32>,
        missing: BTreeSet<usize>,
    },
    Number {
        values: Vec<f64>,
        missing: BTreeSet<usize>,
    },
    Boolean {
        values: Vec<Option<bool>>,
    },
    String {
        values: Vec<Option<String>>,
    },
    Factor {
        codes: Vec<Option<usize>>,
        levels: Vec<Option<String>>,
        ordered: bool,
    },
    List {
        children: Vec<Option<Handle>>,
    },
    Nothing,
    External {
        registry_index: usize,
    },
}

impl PendingBody {
    fn kind_name(&self) -> &'static str {
        match self {
            PendingBody::Integer { .. } => "integer",
            PendingBody::Number { .. } => "number",
            PendingBody::Boolean { .. } => "boolean",
            PendingBody::String { .. } => "string",
            PendingBody::Factor { .. } => "factor",
            PendingBody::List { .. } => "list",
            PendingBody::Nothing => "nothing",
            PendingBody::External { .. } => "external",
        }
    }
}

#[derive(Debug)]
struct Pending {
    body: PendingBody,
    length: usize,
    // One flag per element; covers set/set_missing/child attachment.
    assigned: Vec<bool>,
    names: Option<Vec<Option<String>>>,
    is_scalar: bool,
    // Set once the node is attached to a parent list.
    consumed: bool,
}

impl Pending {
    fn new(body: PendingBody, length: usize, has_names: bool, is_scalar: bool) -> Self {
        Pending {
            body,
            length,
            assigned: vec![false; length],
            names: has_names.then(|| vec![None; length]),
            is_scalar,
            consumed: false,
        }
    }

    fn claim(&mut self, node: usize, index: usize) -> Result<()> {
        let length = self.length;
        let kind = self.body.kind_name();
        let slot = self
            .assigned
            .get_mut(index)
            .ok_or_else(|| FrameError::IndexOutOfBounds {
                what: format!("{kind} node"),
                index,
                length,
            })?;
        if *slot {
            return Err(FrameError::DoubleAssignment { node, index });
        }
        *slot = true;
        Ok(())
    }
}

/// Arena of nodes under construction.
///
/// The arena owns every pending node until [`NodeArena::finish`] transfers
/// ownership of the assembled tree to the caller. External references are
/// bounds-checked against the registry size when one is declared.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Option<Pending>>,
    registry_size: Option<usize>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena whose `External` nodes must index into a registry of `size`
    /// caller-owned objects.
    pub fn with_registry_size(size: usize) -> Self {
        NodeArena {
            slots: Vec::new(),
            registry_size: Some(size),
        }
    }

    fn push(&mut self, pending: Pending) -> Handle {
        self.slots.push(Some(pending));
        Handle(self.slots.len() - 1)
    }

    fn pending_mut(&mut self, handle: Handle) -> &mut Pending {
        self.slots[handle.0]
            .as_mut()
            .expect("handle refers to a finished arena slot")
    }

    /// Preallocates a primitive vector of `kind` with `length` elements.
    pub fn new_vector(
        &mut self,
        kind: VectorKind,
        length: usize,
        has_names: bool,
        is_scalar: bool,
    ) -> Handle {
        let body = match kind {
            VectorKind::Integer => PendingBody::Integer {
                values: vec![0; length],
                missing: BTreeSet::new(),
            },
            VectorKind::Number => PendingBody::Number {
                values: vec![0.0; length],
                missing: BTreeSet::new(),
            },
            VectorKind::Boolean => PendingBody::Boolean {
                values: vec![None; length],
            },
            VectorKind::String => PendingBody::String {
                values: vec![None; length],
            },
        };
        self.push(Pending::new(body, length, has_names, is_scalar))
    }

    /// Preallocates a factor with `length` elements and a level dictionary of
    /// `level_count` entries, populated separately via
    /// [`NodeArena::set_level`].
    pub fn new_factor(
        &mut self,
        length: usize,
        has_names: bool,
        is_scalar: bool,
        level_count: usize,
        ordered: bool,
    ) -> Handle {
        let body = PendingBody::Factor {
            codes: vec![None; length],
            levels: vec![None; level_count],
            ordered,
        };
        self.push(Pending::new(body, length, has_names, is_scalar))
    }

    /// Preallocates a list with `length` child slots.
    pub fn new_list(&mut self, length: usize, has_names: bool) -> Handle {
        let body = PendingBody::List {
            children: vec![None; length],
        };
        self.push(Pending::new(body, length, has_names, false))
    }

    /// Creates the unit/null placeholder node.
    pub fn new_nothing(&mut self) -> Handle {
        self.push(Pending::new(PendingBody::Nothing, 0, false, false))
    }

    /// Creates a weak reference to the registry object at `registry_index`.
    pub fn new_external(&mut self, registry_index: usize) -> Result<Handle> {
        if let Some(size) = self.registry_size
            && registry_index >= size
        {
            return Err(FrameError::IndexOutOfBounds {
                what: "external registry".to_string(),
                index: registry_index,
                length: size,
            });
        }
        Ok(self.push(Pending::new(
            PendingBody::External { registry_index },
            0,
            false,
            false,
        )))
    }

    /// Assigns the element at `index`, type-checked against the node's kind.
    pub fn set(&mut self, handle: Handle, index: usize, value: SetValue) -> Result<()> {
        // Child attachment consumes the child slot; validate it before
        // claiming the parent's element so a failure leaves both untouched.
        if let SetValue::Child(child) = value {
            return self.attach_child(handle, index, child);
        }

        let pending = self.pending_mut(handle);
        match (&pending.body, &value) {
            (PendingBody::Integer { .. }, SetValue::Integer(_))
            | (PendingBody::Number { .. }, SetValue::Number(_))
            | (PendingBody::Boolean { .. }, SetValue::Boolean(_))
            | (PendingBody::String { .. }, SetValue::Text(_))
            | (PendingBody::Factor { .. }, SetValue::Code(_)) => {}
            _ => {
                return Err(FrameError::TypeMismatch {
                    location: format!("index {index} of node {}", handle.0),
                    expected: pending.body.kind_name().to_string(),
                    actual: value.kind_name().to_string(),
                });
            }
        }

        // Factor codes must address a declared level.
        if let (PendingBody::Factor { levels, .. }, SetValue::Code(code)) = (&pending.body, &value)
            && *code >= levels.len()
        {
            return Err(FrameError::IndexOutOfBounds {
                what: "factor levels".to_string(),
                index: *code,
                length: levels.len(),
            });
        }

        pending.claim(handle.0, index)?;
        match (&mut pending.body, value) {
            (PendingBody::Integer { values, .. }, SetValue::Integer(v)) => values[index] = v,
            (PendingBody::Number { values, .. }, SetValue::Number(v)) => values[index] = v,
            (PendingBody::Boolean { values }, SetValue::Boolean(v)) => values[index] = Some(v),
            (PendingBody::String { values }, SetValue::Text(v)) => values[index] = Some(v),
            (PendingBody::Factor { codes, .. }, SetValue::Code(v)) => codes[index] = Some(v),
            _ => unreachable!("variant pairing checked above"),
        }
        Ok(())
    }

    fn attach_child(&mut self, parent: Handle, index: usize, child: Handle) -> Result<()> {
        if child.0 >= self.slots.len() || parent.0 == child.0 {
            return Err(FrameError::IndexOutOfBounds {
                what: "arena".to_string(),
                index: child.0,
                length: self.slots.len(),
            });
        }
        {
            let child_slot = self.slots[child.0]
                .as_ref()
                .expect("handle refers to a finished arena slot");
            if child_slot.consumed {
                return Err(FrameError::DoubleAssignment {
                    node: child.0,
                    index,
                });
            }
        }

        let pending = self.pending_mut(parent);
        if !matches!(pending.body, PendingBody::List { .. }) {
            return Err(FrameError::TypeMismatch {
                location: format!("index {index} of node {}", parent.0),
                expected: pending.body.kind_name().to_string(),
                actual: "list child".to_string(),
            });
        }
        pending.claim(parent.0, index)?;
        if let PendingBody::List { children } = &mut pending.body {
            children[index] = Some(child);
        }
        self.slots[child.0].as_mut().expect("checked above").consumed = true;
        Ok(())
    }

    /// Marks the element at `index` as missing. Only vector and factor nodes
    /// carry missingness.
    pub fn set_missing(&mut self, handle: Handle, index: usize) -> Result<()> {
        let pending = self.pending_mut(handle);
        match pending.body {
            PendingBody::Integer { .. }
            | PendingBody::Number { .. }
            | PendingBody::Boolean { .. }
            | PendingBody::String { .. }
            | PendingBody::Factor { .. } => {}
            _ => {
                return Err(FrameError::TypeMismatch {
                    location: format!("index {index} of node {}", handle.0),
                    expected: "vector or factor".to_string(),
                    actual: pending.body.kind_name().to_string(),
                });
            }
        }
        pending.claim(handle.0, index)?;
        match &mut pending.body {
            PendingBody::Integer { missing, .. } | PendingBody::Number { missing, .. } => {
                missing.insert(index);
            }
            // Tri-state and optional storage already default to missing.
            PendingBody::Boolean { .. }
            | PendingBody::String { .. }
            | PendingBody::Factor { .. } => {}
            _ => unreachable!("variant checked above"),
        }
        Ok(())
    }

    /// Names the element at `index`; the node must have been created with
    /// `has_names`.
    pub fn set_name(&mut self, handle: Handle, index: usize, name: &str) -> Result<()> {
        let pending = self.pending_mut(handle);
        let length = pending.length;
        let Some(names) = pending.names.as_mut() else {
            return Err(FrameError::TypeMismatch {
                location: format!("name {index} of node {}", handle.0),
                expected: "node created with names".to_string(),
                actual: "unnamed node".to_string(),
            });
        };
        let slot = names
            .get_mut(index)
            .ok_or_else(|| FrameError::IndexOutOfBounds {
                what: "names".to_string(),
                index,
                length,
            })?;
        if slot.is_some() {
            return Err(FrameError::DoubleAssignment {
                node: handle.0,
                index,
            });
        }
        *slot = Some(name.to_string());
        Ok(())
    }

    /// Populates one entry of a factor's level dictionary, indexed
    /// `0..level_count` independently of the element indices.
    pub fn set_level(&mut self, handle: Handle, index: usize, level: &str) -> Result<()> {
        let pending = self.pending_mut(handle);
        let PendingBody::Factor { levels, .. } = &mut pending.body else {
            return Err(FrameError::TypeMismatch {
                location: format!("level {index} of node {}", handle.0),
                expected: "factor".to_string(),
                actual: pending.body.kind_name().to_string(),
            });
        };
        let length = levels.len();
        let slot = levels
            .get_mut(index)
            .ok_or_else(|| FrameError::IndexOutOfBounds {
                what: "factor levels".to_string(),
                index,
                length,
            })?;
        if slot.is_some() {
            return Err(FrameError::DoubleAssignment {
                node: handle.0,
                index,
            });
        }
        *slot = Some(level.to_string());
        Ok(())
    }

    /// Verifies full population and assembles the tree rooted at `root`,
    /// transferring ownership to the caller. Every node created in the arena
    /// must be reachable from `root`.
    pub fn finish(mut self, root: Handle) -> Result<Node> {
        {
            let pending = self.slots[root.0]
                .as_ref()
                .expect("handle refers to a finished arena slot");
            if pending.consumed {
                return Err(FrameError::IncompleteNode {
                    node: root.0,
                    detail: "root node is already attached to a parent list".to_string(),
                });
            }
        }
        let tree = self.assemble(root)?;
        if let Some(orphan) = self.slots.iter().position(|slot| slot.is_some()) {
            return Err(FrameError::IncompleteNode {
                node: orphan,
                detail: "node was never attached to the tree".to_string(),
            });
        }
        Ok(tree)
    }

    fn assemble(&mut self, handle: Handle) -> Result<Node> {
        // Attachment is exactly-once, so a cycle can never be reachable from
        // a valid root; a taken slot here would be a caller-forged handle.
        let pending = self.slots[handle.0]
            .take()
            .expect("handle refers to a finished arena slot");
        let node = handle.0;

        if pending.is_scalar && pending.length != 1 {
            return Err(FrameError::IncompleteNode {
                node,
                detail: format!("scalar flag on a length-{} vector", pending.length),
            });
        }
        if let Some(index) = pending.assigned.iter().position(|done| !done) {
            return Err(FrameError::IncompleteNode {
                node,
                detail: format!("index {index} was never assigned a value or missing flag"),
            });
        }
        let names = match pending.names {
            None => None,
            Some(names) => {
                let mut resolved = Vec::with_capacity(names.len());
                for (index, name) in names.into_iter().enumerate() {
                    resolved.push(name.ok_or_else(|| FrameError::IncompleteNode {
                        node,
                        detail: format!("name {index} was never assigned"),
                    })?);
                }
                Some(resolved)
            }
        };
        let is_scalar = pending.is_scalar;

        match pending.body {
            PendingBody::Integer { values, missing } => Ok(Node::Integer(IntegerVector {
                values,
                missing,
                names,
                is_scalar,
            })),
            PendingBody::Number { values, missing } => Ok(Node::Number(NumberVector {
                values,
                missing,
                names,
                is_scalar,
            })),
            PendingBody::Boolean { values } => Ok(Node::Boolean(BooleanVector {
                values,
                names,
                is_scalar,
            })),
            PendingBody::String { values } => Ok(Node::String(StringVector {
                values,
                names,
                is_scalar,
            })),
            PendingBody::Factor {
                codes,
                levels,
                ordered,
            } => {
                let mut resolved = Vec::with_capacity(levels.len());
                for (index, level) in levels.into_iter().enumerate() {
                    resolved.push(level.ok_or_else(|| FrameError::IncompleteNode {
                        node,
                        detail: format!("level {index} was never assigned"),
                    })?);
                }
                let mut seen = BTreeSet::new();
                for level in &resolved {
                    if !seen.insert(level.as_str()) {
                        return Err(FrameError::IncompleteNode {
                            node,
                            detail: format!("duplicate factor level '{level}'"),
                        });
                    }
                }
                Ok(Node::Factor(FactorVector {
                    codes,
                    levels: resolved,
                    ordered,
                    names,
                    is_scalar,
                }))
            }
            PendingBody::List { children } => {
                let mut resolved = Vec::with_capacity(children.len());
                for child in children {
                    let child = child.expect("claim() marked every attached child");
                    resolved.push(self.assemble(child)?);
                }
                Ok(Node::List(ListNode {
                    children: resolved,
                    names,
                }))
            }
            PendingBody::Nothing => Ok(Node::Nothing),
            PendingBody::External { registry_index } => Ok(Node::External(registry_index)),
        }
    }
}
