//! Operation allow-lists
//!
//! A deployment chooses which operations its facade answers. Everything not
//! in the [`OperationSet`] is rejected with `UnsupportedOperation`, both for
//! direct calls and for remote invocation.

use std::collections::BTreeSet;

use crudtable_core::{Operation, UnknownOperation};

/// Set of permitted operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSet {
    ops: BTreeSet<Operation>,
}

impl OperationSet {
    /// Every operation.
    pub fn all() -> Self {
        Self {
            ops: Operation::ALL.into_iter().collect(),
        }
    }

    /// No operation at all.
    pub fn none() -> Self {
        Self {
            ops: BTreeSet::new(),
        }
    }

    /// Parse operation names, failing on the first unknown one.
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownOperation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ops = names
            .into_iter()
            .map(|name| name.as_ref().parse::<Operation>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { ops })
    }

    /// Add an operation.
    pub fn allow(mut self, op: Operation) -> Self {
        self.ops.insert(op);
        self
    }

    /// Whether `op` is permitted.
    pub fn contains(&self, op: Operation) -> bool {
        self.ops.contains(&op)
    }

    /// Permitted operations in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        self.ops.iter().copied()
    }

    /// Wire names of the permitted operations.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|op| op.as_str()).collect()
    }
}

impl Default for OperationSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<T: IntoIterator<Item = Operation>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}
