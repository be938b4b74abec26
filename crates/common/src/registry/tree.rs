//! Parent / child bookkeeping
//!
//! The tree index keeps, for every parent token, the ordered list of its
//! children, and for every child token its position within that list.
//! The two maps are only ever mutated together, through [`TreeIndex::insert`]
//! and [`TreeIndex::remove`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{RegistryError, Result};
use super::id::Token;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeIndex {
    /// parent token -> ordered child tokens
    children: HashMap<Token, Vec<Token>>,
    /// child token -> index within its parent's child list
    position: HashMap<Token, usize>,
}

impl TreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered children of `parent`
    pub fn children(&self, parent: Token) -> &[Token] {
        self.children
            .get(&parent)
            .map(|c| c.as_slice())
            .unwrap_or_default()
    }

    pub fn position(&self, child: Token) -> Option<usize> {
        self.position.get(&child).copied()
    }

    /// Append `child` as the last child of `parent`
    pub fn insert(&mut self, parent: Token, child: Token) {
        let siblings = self.children.entry(parent).or_default();
        siblings.push(child);
        self.position.insert(child, siblings.len() - 1);
    }

    /// Remove `child` from `parent`'s list, shifting every later
    ///  sibling one slot left so sibling order is preserved.
    pub fn remove(&mut self, parent: Token, child: Token) -> Result<()> {
        let i = self.checked_position(parent, child)?;
        let siblings = self
            .children
            .get_mut(&parent)
            .ok_or_else(|| RegistryError::integrity(format!("parent {} has no children", parent)))?;

        let last = siblings.len() - 1;
        for j in i..last {
            let moved = siblings[j + 1];
            siblings[j] = moved;
            self.position.insert(moved, j);
        }
        siblings.truncate(last);
        if siblings.is_empty() {
            self.children.remove(&parent);
        }
        self.position.remove(&child);
        Ok(())
    }

    /// Shift-left remove `child` from `from`, then append it under `to`
    pub fn relocate(&mut self, child: Token, from: Token, to: Token) -> Result<()> {
        self.remove(from, child)?;
        self.insert(to, child);
        Ok(())
    }

    /// Check that the two maps agree about where `child` lives
    fn checked_position(&self, parent: Token, child: Token) -> Result<usize> {
        let i = self.position(child).ok_or_else(|| {
            RegistryError::integrity(format!("token {} has no recorded position", child))
        })?;
        match self.children(parent).get(i) {
            Some(t) if *t == child => Ok(i),
            _ => Err(RegistryError::integrity(format!(
                "token {} is not at position {} under parent {}",
                child, i, parent
            ))),
        }
    }
}
