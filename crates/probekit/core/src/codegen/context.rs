// Probekit
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Emission context
//!
//! An [`EmitContext`] is a small copyable snapshot of where the emitter is in
//! the tree: indentation depth and loop nesting depth. Forking produces a new
//! snapshot for the children and never alters the parent's.
//!
//! Labels are the exception. Every context forked from the same root shares
//! one [`LabelAllocator`], so two conditionals never receive the same label
//! anywhere in a program, including in sibling subtrees.

use super::emitter::emit_children;
use crate::catalog::Catalog;
use crate::node::Node;
use std::cell::Cell;

/// Highest loop index the control accepts in `DOn` / `ENDn`
pub const MAX_LOOP_INDEX: usize = 9;

/// Highest sequence number usable as an `N` / `GOTO` target
pub const MAX_LABEL: u32 = 99_999;

/// Hands out label numbers for one generation pass
#[derive(Debug)]
pub struct LabelAllocator {
    next: Cell<u32>,
}

impl LabelAllocator {
    pub fn new(seed: u32) -> Self {
        Self { next: Cell::new(seed) }
    }

    /// Return the current label and advance
    pub fn allocate(&self) -> u32 {
        let label = self.next.get();
        self.next.set(label.saturating_add(1));
        label
    }

    /// The label the next call to [`LabelAllocator::allocate`] returns
    pub fn peek(&self) -> u32 {
        self.next.get()
    }
}

/// Piece of output returned by an emission callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Text at the node's own indentation
    Line(String),
    /// Lines already indented by a nested context
    Block(Vec<String>),
}

impl From<String> for Chunk {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl From<&str> for Chunk {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

/// Position-dependent state for emitting one node
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    catalog: &'a Catalog,
    labels: &'a LabelAllocator,
    indent_unit: &'a str,
    indent: usize,
    loop_depth: usize,
}

impl<'a> EmitContext<'a> {
    /// Root context: no indentation, outside any loop
    pub fn new(catalog: &'a Catalog, labels: &'a LabelAllocator, indent_unit: &'a str) -> Self {
        Self {
            catalog,
            labels,
            indent_unit,
            indent: 0,
            loop_depth: 0,
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn loop_depth(&self) -> usize {
        self.loop_depth
    }

    /// Prefix `text` with one indent unit per level
    pub fn line(&self, text: &str) -> String {
        let mut out = self.indent_unit.repeat(self.indent);
        out.push_str(text);
        out
    }

    /// Allocate a unique jump label
    pub fn next_label(&self) -> u32 {
        self.labels.allocate()
    }

    /// Numeric suffix for a loop opened at this position, capped at 9
    pub fn loop_index(&self) -> usize {
        (self.loop_depth + 1).min(MAX_LOOP_INDEX)
    }

    /// Context for nested output `delta` levels deeper.
    ///
    /// Any positive delta also counts as one more level of loop nesting.
    pub fn fork(&self, delta: usize) -> Self {
        Self {
            indent: self.indent + delta,
            loop_depth: if delta > 0 { self.loop_depth + 1 } else { self.loop_depth },
            ..*self
        }
    }

    /// Emit the children of `node` one level deeper
    pub fn children(&self, node: &Node) -> Chunk {
        Chunk::Block(emit_children(node, self, 1))
    }
}
