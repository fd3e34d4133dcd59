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

//! Node and program emission
//!
//! The emitter never recurses on its own. A container's callback decides
//! where its children go by calling [`EmitContext::children`], which lands in
//! [`emit_children`] with a forked context. Indentation and labels therefore
//! stay uniform whatever wrapping a container kind chooses.

use super::config::EmitConfig;
use super::context::{Chunk, EmitContext, LabelAllocator, MAX_LABEL};
use crate::catalog::Catalog;
use crate::node::Node;
use crate::tree::Tree;
use tracing::{debug, info, warn};

/// Emit one node at the position described by `ctx`.
///
/// A node whose kind is missing from the catalog becomes a single diagnostic
/// comment and its children are skipped; generation carries on.
pub fn emit(node: &Node, ctx: &EmitContext<'_>) -> Vec<String> {
    let Some(tool) = ctx.catalog().get(node.kind()) else {
        warn!(node = %node.id(), kind = node.kind(), "Unknown tool kind during emission");
        return vec![ctx.line(&format!("( UNKNOWN TOOL: {} )", node.kind()))];
    };

    let mut lines = Vec::new();
    for chunk in (tool.emit)(tool, node, ctx) {
        match chunk {
            Chunk::Line(text) => lines.push(ctx.line(&text)),
            Chunk::Block(block) => lines.extend(block),
        }
    }
    lines
}

/// Emit the children of `node`, in order, `delta` levels deeper than `ctx`.
///
/// Leaves have no children and produce nothing.
pub fn emit_children(node: &Node, ctx: &EmitContext<'_>, delta: usize) -> Vec<String> {
    let Some(children) = node.children() else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    for child in children {
        let child_ctx = ctx.fork(delta);
        lines.extend(emit(child, &child_ctx));
    }
    lines
}

/// Assembles complete programs: header, routine body, footer
pub struct ProgramGenerator<'a> {
    catalog: &'a Catalog,
    config: &'a EmitConfig,
}

impl<'a> ProgramGenerator<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a EmitConfig) -> Self {
        Self { catalog, config }
    }

    /// Body lines for a forest of root nodes, labels starting at the seed
    pub fn body(&self, roots: &[Node]) -> Vec<String> {
        let labels = LabelAllocator::new(self.config.label_seed);
        let ctx = self.config.context(self.catalog, &labels);
        let mut lines = Vec::new();
        for root in roots {
            lines.extend(emit(root, &ctx));
        }
        debug!(
            labels_used = labels.peek().saturating_sub(self.config.label_seed),
            "Emitted routine body"
        );
        if labels.peek() > MAX_LABEL.saturating_add(1) {
            warn!(last = labels.peek() - 1, max = MAX_LABEL, "Labels exceed the sequence number range");
        }
        lines
    }

    /// Complete program text, newline separated
    pub fn generate(&self, tree: &Tree) -> String {
        let mut lines = self.config.header_lines();
        lines.extend(self.body(tree.roots()));
        lines.extend(self.config.footer_lines());
        info!(nodes = tree.node_count(), lines = lines.len(), "Generated program");
        lines.join("\n")
    }
}
