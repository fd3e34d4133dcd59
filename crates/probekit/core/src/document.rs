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

//! Routine document
//!
//! The [`Document`] owns the operation tree together with the view state
//! editors keep per node (collapsed, being edited, default insertion target).
//! It is the mutation surface used by front ends. View entries are pruned in
//! the same call that removes their node, so no stale id survives a delete.

use crate::catalog::Catalog;
use crate::codegen::{EmitConfig, ProgramGenerator};
use crate::error::{DocumentError, DocumentResult, TreeError};
use crate::node::{Node, NodeId, Params};
use crate::tree::{Direction, Tree};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Where a new or moved node should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Root,
    Node(NodeId),
    /// The document's current default insertion target
    Target,
}

/// Per-node editor state kept beside the tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub collapsed: BTreeSet<NodeId>,
    pub editing: BTreeSet<NodeId>,
    pub target: Option<NodeId>,
    pub show_code: bool,
}

impl ViewState {
    fn forget(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.collapsed.remove(id);
            self.editing.remove(id);
        }
        if self.target.as_ref().is_some_and(|target| ids.contains(target)) {
            self.target = None;
        }
    }

    /// Drop entries for ids the tree does not hold, or a target that is not a container
    fn retain_existing(&mut self, tree: &Tree) {
        self.collapsed.retain(|id| tree.contains(id));
        self.editing.retain(|id| tree.contains(id));
        if let Some(target) = &self.target {
            if !tree.get_node(target).is_some_and(Node::is_container) {
                self.target = None;
            }
        }
    }
}

/// A routine being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    tree: Tree,
    view: ViewState,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a document, discarding view entries that reference unknown ids
    pub fn from_parts(tree: Tree, mut view: ViewState) -> Self {
        view.retain_existing(&tree);
        Self { tree, view }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.tree.get_node(id)
    }

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    pub fn operation_count(&self) -> usize {
        self.tree.operation_count()
    }

    /// Containers available as destinations, with their depth
    pub fn each_container<F>(&self, visit: F)
    where
        F: FnMut(&Node, usize),
    {
        self.tree.each_container(visit);
    }

    /// Containers `id` may be moved into: everything except itself and its subtree
    pub fn move_destinations(&self, id: &NodeId) -> Vec<NodeId> {
        let mut destinations = Vec::new();
        self.tree.each_container(|node, _| {
            if node.id() != id && !self.tree.is_descendant(id, node.id()) {
                destinations.push(node.id().clone());
            }
        });
        destinations
    }

    /// Parent id for `destination`, `None` meaning root
    fn resolve(&self, destination: &Destination) -> Option<NodeId> {
        match destination {
            Destination::Root => None,
            Destination::Node(id) => Some(id.clone()),
            Destination::Target => self
                .view
                .target
                .clone()
                .filter(|id| self.tree.get_node(id).is_some_and(Node::is_container)),
        }
    }

    /// Append a new node of `kind` at the end of `destination`
    pub fn add(&mut self, catalog: &Catalog, kind: &str, destination: &Destination) -> DocumentResult<NodeId> {
        self.add_at(catalog, kind, destination, usize::MAX)
    }

    /// Insert a new node of `kind` into `destination` at `index` (clamped)
    pub fn add_at(&mut self, catalog: &Catalog, kind: &str, destination: &Destination, index: usize) -> DocumentResult<NodeId> {
        let node = catalog
            .instantiate(kind)
            .ok_or_else(|| DocumentError::UnknownKind(kind.to_string()))?;
        let id = node.id().clone();
        let parent = self.resolve(destination);
        self.tree
            .insert_node(node, parent.as_ref(), index)
            .inspect_err(|err| warn!("Rejected add of {}: {}", kind, err))?;
        debug!(node = %id, kind, "Added node");
        Ok(id)
    }

    /// Shallow-merge `patch` into the parameters of `id`
    pub fn update_params(&mut self, id: &NodeId, patch: Params) -> DocumentResult<()> {
        let node = self
            .tree
            .get_node_mut(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        node.merge_params(patch);
        Ok(())
    }

    pub fn move_node(&mut self, id: &NodeId, destination: &Destination, index: usize) -> DocumentResult<()> {
        let parent = self.resolve(destination);
        self.tree
            .move_node(id, parent.as_ref(), index)
            .inspect_err(|err| warn!("Rejected move of {}: {}", id, err))?;
        Ok(())
    }

    /// Remove `id` and its subtree, pruning their view state.
    ///
    /// Confirmation is the caller's job; this removes unconditionally.
    pub fn remove(&mut self, id: &NodeId) -> Option<Node> {
        let removed = self.tree.remove_node(id)?;
        self.view.forget(&removed.subtree_ids());
        Some(removed)
    }

    pub fn reorder(&mut self, id: &NodeId, direction: Direction) -> DocumentResult<()> {
        self.tree
            .reorder_sibling(id, direction)
            .inspect_err(|err| warn!("Rejected reorder of {}: {}", id, err))?;
        Ok(())
    }

    /// Copy the subtree at `id` with fresh ids, placed right after the original
    pub fn duplicate(&mut self, id: &NodeId) -> DocumentResult<NodeId> {
        let (parent, index) = self
            .tree
            .position_of(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        let copy = self
            .tree
            .get_node(id)
            .map(Node::clone_with_fresh_ids)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        let copy_id = copy.id().clone();
        self.tree.insert_node(copy, parent.as_ref(), index + 1)?;
        Ok(copy_id)
    }

    /// Set or clear the default insertion target
    pub fn set_target(&mut self, target: Option<NodeId>) -> DocumentResult<()> {
        if let Some(id) = &target {
            let node = self
                .tree
                .get_node(id)
                .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
            if !node.is_container() {
                return Err(TreeError::NotAContainer(id.clone()).into());
            }
        }
        self.view.target = target;
        Ok(())
    }

    /// Flip the collapsed flag of `id`, returning the new state
    pub fn toggle_collapsed(&mut self, id: &NodeId) -> DocumentResult<bool> {
        Self::toggle(&self.tree, &mut self.view.collapsed, id)
    }

    /// Flip the editing flag of `id`, returning the new state
    pub fn toggle_editing(&mut self, id: &NodeId) -> DocumentResult<bool> {
        Self::toggle(&self.tree, &mut self.view.editing, id)
    }

    fn toggle(tree: &Tree, set: &mut BTreeSet<NodeId>, id: &NodeId) -> DocumentResult<bool> {
        if !tree.contains(id) {
            return Err(TreeError::NodeNotFound(id.clone()).into());
        }
        if set.remove(id) {
            Ok(false)
        } else {
            set.insert(id.clone());
            Ok(true)
        }
    }

    pub fn set_show_code(&mut self, show: bool) {
        self.view.show_code = show;
    }

    /// Program text for the current routine
    pub fn generate(&self, catalog: &Catalog, config: &EmitConfig) -> String {
        ProgramGenerator::new(catalog, config).generate(&self.tree)
    }
}
