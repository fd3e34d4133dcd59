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

//! Operation tree store
//!
//! An ordered forest of [`Node`]s. Nodes do not store a parent link, so every
//! lookup is a traversal from the roots. Routines stay in the tens to low
//! hundreds of nodes, which keeps that affordable.
//!
//! Structural mutations either succeed or return a [`TreeError`] and leave
//! the forest untouched.

use crate::error::{TreeError, TreeResult};
use crate::node::{Node, NodeId};
use std::collections::HashSet;
use tracing::debug;

/// Direction for sibling reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the start of the sibling list (-1)
    Up,
    /// Towards the end of the sibling list (+1)
    Down,
}

impl Direction {
    pub fn delta(self) -> isize {
        match self {
            Self::Up => -1,
            Self::Down => 1,
        }
    }
}

/// Ordered forest of operation nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    roots: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from root nodes, rejecting duplicate ids
    pub fn from_roots(roots: Vec<Node>) -> TreeResult<Self> {
        let mut tree = Self::new();
        for node in roots {
            tree.insert_node(node, None, usize::MAX)?;
        }
        Ok(tree)
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<Node> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes in the forest
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(Node::subtree_len).sum()
    }

    /// Number of leaf operations, containers excluded
    pub fn operation_count(&self) -> usize {
        let mut count = 0;
        self.walk(|node, _| {
            if !node.is_container() {
                count += 1;
            }
        });
        count
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.get_node(id).is_some()
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    pub fn get_node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.roots.iter_mut().find_map(|root| root.find_mut(id))
    }

    /// The container holding `id`.
    ///
    /// `None` both for root-level nodes and for unknown ids; use
    /// [`Tree::get_node`] to tell them apart.
    pub fn get_parent(&self, id: &NodeId) -> Option<&Node> {
        fn search<'a>(nodes: &'a [Node], id: &NodeId) -> Option<&'a Node> {
            for node in nodes {
                if let Some(children) = node.children() {
                    if children.iter().any(|child| child.id() == id) {
                        return Some(node);
                    }
                    if let Some(found) = search(children, id) {
                        return Some(found);
                    }
                }
            }
            None
        }
        search(&self.roots, id)
    }

    /// Parent id (`None` for root level) and index of `id` among its siblings
    pub fn position_of(&self, id: &NodeId) -> Option<(Option<NodeId>, usize)> {
        if let Some(index) = self.roots.iter().position(|node| node.id() == id) {
            return Some((None, index));
        }
        let parent = self.get_parent(id)?;
        let index = parent.children()?.iter().position(|node| node.id() == id)?;
        Some((Some(parent.id().clone()), index))
    }

    /// True iff `id` lies strictly below `ancestor`
    pub fn is_descendant(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        self.get_node(ancestor)
            .and_then(Node::children)
            .is_some_and(|children| children.iter().any(|child| child.find(id).is_some()))
    }

    fn sequence_mut(&mut self, parent: Option<&NodeId>) -> TreeResult<&mut Vec<Node>> {
        match parent {
            None => Ok(&mut self.roots),
            Some(parent_id) => {
                let node = self
                    .get_node_mut(parent_id)
                    .ok_or_else(|| TreeError::ParentNotFound(parent_id.clone()))?;
                node.children_mut()
                    .ok_or_else(|| TreeError::NotAContainer(parent_id.clone()))
            }
        }
    }

    /// Insert `node` under `parent` (root when `None`) at `index`, clamped to
    /// the end of the sequence.
    pub fn insert_node(&mut self, node: Node, parent: Option<&NodeId>, index: usize) -> TreeResult<()> {
        let mut seen = HashSet::new();
        for id in node.subtree_ids() {
            if self.contains(&id) || !seen.insert(id.clone()) {
                return Err(TreeError::DuplicateId(id));
            }
        }
        let siblings = self.sequence_mut(parent)?;
        let index = index.min(siblings.len());
        debug!(node = %node.id(), kind = node.kind(), index, "Inserting node");
        siblings.insert(index, node);
        Ok(())
    }

    /// Detach and return the subtree rooted at `id`
    pub fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        fn detach(nodes: &mut Vec<Node>, id: &NodeId) -> Option<Node> {
            if let Some(index) = nodes.iter().position(|node| node.id() == id) {
                return Some(nodes.remove(index));
            }
            nodes
                .iter_mut()
                .filter_map(Node::children_mut)
                .find_map(|children| detach(children, id))
        }
        let removed = detach(&mut self.roots, id);
        if let Some(node) = &removed {
            debug!(node = %id, subtree = node.subtree_len(), "Removed node");
        }
        removed
    }

    /// Relocate `id` under `target` (root when `None`) at `index`.
    ///
    /// The index refers to the target sequence after `id` has been detached.
    pub fn move_node(&mut self, id: &NodeId, target: Option<&NodeId>, index: usize) -> TreeResult<()> {
        if !self.contains(id) {
            return Err(TreeError::NodeNotFound(id.clone()));
        }
        if let Some(target_id) = target {
            if target_id == id {
                return Err(TreeError::SelfMove(id.clone()));
            }
            let target_node = self
                .get_node(target_id)
                .ok_or_else(|| TreeError::ParentNotFound(target_id.clone()))?;
            if !target_node.is_container() {
                return Err(TreeError::NotAContainer(target_id.clone()));
            }
            if self.is_descendant(id, target_id) {
                return Err(TreeError::CycleDetected {
                    node: id.clone(),
                    target: target_id.clone(),
                });
            }
        }

        let (origin_parent, origin_index) = self
            .position_of(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        let node = self
            .remove_node(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;

        match self.sequence_mut(target) {
            Ok(siblings) => {
                let index = index.min(siblings.len());
                siblings.insert(index, node);
                debug!(node = %id, index, "Moved node");
                Ok(())
            }
            Err(err) => {
                // Put it back where it was so the rejection leaves no trace.
                if let Ok(siblings) = self.sequence_mut(origin_parent.as_ref()) {
                    let index = origin_index.min(siblings.len());
                    siblings.insert(index, node);
                }
                Err(err)
            }
        }
    }

    /// Swap `id` with its neighbour in `direction`
    pub fn reorder_sibling(&mut self, id: &NodeId, direction: Direction) -> TreeResult<()> {
        let (parent, index) = self
            .position_of(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        let siblings = self.sequence_mut(parent.as_ref())?;
        let neighbour = index
            .checked_add_signed(direction.delta())
            .filter(|&n| n < siblings.len())
            .ok_or_else(|| TreeError::AtBoundary(id.clone()))?;
        siblings.swap(index, neighbour);
        debug!(node = %id, from = index, to = neighbour, "Reordered node");
        Ok(())
    }

    /// Depth-first pre-order visit of every node with its depth
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Node, usize),
    {
        fn go<F: FnMut(&Node, usize)>(nodes: &[Node], depth: usize, visit: &mut F) {
            for node in nodes {
                visit(node, depth);
                if let Some(children) = node.children() {
                    go(children, depth + 1, visit);
                }
            }
        }
        go(&self.roots, 0, &mut visit);
    }

    /// Depth-first visit of every container node, used for destination pickers
    pub fn each_container<F>(&self, mut visit: F)
    where
        F: FnMut(&Node, usize),
    {
        self.walk(|node, depth| {
            if node.is_container() {
                visit(node, depth);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Params;

    fn leaf() -> Node {
        Node::leaf("comment", Params::new())
    }

    fn group() -> Node {
        Node::container("group", Params::new())
    }

    fn root_ids(tree: &Tree) -> Vec<NodeId> {
        tree.roots().iter().map(|n| n.id().clone()).collect()
    }

    /// group(a, inner(b)), c
    fn sample() -> (Tree, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let outer = group();
        let outer_id = outer.id().clone();
        tree.insert_node(outer, None, 0).unwrap();

        let a = leaf();
        let a_id = a.id().clone();
        tree.insert_node(a, Some(&outer_id), 0).unwrap();

        let inner = group();
        let inner_id = inner.id().clone();
        tree.insert_node(inner, Some(&outer_id), 1).unwrap();

        let b = leaf();
        let b_id = b.id().clone();
        tree.insert_node(b, Some(&inner_id), 0).unwrap();

        let c = leaf();
        let c_id = c.id().clone();
        tree.insert_node(c, None, 1).unwrap();

        (tree, outer_id, a_id, inner_id, b_id, c_id)
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut tree = Tree::new();
        let first = leaf();
        let second = leaf();
        let (first_id, second_id) = (first.id().clone(), second.id().clone());
        tree.insert_node(first, None, 0).unwrap();
        tree.insert_node(second, None, 999).unwrap();
        assert_eq!(root_ids(&tree), vec![first_id, second_id]);
    }

    #[test]
    fn test_insert_into_leaf_is_rejected() {
        let (mut tree, _, a_id, ..) = sample();
        let before = tree.clone();
        let err = tree.insert_node(leaf(), Some(&a_id), 0).unwrap_err();
        assert_eq!(err, TreeError::NotAContainer(a_id));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_insert_into_missing_parent_is_rejected() {
        let (mut tree, ..) = sample();
        let missing = NodeId::new();
        let err = tree.insert_node(leaf(), Some(&missing), 0).unwrap_err();
        assert_eq!(err, TreeError::ParentNotFound(missing));
    }

    #[test]
    fn test_insert_duplicate_id_is_rejected() {
        let (mut tree, _, a_id, ..) = sample();
        let copy = tree.get_node(&a_id).unwrap().clone();
        assert_eq!(tree.insert_node(copy, None, 0), Err(TreeError::DuplicateId(a_id)));
    }

    #[test]
    fn test_insert_rejects_repeated_id_inside_subtree() {
        let mut tree = Tree::new();
        let twin = leaf();
        let twin_id = twin.id().clone();
        let mut outer = group();
        outer.children_mut().unwrap().extend([twin.clone(), twin]);

        assert_eq!(tree.insert_node(outer, None, 0), Err(TreeError::DuplicateId(twin_id)));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_get_parent() {
        let (tree, outer_id, a_id, inner_id, b_id, c_id) = sample();
        assert_eq!(tree.get_parent(&a_id).map(Node::id), Some(&outer_id));
        assert_eq!(tree.get_parent(&b_id).map(Node::id), Some(&inner_id));
        assert!(tree.get_parent(&c_id).is_none());
        assert!(tree.get_parent(&outer_id).is_none());
        assert!(tree.get_parent(&NodeId::new()).is_none());
    }

    #[test]
    fn test_is_descendant() {
        let (tree, outer_id, a_id, inner_id, b_id, c_id) = sample();
        assert!(tree.is_descendant(&outer_id, &a_id));
        assert!(tree.is_descendant(&outer_id, &b_id));
        assert!(tree.is_descendant(&inner_id, &b_id));
        assert!(!tree.is_descendant(&outer_id, &outer_id));
        assert!(!tree.is_descendant(&inner_id, &a_id));
        assert!(!tree.is_descendant(&c_id, &a_id));
    }

    #[test]
    fn test_remove_cascades() {
        let (mut tree, outer_id, a_id, inner_id, b_id, c_id) = sample();
        let removed = tree.remove_node(&outer_id).unwrap();
        assert_eq!(removed.subtree_len(), 4);
        for id in [&outer_id, &a_id, &inner_id, &b_id] {
            assert!(tree.get_node(id).is_none());
        }
        assert_eq!(root_ids(&tree), vec![c_id]);
        assert!(tree.remove_node(&outer_id).is_none());
    }

    #[test]
    fn test_move_into_container() {
        let (mut tree, outer_id, a_id, inner_id, b_id, c_id) = sample();
        tree.move_node(&c_id, Some(&inner_id), 0).unwrap();
        assert_eq!(tree.get_parent(&c_id).map(Node::id), Some(&inner_id));
        let inner = tree.get_node(&inner_id).unwrap();
        let order: Vec<_> = inner.children().unwrap().iter().map(|n| n.id().clone()).collect();
        assert_eq!(order, vec![c_id, b_id]);
        assert_eq!(root_ids(&tree), vec![outer_id]);
        assert!(tree.contains(&a_id));
    }

    #[test]
    fn test_move_to_root() {
        let (mut tree, outer_id, _, _, b_id, c_id) = sample();
        tree.move_node(&b_id, None, 1).unwrap();
        assert_eq!(root_ids(&tree), vec![outer_id, b_id, c_id]);
    }

    #[test]
    fn test_move_into_self_is_rejected() {
        let (mut tree, outer_id, ..) = sample();
        let before = tree.clone();
        let err = tree.move_node(&outer_id, Some(&outer_id), 0).unwrap_err();
        assert_eq!(err, TreeError::SelfMove(outer_id));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_move_into_descendant_is_rejected() {
        let (mut tree, outer_id, _, inner_id, ..) = sample();
        let before = tree.clone();
        let err = tree.move_node(&outer_id, Some(&inner_id), 0).unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_move_into_leaf_is_rejected() {
        let (mut tree, _, a_id, _, b_id, _) = sample();
        let before = tree.clone();
        assert_eq!(tree.move_node(&b_id, Some(&a_id), 0), Err(TreeError::NotAContainer(a_id)));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_move_unknown_node() {
        let (mut tree, ..) = sample();
        let missing = NodeId::new();
        assert_eq!(tree.move_node(&missing, None, 0), Err(TreeError::NodeNotFound(missing)));
    }

    #[test]
    fn test_reorder_sibling() {
        let (mut tree, outer_id, _, _, _, c_id) = sample();
        tree.reorder_sibling(&c_id, Direction::Up).unwrap();
        assert_eq!(root_ids(&tree), vec![c_id.clone(), outer_id.clone()]);
        assert_eq!(tree.reorder_sibling(&c_id, Direction::Up), Err(TreeError::AtBoundary(c_id.clone())));
        tree.reorder_sibling(&c_id, Direction::Down).unwrap();
        assert_eq!(tree.reorder_sibling(&c_id, Direction::Down), Err(TreeError::AtBoundary(c_id.clone())));
        assert_eq!(root_ids(&tree), vec![outer_id, c_id]);
    }

    #[test]
    fn test_reorder_nested() {
        let (mut tree, outer_id, a_id, inner_id, ..) = sample();
        tree.reorder_sibling(&a_id, Direction::Down).unwrap();
        let outer = tree.get_node(&outer_id).unwrap();
        let order: Vec<_> = outer.children().unwrap().iter().map(|n| n.id().clone()).collect();
        assert_eq!(order, vec![inner_id, a_id]);
    }

    #[test]
    fn test_each_container_and_counts() {
        let (tree, outer_id, _, inner_id, ..) = sample();
        let mut seen = Vec::new();
        tree.each_container(|node, depth| seen.push((node.id().clone(), depth)));
        assert_eq!(seen, vec![(outer_id, 0), (inner_id, 1)]);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.operation_count(), 3);
    }

    #[test]
    fn test_position_of() {
        let (tree, _, _, inner_id, b_id, c_id) = sample();
        assert_eq!(tree.position_of(&c_id), Some((None, 1)));
        assert_eq!(tree.position_of(&b_id), Some((Some(inner_id), 0)));
        assert_eq!(tree.position_of(&NodeId::new()), None);
    }
}
