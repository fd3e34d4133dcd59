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

//! Error types for routine editing, catalog registration and persistence

use crate::node::NodeId;
use thiserror::Error;

/// Rejected structural mutations on the operation tree.
///
/// Every variant leaves the tree exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("Node {0} is not a container")]
    NotAContainer(NodeId),

    #[error("Node {0} cannot be moved into itself")]
    SelfMove(NodeId),

    #[error("Node {node} cannot be moved under its descendant {target}")]
    CycleDetected { node: NodeId, target: NodeId },

    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("Node {0} is already at the boundary of its siblings")]
    AtBoundary(NodeId),
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors raised while building a tool catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Tool kind already registered: {0}")]
    DuplicateKind(String),

    #[error("Tool kind key must not be empty")]
    EmptyKind,

    #[error("Tool kind {kind} declares choices for unknown parameter {param}")]
    UnknownChoiceParam { kind: String, param: String },
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised by the document mutation surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Unknown tool kind: {0}")]
    UnknownKind(String),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors raised while exporting or importing a routine snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Invalid routine tree: {0}")]
    InvalidTree(#[from] TreeError),
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
