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

//! Persisted routine snapshots
//!
//! A snapshot is the serializable form of a [`Document`]: the forest plus the
//! editor view state. Where it is stored is up to the caller.

use crate::document::{Document, ViewState};
use crate::error::{SnapshotError, SnapshotResult};
use crate::node::{Node, NodeId};
use crate::tree::Tree;
use serde::{Deserialize, Serialize};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Serializable document state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collapsed: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub editing: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
    #[serde(default)]
    pub show_code: bool,
}

impl Snapshot {
    /// Capture the current state of `document`
    pub fn capture(document: &Document) -> Self {
        let view = document.view();
        Self {
            version: SNAPSHOT_VERSION,
            nodes: document.tree().roots().to_vec(),
            collapsed: view.collapsed.iter().cloned().collect(),
            editing: view.editing.iter().cloned().collect(),
            target: view.target.clone(),
            show_code: view.show_code,
        }
    }

    /// Rebuild a document, checking id uniqueness and dropping stale view entries
    pub fn restore(self) -> SnapshotResult<Document> {
        if self.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        let tree = Tree::from_roots(self.nodes)?;
        let view = ViewState {
            collapsed: self.collapsed.into_iter().collect(),
            editing: self.editing.into_iter().collect(),
            target: self.target,
            show_code: self.show_code,
        };
        Ok(Document::from_parts(tree, view))
    }

    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Document {
    /// Serialize the document as a JSON snapshot
    pub fn export_json(&self) -> SnapshotResult<String> {
        Snapshot::capture(self).to_json()
    }

    /// Load a document from a JSON snapshot
    pub fn import_json(json: &str) -> SnapshotResult<Self> {
        Snapshot::from_json(json)?.restore()
    }
}
