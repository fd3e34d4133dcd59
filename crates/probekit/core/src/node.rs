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

//! Operation nodes
//!
//! A routine is a forest of [`Node`]s. Each node is one instance of a catalog
//! tool kind carrying its own parameters. Whether a node owns children is
//! decided once, when it is created from its catalog definition, and is
//! encoded in the variant rather than looked up again later.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Node identifier using UUID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Generate a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a node ID from a string representation
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the UUID value
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A single parameter value.
///
/// Values are never validated; whatever the operator typed ends up in the
/// emitted program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Empty,
}

impl ParamValue {
    /// Interpret raw operator input: blank is empty, text that a number prints
    /// back to unchanged is a number, anything else is kept verbatim as text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && n.to_string() == trimmed => Self::Number(n),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            Self::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Empty => Ok(()),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Parameter name to value mapping
pub type Params = BTreeMap<String, ParamValue>;

/// One operation instance in a routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase", deny_unknown_fields)]
pub enum Node {
    Leaf {
        id: NodeId,
        kind: String,
        #[serde(default)]
        params: Params,
    },
    Container {
        id: NodeId,
        kind: String,
        #[serde(default)]
        params: Params,
        #[serde(default)]
        children: Vec<Node>,
    },
}

impl Node {
    /// Create a leaf node with a fresh id
    pub fn leaf(kind: impl Into<String>, params: Params) -> Self {
        Self::Leaf {
            id: NodeId::new(),
            kind: kind.into(),
            params,
        }
    }

    /// Create an empty container node with a fresh id
    pub fn container(kind: impl Into<String>, params: Params) -> Self {
        Self::Container {
            id: NodeId::new(),
            kind: kind.into(),
            params,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        match self {
            Self::Leaf { id, .. } | Self::Container { id, .. } => id,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Leaf { kind, .. } | Self::Container { kind, .. } => kind,
        }
    }

    pub fn params(&self) -> &Params {
        match self {
            Self::Leaf { params, .. } | Self::Container { params, .. } => params,
        }
    }

    pub fn params_mut(&mut self) -> &mut Params {
        match self {
            Self::Leaf { params, .. } | Self::Container { params, .. } => params,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container { .. })
    }

    /// Children of a container, `None` for leaves
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Self::Container { children, .. } => Some(children),
            Self::Leaf { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Container { children, .. } => Some(children),
            Self::Leaf { .. } => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params().get(name)
    }

    /// Parameter rendered as text, empty when missing
    pub fn text(&self, name: &str) -> String {
        self.param(name).map(ToString::to_string).unwrap_or_default()
    }

    /// Shallow-merge a parameter patch. Structure is never touched.
    pub fn merge_params(&mut self, patch: Params) {
        self.params_mut().extend(patch);
    }

    /// Number of nodes in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(Node::subtree_len).sum())
            .unwrap_or(0)
    }

    /// Ids of every node in this subtree, pre-order
    pub fn subtree_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.subtree_len());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<NodeId>) {
        ids.push(self.id().clone());
        if let Some(children) = self.children() {
            for child in children {
                child.collect_ids(ids);
            }
        }
    }

    /// Search this subtree, `self` included
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        if self.id() == id {
            return Some(self);
        }
        self.children()?.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        if self.id() == id {
            return Some(self);
        }
        self.children_mut()?.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Deep copy of this subtree where every node gets a fresh id
    pub fn clone_with_fresh_ids(&self) -> Node {
        match self {
            Self::Leaf { kind, params, .. } => Self::Leaf {
                id: NodeId::new(),
                kind: kind.clone(),
                params: params.clone(),
            },
            Self::Container { kind, params, children, .. } => Self::Container {
                id: NodeId::new(),
                kind: kind.clone(),
                params: params.clone(),
                children: children.iter().map(Node::clone_with_fresh_ids).collect(),
            },
        }
    }
}
