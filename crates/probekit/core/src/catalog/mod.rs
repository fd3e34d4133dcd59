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

//! Tool catalog
//!
//! The catalog declares every operation kind a routine may contain: its
//! display metadata, whether it owns children, its default parameters and the
//! function that turns one instance into program text. Adding a kind means
//! registering a [`ToolDefinition`]; nothing else in the crate changes.

pub mod builtin;

use crate::codegen::{Chunk, EmitContext};
use crate::error::{CatalogError, CatalogResult};
use crate::node::{Node, ParamValue, Params};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Emission callback for one tool kind.
///
/// Containers are expected to call [`EmitContext::children`] themselves, at
/// the point where the nested code belongs.
pub type EmitFn = fn(&ToolDefinition, &Node, &EmitContext<'_>) -> Vec<Chunk>;

/// Definition of one operation kind
#[derive(Clone)]
pub struct ToolDefinition {
    /// Stable key stored on nodes
    pub key: String,
    /// Human readable name
    pub name: String,
    pub description: String,
    /// Whether instances own an ordered list of children
    pub container: bool,
    /// Parameters cloned into every new instance
    pub defaults: Params,
    /// Legal values for enumerated parameters, offered to editors only
    pub choices: BTreeMap<String, Vec<String>>,
    pub emit: EmitFn,
}

impl ToolDefinition {
    /// Define a kind without children
    pub fn leaf(key: impl Into<String>, name: impl Into<String>, emit: EmitFn) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: String::new(),
            container: false,
            defaults: Params::new(),
            choices: BTreeMap::new(),
            emit,
        }
    }

    /// Define a kind that owns children
    pub fn container(key: impl Into<String>, name: impl Into<String>, emit: EmitFn) -> Self {
        Self {
            container: true,
            ..Self::leaf(key, name, emit)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Declare a parameter with no default value
    pub fn with_empty_param(mut self, name: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), ParamValue::Empty);
        self
    }

    pub fn with_choices(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.choices
            .insert(name.into(), values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// New node of this kind under a fresh id, with cloned defaults and the
    /// shape fixed by the container flag.
    pub fn instantiate(&self) -> Node {
        if self.container {
            Node::container(&self.key, self.defaults.clone())
        } else {
            Node::leaf(&self.key, self.defaults.clone())
        }
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("container", &self.container)
            .field("defaults", &self.defaults)
            .field("choices", &self.choices)
            .finish_non_exhaustive()
    }
}

/// Registry of tool definitions, kept in registration order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in probing, control-flow and utility kinds
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for tool in builtin::definitions() {
            if let Err(err) = catalog.register(tool) {
                tracing::error!("Invalid built-in tool definition: {}", err);
            }
        }
        catalog
    }

    /// Register a new kind
    pub fn register(&mut self, tool: ToolDefinition) -> CatalogResult<()> {
        if tool.key.is_empty() {
            return Err(CatalogError::EmptyKind);
        }
        if self.index.contains_key(&tool.key) {
            return Err(CatalogError::DuplicateKind(tool.key));
        }
        if let Some(param) = tool.choices.keys().find(|p| !tool.defaults.contains_key(*p)) {
            return Err(CatalogError::UnknownChoiceParam {
                kind: tool.key.clone(),
                param: param.clone(),
            });
        }
        self.index.insert(tool.key.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ToolDefinition> {
        self.index.get(key).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// New node of kind `key`, `None` when the kind is unknown
    pub fn instantiate(&self, key: &str) -> Option<Node> {
        self.get(key).map(ToolDefinition::instantiate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
