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

//! Probekit core
//!
//! Hierarchical probing routines and their translation to NC program text.
//!
//! - `node`: operation instances and their parameters
//! - `tree`: the ordered forest and its structural mutations
//! - `catalog`: tool kinds, defaults and emission callbacks
//! - `codegen`: context-carrying recursive program emission
//! - `document`: editing surface with per-node view state
//! - `snapshot`: JSON persistence of documents

pub mod catalog;
pub mod codegen;
pub mod document;
pub mod error;
pub mod node;
pub mod snapshot;
pub mod tree;

pub use catalog::{Catalog, EmitFn, ToolDefinition};
pub use codegen::{Chunk, EmitConfig, EmitContext, LabelAllocator, ProgramGenerator};
pub use document::{Destination, Document, ViewState};
pub use error::{CatalogError, DocumentError, SnapshotError, TreeError};
pub use node::{Node, NodeId, ParamValue, Params};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};
pub use tree::{Direction, Tree};
