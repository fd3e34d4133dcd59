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

//! Program text generation
//!
//! - `config`: header, footer, indentation and label seed
//! - `context`: per-position emission state threaded through the recursion
//! - `emitter`: node and program emission

pub mod config;
pub mod context;
pub mod emitter;

pub use config::EmitConfig;
pub use context::{Chunk, EmitContext, LabelAllocator, MAX_LABEL, MAX_LOOP_INDEX};
pub use emitter::{ProgramGenerator, emit, emit_children};
