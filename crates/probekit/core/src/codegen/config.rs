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

//! Configuration for program generation

use super::context::{EmitContext, LabelAllocator, MAX_LABEL};
use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};

/// Configuration for program generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Whitespace written once per nesting level
    pub indent: String,

    /// First label handed out by conditionals
    pub label_seed: u32,

    /// Program number written in the `O` word of the default header
    pub program_number: u32,

    /// Program title written as a comment in the default header
    pub program_name: String,

    /// Replaces the default header block when set
    pub header: Option<Vec<String>>,

    /// Replaces the default footer block when set
    pub footer: Option<Vec<String>>,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            label_seed: 1000,
            program_number: 1000,
            program_name: "PROBE ROUTINE".to_string(),
            header: None,
            footer: None,
        }
    }
}

impl EmitConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.indent.chars().all(char::is_whitespace) {
            return Err("Indent must only contain whitespace".to_string());
        }

        if !(1..=MAX_LABEL).contains(&self.label_seed) {
            return Err(format!("Label seed must be between 1 and {MAX_LABEL}"));
        }

        if self.program_number > 9999 {
            return Err("Program number must be between 0 and 9999".to_string());
        }

        if self.program_name.contains(['(', ')']) {
            return Err("Program name must not contain parentheses".to_string());
        }

        Ok(())
    }

    /// Lines written before the routine body
    pub fn header_lines(&self) -> Vec<String> {
        match &self.header {
            Some(lines) => lines.clone(),
            None => vec![
                "%".to_string(),
                format!("O{:04} ({})", self.program_number, self.program_name),
                "G17 G21 G40 G49 G80 G90".to_string(),
                "G91 G28 Z0".to_string(),
                "G90".to_string(),
            ],
        }
    }

    /// Lines written after the routine body
    pub fn footer_lines(&self) -> Vec<String> {
        match &self.footer {
            Some(lines) => lines.clone(),
            None => vec!["G91 G28 Z0".to_string(), "G90".to_string(), "M30".to_string(), "%".to_string()],
        }
    }

    /// Root context for one generation pass
    pub fn context<'a>(&'a self, catalog: &'a Catalog, labels: &'a LabelAllocator) -> EmitContext<'a> {
        EmitContext::new(catalog, labels, &self.indent)
    }
}
