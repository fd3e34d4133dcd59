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

//! Routine file persistence

use anyhow::{Context, Result};
use probekit_core::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON snapshot of the routine on disk
#[derive(Debug, Clone)]
pub struct RoutineStore {
    path: PathBuf,
}

impl RoutineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the routine, or an empty one if the file does not exist yet
    pub fn load(&self) -> Result<Document> {
        if !self.exists() {
            debug!(path = %self.path.display(), "No routine file, starting empty");
            return Ok(Document::new());
        }
        let json = fs::read_to_string(&self.path).with_context(|| format!("reading routine {}", self.path.display()))?;
        Document::import_json(&json).with_context(|| format!("loading routine {}", self.path.display()))
    }

    /// Write through a temp file and rename so readers never see a partial routine
    pub fn save(&self, document: &Document) -> Result<()> {
        let json = document.export_json()?;
        write_atomic(&self.path, &json)?;
        debug!(path = %self.path.display(), nodes = document.node_count(), "Saved routine");
        Ok(())
    }
}

pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&tmp, contents).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))
}
