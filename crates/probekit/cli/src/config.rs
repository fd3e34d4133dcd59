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

use anyhow::{Context, Result, anyhow};
use probekit_core::EmitConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbekitConfig {
    /// Routine snapshot edited by every command
    pub routine: PathBuf,
    pub emit: EmitConfig,
}

impl Default for ProbekitConfig {
    fn default() -> Self {
        Self {
            routine: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("probekit")
                .join("routine.json"),
            emit: EmitConfig::default(),
        }
    }
}

impl ProbekitConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn resolve_config(cli_config: Option<PathBuf>, cli_routine: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)?
        } else if let Ok(env_config) = std::env::var("PROBEKIT_CONFIG") {
            Self::load_from_file(env_config)?
        } else {
            Self::default()
        };

        // CLI routine overrides environment settings
        if let Some(routine) = cli_routine {
            config.routine = routine;
        } else if let Ok(env_routine) = std::env::var("PROBEKIT_ROUTINE") {
            config.routine = PathBuf::from(env_routine);
        }

        config.emit.validate().map_err(|msg| anyhow!("invalid [emit] configuration: {msg}"))?;
        Ok(config)
    }
}
