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

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod storage;

use crate::commands::CommandContext;
use crate::config::ProbekitConfig;
use anyhow::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Command-line editor for probing routines
#[derive(Parser, Debug)]
#[command(name = "probekit", about = "Compose probing routines and generate NC programs")]
pub struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Routine file location (overrides $PROBEKIT_ROUTINE)
    #[arg(long, global = true)]
    pub routine: Option<PathBuf>,

    /// Log mutations and generation details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Sibling direction for `reorder`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

/// Top-level commands for probekit
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty routine file
    Init {
        /// Overwrite an existing routine
        #[arg(long)]
        force: bool,
    },

    /// List the available tool kinds
    Catalog,

    /// Add an operation
    Add {
        /// Tool kind, see `probekit catalog`
        kind: String,

        /// Container to insert into (id or unique id prefix)
        #[arg(long, conflicts_with = "root")]
        parent: Option<String>,

        /// Insert at root even when an insertion target is set
        #[arg(long)]
        root: bool,

        /// Position among the siblings, clamped to the end
        #[arg(long)]
        index: Option<usize>,

        /// Parameter override
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Update parameters of an operation
    Set {
        node: String,

        #[arg(required = true, value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Move an operation (and its children) to another container or to root
    Move {
        node: String,

        /// Destination container, root when omitted
        #[arg(long)]
        into: Option<String>,

        /// Position among the new siblings, clamped to the end
        #[arg(long)]
        index: Option<usize>,
    },

    /// Delete an operation and everything nested in it
    Remove {
        node: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Swap an operation with its neighbour
    Reorder {
        node: String,

        #[arg(value_enum)]
        direction: ReorderDirection,
    },

    /// Copy an operation with fresh ids, right after the original
    Duplicate { node: String },

    /// Set or clear the default insertion target
    Target {
        /// Container to add into by default
        #[arg(required_unless_present = "clear")]
        node: Option<String>,

        #[arg(long, conflicts_with = "node")]
        clear: bool,
    },

    /// Collapse or expand a container in the outline
    Collapse { node: String },

    /// Toggle the full parameter listing of an operation in the outline
    Edit { node: String },

    /// Print the routine outline
    Show {
        /// Also print the generated program
        #[arg(long)]
        code: bool,

        /// Keep the `--code` choice for later `show` calls
        #[arg(long)]
        remember: bool,
    },

    /// List containers, optionally only those a node may move into
    Containers {
        #[arg(long, value_name = "NODE")]
        movable: Option<String>,
    },

    /// Generate the NC program
    Generate {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the routine snapshot as JSON
    Export {
        /// Destination file, stdout when omitted
        path: Option<PathBuf>,
    },

    /// Replace the routine with a JSON snapshot
    Import {
        path: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config = ProbekitConfig::resolve_config(cli.config, cli.routine)?;

    // Create command context
    let ctx = CommandContext::new(config);

    // Dispatch commands
    match cli.command {
        Commands::Init { force } => commands::routine::init(&ctx, force),
        Commands::Catalog => commands::outline::list_catalog(&ctx),
        Commands::Add { kind, parent, root, index, params } => {
            commands::routine::add(&ctx, &kind, parent.as_deref(), root, index, &params)
        }
        Commands::Set { node, params } => commands::routine::set(&ctx, &node, &params),
        Commands::Move { node, into, index } => commands::routine::move_node(&ctx, &node, into.as_deref(), index),
        Commands::Remove { node, yes } => commands::routine::remove(&ctx, &node, yes),
        Commands::Reorder { node, direction } => commands::routine::reorder(&ctx, &node, direction),
        Commands::Duplicate { node } => commands::routine::duplicate(&ctx, &node),
        Commands::Target { node, clear: _ } => commands::routine::target(&ctx, node.as_deref()),
        Commands::Collapse { node } => commands::routine::collapse(&ctx, &node),
        Commands::Edit { node } => commands::routine::edit(&ctx, &node),
        Commands::Show { code, remember } => commands::outline::show(&ctx, code, remember),
        Commands::Containers { movable } => commands::outline::containers(&ctx, movable.as_deref()),
        Commands::Generate { output } => commands::program::generate(&ctx, output.as_deref()),
        Commands::Export { path } => commands::program::export(&ctx, path.as_deref()),
        Commands::Import { path, yes } => commands::program::import(&ctx, &path, yes),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
