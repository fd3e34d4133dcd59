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

use super::{CommandContext, confirm};
use crate::storage::write_atomic;
use anyhow::{Context, Result};
use probekit_core::Document;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::warn;

pub fn generate(ctx: &CommandContext, output: Option<&Path>) -> Result<()> {
    let doc = ctx.store.load()?;
    let program = doc.generate(&ctx.catalog, &ctx.config.emit);
    match output {
        Some(path) => {
            write_atomic(path, &format!("{program}\n"))?;
            println!("Wrote {} operations to {}", doc.operation_count(), path.display());
        }
        None => println!("{program}"),
    }
    Ok(())
}

pub fn export(ctx: &CommandContext, path: Option<&Path>) -> Result<()> {
    let doc = ctx.store.load()?;
    let json = doc.export_json()?;
    match path {
        Some(path) => {
            write_atomic(path, &json)?;
            println!("Exported routine to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn import(ctx: &CommandContext, path: &Path, yes: bool) -> Result<()> {
    let stdin = io::stdin();
    import_with(ctx, path, yes, &mut stdin.lock(), &mut io::stdout())
}

pub(crate) fn import_with(
    ctx: &CommandContext,
    path: &Path,
    yes: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<()> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc = Document::import_json(&json).with_context(|| format!("importing {}", path.display()))?;

    if !yes && ctx.store.exists() {
        let prompt = match ctx.store.load() {
            Ok(current) if current.node_count() == 0 => None,
            Ok(current) => Some(format!("Replace the current routine ({} nodes)?", current.node_count())),
            Err(err) => {
                warn!("Current routine is unreadable: {:#}", err);
                Some("Current routine cannot be read. Replace it?".to_string())
            }
        };
        if let Some(prompt) = prompt {
            if !confirm(&prompt, input, output)? {
                writeln!(output, "Cancelled")?;
                return Ok(());
            }
        }
    }

    ctx.store.save(&doc)?;
    writeln!(output, "Imported {} nodes from {}", doc.node_count(), path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbekitConfig;
    use probekit_core::{Catalog, Destination};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> CommandContext {
        CommandContext::new(ProbekitConfig {
            routine: dir.path().join("routine.json"),
            ..ProbekitConfig::default()
        })
    }

    fn sample() -> Document {
        let catalog = Catalog::builtin();
        let mut doc = Document::new();
        let group = doc.add(&catalog, "group", &Destination::Root).unwrap();
        doc.add(&catalog, "bore", &Destination::Node(group)).unwrap();
        doc
    }

    #[test]
    fn test_generate_to_file() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        ctx.config.emit.header = Some(Vec::new());
        ctx.config.emit.footer = Some(Vec::new());
        ctx.store.save(&sample()).unwrap();

        let out = dir.path().join("out").join("O1000.nc");
        generate(&ctx, Some(&out)).unwrap();
        let program = fs::read_to_string(&out).unwrap();
        assert_eq!(
            program,
            "( ===== SETUP A ===== )\n  G65 P9814 D20 S54\n( ===== END SETUP A ===== )\n"
        );
    }

    #[test]
    fn test_import_replaces_after_confirmation() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        ctx.store.save(&sample()).unwrap();

        let incoming = dir.path().join("incoming.json");
        let mut replacement = Document::new();
        replacement.add(&ctx.catalog, "probe_on", &Destination::Root).unwrap();
        fs::write(&incoming, replacement.export_json().unwrap()).unwrap();

        let mut out = Vec::new();
        import_with(&ctx, &incoming, false, &mut Cursor::new("no\n"), &mut out).unwrap();
        assert_eq!(ctx.store.load().unwrap().node_count(), 2);

        let mut out = Vec::new();
        import_with(&ctx, &incoming, false, &mut Cursor::new("y\n"), &mut out).unwrap();
        assert_eq!(ctx.store.load().unwrap(), replacement);
    }

    #[test]
    fn test_import_recovers_unreadable_routine() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        fs::write(ctx.store.path(), "{ truncated").unwrap();

        let incoming = dir.path().join("good.json");
        let doc = sample();
        fs::write(&incoming, doc.export_json().unwrap()).unwrap();

        let mut out = Vec::new();
        import_with(&ctx, &incoming, false, &mut Cursor::new("n\n"), &mut out).unwrap();
        assert!(ctx.store.load().is_err());
        assert!(String::from_utf8(out).unwrap().contains("cannot be read"));

        let mut out = Vec::new();
        import_with(&ctx, &incoming, false, &mut Cursor::new("y\n"), &mut out).unwrap();
        assert_eq!(ctx.store.load().unwrap(), doc);
    }

    #[test]
    fn test_invalid_import_keeps_current_routine() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let doc = sample();
        ctx.store.save(&doc).unwrap();

        let incoming = dir.path().join("broken.json");
        fs::write(&incoming, r#"{ "version": 42 }"#).unwrap();
        let mut out = Vec::new();
        assert!(import_with(&ctx, &incoming, true, &mut Cursor::new(""), &mut out).is_err());
        assert_eq!(ctx.store.load().unwrap(), doc);
    }

    #[test]
    fn test_export_to_file_round_trips() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let doc = sample();
        ctx.store.save(&doc).unwrap();

        let path = dir.path().join("copy.json");
        export(&ctx, Some(&path)).unwrap();
        let json = fs::read_to_string(&path).unwrap();
        assert_eq!(Document::import_json(&json).unwrap(), doc);
    }
}
