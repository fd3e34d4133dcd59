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

use super::{CommandContext, confirm, parse_assignments, resolve_node, short_id};
use crate::ReorderDirection;
use anyhow::{Result, bail};
use probekit_core::{Destination, Direction, Document, Node};
use std::io::{self, BufRead, Write};

pub fn init(ctx: &CommandContext, force: bool) -> Result<()> {
    if ctx.store.exists() && !force {
        bail!("routine {} already exists (use --force to replace it)", ctx.store.path().display());
    }
    ctx.store.save(&Document::new())?;
    println!("Initialized empty routine at {}", ctx.store.path().display());
    Ok(())
}

pub fn add(
    ctx: &CommandContext,
    kind: &str,
    parent: Option<&str>,
    root: bool,
    index: Option<usize>,
    params: &[String],
) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let patch = parse_assignments(params)?;

    let destination = match parent {
        Some(raw) => Destination::Node(resolve_node(&doc, raw)?),
        None if root => Destination::Root,
        None => Destination::Target,
    };
    let id = doc.add_at(&ctx.catalog, kind, &destination, index.unwrap_or(usize::MAX))?;
    if !patch.is_empty() {
        doc.update_params(&id, patch)?;
    }
    ctx.store.save(&doc)?;

    let name = ctx.catalog.get(kind).map(|tool| tool.name.as_str()).unwrap_or(kind);
    println!("Added {} {}", name, id);
    Ok(())
}

pub fn set(ctx: &CommandContext, node: &str, params: &[String]) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let id = resolve_node(&doc, node)?;
    let patch = parse_assignments(params)?;

    // Unknown keys and off-list choices are accepted with a note
    if let Some(current) = doc.get_node(&id) {
        if let Some(tool) = ctx.catalog.get(current.kind()) {
            for (key, value) in &patch {
                if !current.params().contains_key(key) {
                    println!("Note: {} has no parameter {:?}, adding it", tool.name, key);
                }
                let text = value.to_string();
                if let Some(choices) = tool.choices.get(key).filter(|choices| !choices.contains(&text)) {
                    println!("Note: {} is not one of {}", text, choices.join(" "));
                }
            }
        }
    }

    doc.update_params(&id, patch)?;
    ctx.store.save(&doc)?;
    println!("Updated {}", short_id(&id));
    Ok(())
}

pub fn move_node(ctx: &CommandContext, node: &str, into: Option<&str>, index: Option<usize>) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let id = resolve_node(&doc, node)?;
    let destination = match into {
        Some(raw) => Destination::Node(resolve_node(&doc, raw)?),
        None => Destination::Root,
    };
    doc.move_node(&id, &destination, index.unwrap_or(usize::MAX))?;
    ctx.store.save(&doc)?;
    println!("Moved {}", short_id(&id));
    Ok(())
}

pub fn remove(ctx: &CommandContext, node: &str, yes: bool) -> Result<()> {
    let stdin = io::stdin();
    remove_with(ctx, node, yes, &mut stdin.lock(), &mut io::stdout())
}

pub(crate) fn remove_with(
    ctx: &CommandContext,
    node: &str,
    yes: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let id = resolve_node(&doc, node)?;

    if !yes {
        let Some(target) = doc.get_node(&id) else {
            bail!("no node with id {id}");
        };
        let nested = target.subtree_len() - 1;
        let prompt = match nested {
            0 => format!("Remove {} {}?", target.kind(), short_id(&id)),
            n => format!("Remove {} {} and {} nested operation(s)?", target.kind(), short_id(&id), n),
        };
        if !confirm(&prompt, input, output)? {
            writeln!(output, "Cancelled")?;
            return Ok(());
        }
    }

    match doc.remove(&id) {
        Some(removed) => {
            ctx.store.save(&doc)?;
            writeln!(output, "Removed {} node(s)", removed.subtree_len())?;
        }
        None => writeln!(output, "Node {} not found.", id)?,
    }
    Ok(())
}

pub fn reorder(ctx: &CommandContext, node: &str, direction: ReorderDirection) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let id = resolve_node(&doc, node)?;
    let (direction, label) = match direction {
        ReorderDirection::Up => (Direction::Up, "up"),
        ReorderDirection::Down => (Direction::Down, "down"),
    };
    doc.reorder(&id, direction)?;
    ctx.store.save(&doc)?;
    println!("Moved {} {}", short_id(&id), label);
    Ok(())
}

pub fn duplicate(ctx: &CommandContext, node: &str) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let id = resolve_node(&doc, node)?;
    let copy = doc.duplicate(&id)?;
    ctx.store.save(&doc)?;
    println!("Duplicated {} as {}", short_id(&id), copy);
    Ok(())
}

pub fn target(ctx: &CommandContext, node: Option<&str>) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let id = node.map(|raw| resolve_node(&doc, raw)).transpose()?;
    doc.set_target(id.clone())?;
    ctx.store.save(&doc)?;
    match id.as_ref().and_then(|id| doc.get_node(id)) {
        Some(node) => println!("New operations go into {} {}", node_title(ctx, node), short_id(node.id())),
        None => println!("New operations go to the routine root"),
    }
    Ok(())
}

pub fn collapse(ctx: &CommandContext, node: &str) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let id = resolve_node(&doc, node)?;
    let collapsed = doc.toggle_collapsed(&id)?;
    ctx.store.save(&doc)?;
    println!("{} {}", if collapsed { "Collapsed" } else { "Expanded" }, short_id(&id));
    Ok(())
}

pub fn edit(ctx: &CommandContext, node: &str) -> Result<()> {
    let mut doc = ctx.store.load()?;
    let id = resolve_node(&doc, node)?;
    let editing = doc.toggle_editing(&id)?;
    ctx.store.save(&doc)?;
    println!("{} parameters of {}", if editing { "Listing" } else { "Folded" }, short_id(&id));
    Ok(())
}

/// Display name of a node: the group title when it has one, else the tool name
pub fn node_title(ctx: &CommandContext, node: &Node) -> String {
    let tool_name = ctx.catalog.get(node.kind()).map(|tool| tool.name.clone());
    match node.param("name").filter(|value| !value.is_empty()) {
        Some(name) if node.is_container() => name.to_string(),
        _ => tool_name.unwrap_or_else(|| node.kind().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbekitConfig;
    use probekit_core::{DocumentError, ParamValue, TreeError};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> CommandContext {
        let config = ProbekitConfig {
            routine: dir.path().join("routine.json"),
            ..ProbekitConfig::default()
        };
        CommandContext::new(config)
    }

    fn root_ids(ctx: &CommandContext) -> Vec<String> {
        let doc = ctx.store.load().unwrap();
        doc.tree().roots().iter().map(|n| n.id().to_string()).collect()
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        init(&ctx, false).unwrap();
        assert!(init(&ctx, false).is_err());
        init(&ctx, true).unwrap();
    }

    #[test]
    fn test_add_uses_target_unless_root_requested() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        add(&ctx, "group", None, false, None, &[]).unwrap();
        let group = root_ids(&ctx).remove(0);
        target(&ctx, Some(&group)).unwrap();

        add(&ctx, "bore", None, false, None, &["d=32".to_string()]).unwrap();
        add(&ctx, "comment", None, true, Some(0), &[]).unwrap();

        let doc = ctx.store.load().unwrap();
        let roots = doc.tree().roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].kind(), "comment");
        let bore = &roots[1].children().unwrap()[0];
        assert_eq!(bore.param("d"), Some(&ParamValue::Number(32.0)));
    }

    #[test]
    fn test_add_unknown_kind_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let err = add(&ctx, "laser", None, true, None, &[]).unwrap_err();
        assert_eq!(err.downcast_ref::<DocumentError>(), Some(&DocumentError::UnknownKind("laser".into())));
        assert!(!ctx.store.exists());
    }

    #[test]
    fn test_move_into_descendant_is_reported() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        add(&ctx, "group", None, true, None, &[]).unwrap();
        let outer = root_ids(&ctx).remove(0);
        add(&ctx, "while", Some(&outer), false, None, &[]).unwrap();
        let doc = ctx.store.load().unwrap();
        let inner = doc.tree().roots()[0].children().unwrap()[0].id().to_string();

        let err = move_node(&ctx, &outer, Some(&inner), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocumentError>(),
            Some(DocumentError::Tree(TreeError::CycleDetected { .. }))
        ));

        move_node(&ctx, &inner, None, Some(0)).unwrap();
        assert_eq!(root_ids(&ctx), vec![inner, outer]);
    }

    #[test]
    fn test_remove_asks_first() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        add(&ctx, "group", None, true, None, &[]).unwrap();
        let group = root_ids(&ctx).remove(0);
        add(&ctx, "bore", Some(&group), false, None, &[]).unwrap();

        let mut out = Vec::new();
        remove_with(&ctx, &group, false, &mut Cursor::new("n\n"), &mut out).unwrap();
        assert_eq!(ctx.store.load().unwrap().node_count(), 2);
        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("and 1 nested operation(s)?"));
        assert!(transcript.contains("Cancelled"));

        let mut out = Vec::new();
        remove_with(&ctx, &group, false, &mut Cursor::new("y\n"), &mut out).unwrap();
        assert_eq!(ctx.store.load().unwrap().node_count(), 0);
        assert!(String::from_utf8(out).unwrap().contains("Removed 2 node(s)"));
    }

    #[test]
    fn test_remove_with_yes_skips_prompt() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        add(&ctx, "comment", None, true, None, &[]).unwrap();
        let id = root_ids(&ctx).remove(0);

        let mut out = Vec::new();
        remove_with(&ctx, &id, true, &mut Cursor::new(""), &mut out).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("[y/N]"));
        assert!(root_ids(&ctx).is_empty());
    }

    #[test]
    fn test_reorder_duplicate_and_collapse() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        add(&ctx, "probe_on", None, true, None, &[]).unwrap();
        add(&ctx, "probe_off", None, true, None, &[]).unwrap();
        let ids = root_ids(&ctx);

        reorder(&ctx, &ids[1], ReorderDirection::Up).unwrap();
        assert_eq!(root_ids(&ctx), vec![ids[1].clone(), ids[0].clone()]);
        assert!(reorder(&ctx, &ids[1], ReorderDirection::Up).is_err());

        duplicate(&ctx, &ids[1]).unwrap();
        let after = root_ids(&ctx);
        assert_eq!(after.len(), 3);
        assert_eq!(after[0], ids[1]);
        assert_eq!(after[2], ids[0]);

        add(&ctx, "group", None, true, None, &[]).unwrap();
        let group = root_ids(&ctx).pop().unwrap();
        collapse(&ctx, &group).unwrap();
        let doc = ctx.store.load().unwrap();
        assert_eq!(doc.view().collapsed.len(), 1);

        edit(&ctx, &ids[0]).unwrap();
        assert_eq!(ctx.store.load().unwrap().view().editing.len(), 1);
        edit(&ctx, &ids[0]).unwrap();
        assert!(ctx.store.load().unwrap().view().editing.is_empty());
    }

    #[test]
    fn test_target_rejects_leaf_and_clears() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        add(&ctx, "comment", None, true, None, &[]).unwrap();
        let leaf = root_ids(&ctx).remove(0);
        assert!(target(&ctx, Some(&leaf)).is_err());
        target(&ctx, None).unwrap();
        assert_eq!(ctx.store.load().unwrap().view().target, None);
    }

    #[test]
    fn test_set_merges_params() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        add(&ctx, "if", None, true, None, &[]).unwrap();
        let id = root_ids(&ctx).remove(0);
        set(&ctx, &id, &["op=GT".to_string(), "right=2.5".to_string()]).unwrap();

        let doc = ctx.store.load().unwrap();
        let node = &doc.tree().roots()[0];
        assert_eq!(node.text("op"), "GT");
        assert_eq!(node.text("right"), "2.5");
        assert_eq!(node.text("left"), "#100");
    }
}
