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

//! Read-only views of the routine and catalog

use super::routine::node_title;
use super::{CommandContext, resolve_node, short_id};
use anyhow::Result;
use probekit_core::{Document, Node};

pub fn list_catalog(ctx: &CommandContext) -> Result<()> {
    println!("{:<18} {:<24} {:<10} {}", "Kind", "Name", "Shape", "Defaults");
    println!("{}", "-".repeat(80));
    for tool in ctx.catalog.iter() {
        let shape = if tool.container { "container" } else { "leaf" };
        let defaults: Vec<String> = tool.defaults.iter().map(|(key, value)| format!("{key}={value}")).collect();
        println!("{:<18} {:<24} {:<10} {}", tool.key, tool.name, shape, defaults.join(" "));
        for (param, choices) in &tool.choices {
            println!("{:<18} {:<24} {:<10} {} in {}", "", "", "", param, choices.join(" "));
        }
    }
    Ok(())
}

pub fn show(ctx: &CommandContext, code: bool, remember: bool) -> Result<()> {
    let mut doc = ctx.store.load()?;
    if remember {
        doc.set_show_code(code);
        ctx.store.save(&doc)?;
    }
    if doc.tree().is_empty() {
        println!("Routine is empty.");
    } else {
        for line in render_outline(ctx, &doc) {
            println!("{line}");
        }
    }
    println!();
    println!("{} operations, {} nodes", doc.operation_count(), doc.node_count());

    if code || doc.view().show_code {
        println!();
        println!("{}", doc.generate(&ctx.catalog, &ctx.config.emit));
    }
    Ok(())
}

pub fn containers(ctx: &CommandContext, movable: Option<&str>) -> Result<()> {
    let doc = ctx.store.load()?;
    let allowed = movable.map(|raw| resolve_node(&doc, raw)).transpose()?.map(|id| doc.move_destinations(&id));

    println!("(root)");
    doc.each_container(|node, depth| {
        if allowed.as_ref().is_none_or(|ids| ids.contains(node.id())) {
            println!("{}{} {}", "  ".repeat(depth + 1), node_title(ctx, node), short_id(node.id()));
        }
    });
    Ok(())
}

/// Indented outline of the routine, honoring collapsed containers
pub fn render_outline(ctx: &CommandContext, doc: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    for node in doc.tree().roots() {
        outline_node(ctx, doc, node, 0, &mut lines);
    }
    lines
}

fn outline_node(ctx: &CommandContext, doc: &Document, node: &Node, depth: usize, lines: &mut Vec<String>) {
    let view = doc.view();
    let collapsed = view.collapsed.contains(node.id());
    let marker = match node.children() {
        Some(_) if collapsed => '+',
        Some(_) => '-',
        None => '*',
    };

    let mut line = format!("{}{} {} [{}] {}", "  ".repeat(depth), marker, node_title(ctx, node), node.kind(), short_id(node.id()));
    let summary = param_summary(node);
    if !summary.is_empty() {
        line.push_str("  ");
        line.push_str(&summary);
    }
    if view.target.as_ref() == Some(node.id()) {
        line.push_str("  <- target");
    }

    if collapsed && node.is_container() {
        line.push_str(&format!("  ({} hidden)", node.subtree_len() - 1));
    }
    lines.push(line);
    if view.editing.contains(node.id()) {
        lines.extend(param_listing(node, depth));
    }

    if let Some(children) = node.children().filter(|_| !collapsed) {
        for child in children {
            outline_node(ctx, doc, child, depth + 1, lines);
        }
    }
}

/// Every parameter of a node under edit, one per line, empty values included
fn param_listing(node: &Node, depth: usize) -> Vec<String> {
    node.params()
        .iter()
        .map(|(key, value)| format!("{}    {key} = {value}", "  ".repeat(depth)))
        .collect()
}

/// Non-empty parameters as `key=value` pairs
fn param_summary(node: &Node) -> String {
    node.params()
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbekitConfig;
    use probekit_core::Destination;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> CommandContext {
        CommandContext::new(ProbekitConfig {
            routine: dir.path().join("routine.json"),
            ..ProbekitConfig::default()
        })
    }

    #[test]
    fn test_outline_shape() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let mut doc = Document::new();
        let group = doc.add(&ctx.catalog, "group", &Destination::Root).unwrap();
        doc.add(&ctx.catalog, "probe_on", &Destination::Node(group.clone())).unwrap();
        doc.add(&ctx.catalog, "comment", &Destination::Root).unwrap();
        doc.set_target(Some(group.clone())).unwrap();

        let lines = render_outline(&ctx, &doc);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("- Setup A [group] "));
        assert!(lines[0].ends_with("name=Setup A  <- target"));
        assert!(lines[1].starts_with("  * "));
        assert!(lines[1].contains("[probe_on]"));
        assert!(lines[2].starts_with("* "));
        assert!(lines[2].ends_with("text=Comment"));
    }

    #[test]
    fn test_collapsed_container_hides_children() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let mut doc = Document::new();
        let outer = doc.add(&ctx.catalog, "while", &Destination::Root).unwrap();
        let inner = doc.add(&ctx.catalog, "if", &Destination::Node(outer.clone())).unwrap();
        doc.add(&ctx.catalog, "alarm", &Destination::Node(inner)).unwrap();
        doc.toggle_collapsed(&outer).unwrap();

        let lines = render_outline(&ctx, &doc);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("+ "));
        assert!(lines[0].ends_with("(2 hidden)"));
    }

    #[test]
    fn test_editing_node_lists_every_param() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let mut doc = Document::new();
        let group = doc.add(&ctx.catalog, "group", &Destination::Root).unwrap();
        let bore = doc.add(&ctx.catalog, "bore", &Destination::Node(group)).unwrap();
        doc.toggle_editing(&bore).unwrap();

        let lines = render_outline(&ctx, &doc);
        assert_eq!(
            lines[2..],
            ["      d = 20", "      q = ", "      s = 54", "      z = "]
        );
    }

    #[test]
    fn test_show_remember_persists_code_flag() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        show(&ctx, true, false).unwrap();
        assert!(!ctx.store.load().unwrap().view().show_code);
        show(&ctx, true, true).unwrap();
        assert!(ctx.store.load().unwrap().view().show_code);
        show(&ctx, false, true).unwrap();
        assert!(!ctx.store.load().unwrap().view().show_code);
    }

    #[test]
    fn test_empty_params_are_left_out_of_summary() {
        let catalog = probekit_core::Catalog::builtin();
        let node = catalog.instantiate("protected_move").unwrap();
        assert_eq!(param_summary(&node), "f=1000 z=10");
    }
}
