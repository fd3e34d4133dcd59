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

//! Built-in tool kinds
//!
//! Macro B control flow plus the usual spindle-probe inspection cycles
//! (P9810 protected positioning through P9816 internal corner).

use super::ToolDefinition;
use crate::codegen::{Chunk, EmitContext};
use crate::node::Node;

/// Comparison operators accepted by Macro B conditions
pub const COMPARISON_OPS: &[&str] = &["EQ", "NE", "LT", "LE", "GT", "GE"];

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        // Structure and control flow
        ToolDefinition::container("group", "Setup", emit_group)
            .with_description("Named section wrapped in banner comments")
            .with_param("name", "Setup A"),
        ToolDefinition::container("if", "If", emit_if)
            .with_description("Run the nested operations only when the condition holds")
            .with_param("left", "#100")
            .with_param("op", "EQ")
            .with_param("right", 0)
            .with_choices("op", COMPARISON_OPS),
        ToolDefinition::container("while", "While", emit_while)
            .with_description("Repeat the nested operations while the condition holds")
            .with_param("left", "#100")
            .with_param("op", "LT")
            .with_param("right", 3)
            .with_choices("op", COMPARISON_OPS),
        ToolDefinition::container("repeat", "Repeat", emit_repeat)
            .with_description("Run the nested operations a fixed number of times")
            .with_param("var", "#110")
            .with_param("count", 3),
        // Probe
        ToolDefinition::leaf("probe_on", "Probe On", emit_probe_on).with_description("Switch the spindle probe on"),
        ToolDefinition::leaf("probe_off", "Probe Off", emit_probe_off).with_description("Switch the spindle probe off"),
        ToolDefinition::leaf("protected_move", "Protected Move", emit_protected_move)
            .with_description("Move with collision protection (P9810)")
            .with_empty_param("x")
            .with_empty_param("y")
            .with_param("z", 10)
            .with_param("f", 1000),
        ToolDefinition::leaf("single_surface", "Single Surface", emit_single_surface)
            .with_description("Measure one surface along X, Y or Z (P9811)")
            .with_empty_param("x")
            .with_empty_param("y")
            .with_param("z", -5)
            .with_empty_param("q")
            .with_param("s", 54),
        ToolDefinition::leaf("bore", "Bore", emit_bore)
            .with_description("Measure a bore (P9814)")
            .with_param("d", 20)
            .with_empty_param("z")
            .with_empty_param("q")
            .with_param("s", 54),
        ToolDefinition::leaf("boss", "Boss", emit_boss)
            .with_description("Measure a boss (P9814)")
            .with_param("d", 20)
            .with_param("z", -10)
            .with_param("r", 5)
            .with_param("s", 54),
        ToolDefinition::leaf("pocket", "Pocket", emit_pocket)
            .with_description("Measure a pocket width in X or Y (P9812)")
            .with_param("x", 20)
            .with_empty_param("y")
            .with_param("s", 54),
        ToolDefinition::leaf("web", "Web", emit_web)
            .with_description("Measure a web width in X or Y (P9812)")
            .with_param("x", 20)
            .with_empty_param("y")
            .with_param("z", -10)
            .with_param("r", 5)
            .with_param("s", 54),
        ToolDefinition::leaf("corner_external", "External Corner", emit_corner_external)
            .with_description("Find an external corner (P9815)")
            .with_param("x", 0)
            .with_param("y", 0)
            .with_param("i", 10)
            .with_param("j", 10)
            .with_param("s", 54),
        ToolDefinition::leaf("corner_internal", "Internal Corner", emit_corner_internal)
            .with_description("Find an internal corner (P9816)")
            .with_param("x", 0)
            .with_param("y", 0)
            .with_param("i", 10)
            .with_param("j", 10)
            .with_param("s", 54),
        // Utility
        ToolDefinition::leaf("comment", "Comment", emit_comment)
            .with_description("Free text comment")
            .with_param("text", "Comment"),
        ToolDefinition::leaf("assign", "Assign Variable", emit_assign)
            .with_description("Set a macro variable")
            .with_param("var", "#100")
            .with_param("value", 0),
        ToolDefinition::leaf("alarm", "Alarm", emit_alarm)
            .with_description("Raise a machine alarm with a message")
            .with_param("number", 1)
            .with_param("message", "PROBE FAILURE"),
        ToolDefinition::leaf("dwell", "Dwell", emit_dwell)
            .with_description("Pause for a number of seconds")
            .with_param("seconds", 1),
        ToolDefinition::leaf("raw", "Raw Line", emit_raw)
            .with_description("Verbatim program text")
            .with_empty_param("text"),
    ]
}

/// `[left op right]`
fn condition(node: &Node) -> String {
    format!("[{} {} {}]", node.text("left"), node.text("op"), node.text("right"))
}

/// Address words for every non-empty parameter, in the given order
fn words(node: &Node, addresses: &[(&str, &str)]) -> String {
    addresses
        .iter()
        .filter_map(|(address, param)| {
            node.param(param)
                .filter(|value| !value.is_empty())
                .map(|value| format!(" {address}{value}"))
        })
        .collect()
}

fn cycle(program: u32, node: &Node, addresses: &[(&str, &str)]) -> Vec<Chunk> {
    vec![format!("G65 P{program}{}", words(node, addresses)).into()]
}

fn emit_group(tool: &ToolDefinition, node: &Node, ctx: &EmitContext<'_>) -> Vec<Chunk> {
    let name = node.text("name");
    let title = if name.trim().is_empty() { tool.name.clone() } else { name };
    let title = title.to_uppercase();
    vec![
        format!("( ===== {title} ===== )").into(),
        ctx.children(node),
        format!("( ===== END {title} ===== )").into(),
    ]
}

fn emit_if(_: &ToolDefinition, node: &Node, ctx: &EmitContext<'_>) -> Vec<Chunk> {
    let matched = ctx.next_label();
    let end = ctx.next_label();
    vec![
        format!("IF {} GOTO{matched}", condition(node)).into(),
        format!("GOTO{end}").into(),
        format!("N{matched}").into(),
        ctx.children(node),
        format!("N{end}").into(),
    ]
}

fn emit_while(_: &ToolDefinition, node: &Node, ctx: &EmitContext<'_>) -> Vec<Chunk> {
    let index = ctx.loop_index();
    vec![
        format!("WHILE {} DO{index}", condition(node)).into(),
        ctx.children(node),
        format!("END{index}").into(),
    ]
}

fn emit_repeat(_: &ToolDefinition, node: &Node, ctx: &EmitContext<'_>) -> Vec<Chunk> {
    let index = ctx.loop_index();
    let var = node.text("var");
    let count = node.text("count");
    vec![
        format!("{var} = 0").into(),
        format!("WHILE [{var} LT {count}] DO{index}").into(),
        ctx.children(node),
        Chunk::Block(vec![ctx.fork(1).line(&format!("{var} = {var} + 1"))]),
        format!("END{index}").into(),
    ]
}

fn emit_probe_on(_: &ToolDefinition, _: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    vec!["G65 P9832".into()]
}

fn emit_probe_off(_: &ToolDefinition, _: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    vec!["G65 P9833".into()]
}

fn emit_protected_move(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    cycle(9810, node, &[("X", "x"), ("Y", "y"), ("Z", "z"), ("F", "f")])
}

fn emit_single_surface(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    cycle(9811, node, &[("X", "x"), ("Y", "y"), ("Z", "z"), ("Q", "q"), ("S", "s")])
}

fn emit_bore(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    cycle(9814, node, &[("D", "d"), ("Z", "z"), ("Q", "q"), ("S", "s")])
}

fn emit_boss(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    cycle(9814, node, &[("D", "d"), ("Z", "z"), ("R", "r"), ("S", "s")])
}

fn emit_pocket(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    cycle(9812, node, &[("X", "x"), ("Y", "y"), ("S", "s")])
}

fn emit_web(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    cycle(9812, node, &[("X", "x"), ("Y", "y"), ("Z", "z"), ("R", "r"), ("S", "s")])
}

fn emit_corner_external(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    cycle(9815, node, &[("X", "x"), ("Y", "y"), ("I", "i"), ("J", "j"), ("S", "s")])
}

fn emit_corner_internal(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    cycle(9816, node, &[("X", "x"), ("Y", "y"), ("I", "i"), ("J", "j"), ("S", "s")])
}

fn emit_comment(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    vec![format!("( {} )", node.text("text")).into()]
}

fn emit_assign(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    vec![format!("{} = {}", node.text("var"), node.text("value")).into()]
}

fn emit_alarm(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    vec![format!("#3000 = {} ({})", node.text("number"), node.text("message")).into()]
}

fn emit_dwell(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    vec![format!("G04 X{}", node.text("seconds")).into()]
}

fn emit_raw(_: &ToolDefinition, node: &Node, _: &EmitContext<'_>) -> Vec<Chunk> {
    vec![node.text("text").into()]
}
