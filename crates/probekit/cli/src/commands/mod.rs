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

pub mod outline;
pub mod program;
pub mod routine;

use crate::config::ProbekitConfig;
use crate::storage::RoutineStore;
use anyhow::{Result, bail};
use probekit_core::{Catalog, Document, NodeId, ParamValue, Params};
use std::io::{BufRead, Write};

pub struct CommandContext {
    pub config: ProbekitConfig,
    pub catalog: Catalog,
    pub store: RoutineStore,
}

impl CommandContext {
    pub fn new(config: ProbekitConfig) -> Self {
        let store = RoutineStore::new(config.routine.clone());
        Self {
            config,
            catalog: Catalog::builtin(),
            store,
        }
    }
}

/// Resolve a full node id or an unambiguous prefix of one
pub fn resolve_node(doc: &Document, raw: &str) -> Result<NodeId> {
    let raw = raw.trim();
    if let Ok(id) = NodeId::from_string(raw) {
        if doc.get_node(&id).is_some() {
            return Ok(id);
        }
        bail!("no node with id {raw}");
    }
    if raw.is_empty() {
        bail!("empty node id");
    }

    let mut matches = Vec::new();
    doc.tree().walk(|node, _| {
        if node.id().to_string().starts_with(raw) {
            matches.push(node.id().clone());
        }
    });
    match matches.len() {
        0 => bail!("no node matches {raw}"),
        1 => Ok(matches.remove(0)),
        n => bail!("id prefix {raw} is ambiguous ({n} nodes match)"),
    }
}

/// Parse `KEY=VALUE` arguments into a parameter patch
pub fn parse_assignments(raw: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            bail!("expected KEY=VALUE, got {item:?}");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("missing parameter name in {item:?}");
        }
        params.insert(key.to_string(), ParamValue::parse(value));
    }
    Ok(params)
}

/// Ask a yes/no question, defaulting to no
pub fn confirm(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Short form of an id for listings
pub fn short_id(id: &NodeId) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use probekit_core::Destination;
    use std::io::Cursor;

    #[test]
    fn test_parse_assignments() {
        let params = parse_assignments(&["d=32".into(), "name=Setup B".into(), "q=".into()]).unwrap();
        assert_eq!(params.get("d"), Some(&ParamValue::Number(32.0)));
        assert_eq!(params.get("name"), Some(&ParamValue::Text("Setup B".into())));
        assert_eq!(params.get("q"), Some(&ParamValue::Empty));

        assert!(parse_assignments(&["d32".into()]).is_err());
        assert!(parse_assignments(&["=5".into()]).is_err());
    }

    #[test]
    fn test_value_may_contain_equals() {
        let params = parse_assignments(&["text=#100 = 1".into()]).unwrap();
        assert_eq!(params.get("text"), Some(&ParamValue::Text("#100 = 1".into())));
    }

    #[test]
    fn test_resolve_node_by_prefix_and_full_id() {
        let catalog = Catalog::builtin();
        let mut doc = Document::new();
        let id = doc.add(&catalog, "bore", &Destination::Root).unwrap();

        assert_eq!(resolve_node(&doc, &id.to_string()).unwrap(), id);
        assert_eq!(resolve_node(&doc, &short_id(&id)).unwrap(), id);
        assert!(resolve_node(&doc, &NodeId::new().to_string()).is_err());
        assert!(resolve_node(&doc, "zz").is_err());
        assert!(resolve_node(&doc, "").is_err());
    }

    #[test]
    fn test_resolve_node_rejects_ambiguous_prefix() {
        let json = r#"{ "nodes": [
            { "shape": "leaf", "id": "aaaa0000-0000-4000-8000-000000000001", "kind": "bore" },
            { "shape": "leaf", "id": "aaaa0000-0000-4000-8000-000000000002", "kind": "boss" }
        ] }"#;
        let doc = Document::import_json(json).unwrap();

        assert!(resolve_node(&doc, "aaaa").is_err());
        let last = resolve_node(&doc, "aaaa0000-0000-4000-8000-00000000000").unwrap_err();
        assert!(last.to_string().contains("ambiguous"));
        assert!(resolve_node(&doc, "aaaa0000-0000-4000-8000-000000000002").is_ok());
    }

    #[test]
    fn test_confirm_answers() {
        let mut out = Vec::new();
        assert!(confirm("Remove?", &mut Cursor::new("y\n"), &mut out).unwrap());
        assert!(confirm("Remove?", &mut Cursor::new("YES\n"), &mut out).unwrap());
        assert!(!confirm("Remove?", &mut Cursor::new("\n"), &mut out).unwrap());
        assert!(!confirm("Remove?", &mut Cursor::new(""), &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().starts_with("Remove? [y/N] "));
    }
}
