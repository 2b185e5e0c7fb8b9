//! Patch a values document in place from the difference of two trees
//!
//! Changed one-line scalars are rewritten on their line (quote style and
//! trailing comment kept), new keys are inserted after the last line of
//! their parent at the sibling indentation, removed keys lose their lines.
//! Whatever the outline cannot address is re-rendered as block YAML at the
//! nearest addressable ancestor.

use super::outline::{Entry, Node, Outline, QuoteStyle, Scalar};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

#[derive(Debug)]
enum Edit {
    Replace {
        start: usize,
        end: usize,
        lines: Vec<String>,
    },
    Insert {
        at: usize,
        lines: Vec<String>,
    },
}

/// The difference cannot be expressed at this level
#[derive(Debug)]
struct Unaddressable;

/// Patched document text, or `None` when even the top level cannot be
/// addressed
pub(crate) fn patch(outline: &Outline, old: &Value, new: &Value, trailing_newline: bool) -> Option<String> {
    let (Value::Mapping(old), Value::Mapping(new)) = (old, new) else {
        return None;
    };
    let mut edits = Vec::new();
    diff_mapping(
        outline,
        &outline.entries,
        outline.indent,
        outline.end,
        old,
        new,
        &mut edits,
    )
    .ok()?;
    Some(apply(&outline.lines, edits, trailing_newline))
}

fn diff_mapping(
    outline: &Outline,
    entries: &[Entry],
    indent: usize,
    insert_at: usize,
    old: &Mapping,
    new: &Mapping,
    edits: &mut Vec<Edit>,
) -> Result<(), Unaddressable> {
    for (key, old_value) in old {
        let name = key_text(key).ok_or(Unaddressable)?;
        let entry = entries.iter().find(|e| e.key == name).ok_or(Unaddressable)?;
        match new.get(key) {
            None => edits.push(Edit::Replace {
                start: entry.line,
                end: entry.end,
                lines: Vec::new(),
            }),
            Some(new_value) if new_value == old_value => {}
            Some(new_value) => diff_entry(outline, entry, old_value, new_value, edits)?,
        }
    }
    for (key, new_value) in new {
        if old.contains_key(key) {
            continue;
        }
        let name = key_text(key).ok_or(Unaddressable)?;
        edits.push(Edit::Insert {
            at: insert_at,
            lines: render_entry(&render_key(&name)?, indent, new_value)?,
        });
    }
    Ok(())
}

fn diff_entry(
    outline: &Outline,
    entry: &Entry,
    old: &Value,
    new: &Value,
    edits: &mut Vec<Edit>,
) -> Result<(), Unaddressable> {
    match (&entry.node, old, new) {
        (Node::Mapping(children), Value::Mapping(old), Value::Mapping(new)) => {
            let indent = children.first().map(|c| c.indent).unwrap_or(entry.indent + 2);
            let mut nested = Vec::new();
            if diff_mapping(outline, children, indent, entry.end, old, new, &mut nested).is_ok() {
                edits.extend(nested);
                return Ok(());
            }
        }
        (Node::Scalar(scalar), _, new) if is_scalar(new) => {
            if let Some(line) = replace_scalar(&outline.lines[entry.line], entry, scalar, new) {
                edits.push(Edit::Replace {
                    start: entry.line,
                    end: entry.line + 1,
                    lines: vec![line],
                });
                return Ok(());
            }
        }
        _ => {}
    }
    edits.push(Edit::Replace {
        start: entry.line,
        end: entry.end,
        lines: render_entry(outline.raw_key(entry), entry.indent, new)?,
    });
    Ok(())
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn render_key(name: &str) -> Result<String, Unaddressable> {
    let rendered = serde_yaml::to_string(&Value::from(name)).map_err(|_| Unaddressable)?;
    Ok(rendered.trim_end().to_string())
}

/// Rewrite the value on a key line, keeping key text and trailing comment
fn replace_scalar(line: &str, entry: &Entry, scalar: &Scalar, value: &Value) -> Option<String> {
    let rendered = render_scalar(value, scalar.style)?;
    let head = &line[..entry.colon + 1];
    let tail = &line[scalar.value_end..];
    let gap = if scalar.value_start == scalar.value_end && !tail.is_empty() && !tail.starts_with(' ') {
        " "
    } else {
        ""
    };
    Some(format!("{} {}{}{}", head, rendered, gap, tail))
}

/// One-line rendering of a scalar; strings keep the given quote style
fn render_scalar(value: &Value, style: QuoteStyle) -> Option<String> {
    match (value, style) {
        (Value::String(s), QuoteStyle::Double) if !s.contains('\n') => Some(format!(
            "\"{}\"",
            s.replace('\\', "\\\\").replace('"', "\\\"").replace('\t', "\\t")
        )),
        (Value::String(s), QuoteStyle::Single) if !s.contains('\n') => {
            Some(format!("'{}'", s.replace('\'', "''")))
        }
        _ => {
            let text = serde_yaml::to_string(value).ok()?;
            let text = text.trim_end();
            (!text.contains('\n')).then(|| text.to_string())
        }
    }
}

/// Block YAML for `key: value` at `indent`
fn render_entry(key: &str, indent: usize, value: &Value) -> Result<Vec<String>, Unaddressable> {
    let pad = " ".repeat(indent);
    let body = serde_yaml::to_string(value).map_err(|_| Unaddressable)?;
    let nested = match value {
        Value::Mapping(m) => !m.is_empty(),
        Value::Sequence(s) => !s.is_empty(),
        _ => false,
    };

    let mut lines = Vec::new();
    if nested {
        lines.push(format!("{}{}:", pad, key));
        lines.extend(body.lines().map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{}  {}", pad, l)
            }
        }));
    } else {
        let mut body = body.lines();
        let first = body.next().unwrap_or("null");
        lines.push(format!("{}{}: {}", pad, key, first));
        lines.extend(body.map(|l| format!("{}{}", pad, l)));
    }
    Ok(lines)
}

fn apply(lines: &[String], edits: Vec<Edit>, trailing_newline: bool) -> String {
    let mut inserts: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let mut replaces: BTreeMap<usize, (usize, Vec<String>)> = BTreeMap::new();
    for edit in edits {
        match edit {
            Edit::Insert { at, lines } => inserts.entry(at).or_default().extend(lines),
            Edit::Replace { start, end, lines } => {
                replaces.insert(start, (end, lines));
            }
        }
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    loop {
        if let Some(inserted) = inserts.get(&i) {
            out.extend(inserted.iter().cloned());
        }
        if i >= lines.len() {
            break;
        }
        match replaces.get(&i) {
            Some((end, replacement)) => {
                out.extend(replacement.iter().cloned());
                i = (*end).max(i + 1);
            }
            None => {
                out.push(lines[i].clone());
                i += 1;
            }
        }
    }

    let mut text = out.join("\n");
    if trailing_newline && !text.is_empty() {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::outline;

    fn patched(doc: &str, edit: impl FnOnce(&mut Value)) -> String {
        let old: Value = serde_yaml::from_str(doc).unwrap();
        let mut new = old.clone();
        edit(&mut new);
        let outline = outline::parse(doc).unwrap();
        let text = patch(&outline, &old, &new, true).unwrap();
        let reparsed: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(reparsed, new, "patched text:\n{}", text);
        text
    }

    fn set(root: &mut Value, path: &[&str], value: Value) {
        let mut node = root;
        for key in &path[..path.len() - 1] {
            node = node.get_mut(*key).unwrap();
        }
        node.as_mapping_mut()
            .unwrap()
            .insert(Value::from(path[path.len() - 1]), value);
    }

    const DOC: &str = "\
# Dify values
global:
  appSecretKey: \"\"   # generated by the wizard
  consoleWebDomain: 'console.dify.local'
  dbMigrationEnabled: true

# Mail
mail:
  type: \"\"
  smtp:
    server: \"\"
    port: 587
";

    #[test]
    fn test_scalar_keeps_quotes_and_comment() {
        let text = patched(DOC, |v| {
            set(v, &["global", "appSecretKey"], Value::from("c2VjcmV0"));
            set(v, &["global", "consoleWebDomain"], Value::from("console.example.com"));
        });
        assert!(text.contains("  appSecretKey: \"c2VjcmV0\"   # generated by the wizard\n"));
        assert!(text.contains("  consoleWebDomain: 'console.example.com'\n"));
        assert!(text.starts_with("# Dify values\n"));
        assert!(text.contains("\n# Mail\n"));
    }

    #[test]
    fn test_plain_scalars_and_types() {
        let text = patched(DOC, |v| {
            set(v, &["global", "dbMigrationEnabled"], Value::from(false));
            set(v, &["mail", "smtp", "port"], Value::from(465));
        });
        assert!(text.contains("  dbMigrationEnabled: false\n"));
        assert!(text.contains("    port: 465\n"));
    }

    #[test]
    fn test_new_keys_inserted_at_sibling_indent() {
        let text = patched(DOC, |v| {
            set(v, &["mail", "smtp", "username"], Value::from("ops"));
            set(v, &["global", "innerApiKey"], Value::from("k"));
        });
        assert!(text.contains("    port: 587\n    username: ops\n"));
        assert!(text.contains("  dbMigrationEnabled: true\n  innerApiKey: k\n"));
    }

    #[test]
    fn test_new_nested_mapping_is_rendered_as_block() {
        let text = patched(DOC, |v| {
            let metric: Value = serde_yaml::from_str("source: cadvisor\ncadvisor:\n  scrapeInterval: 20s\n").unwrap();
            set(v, &["plugin_manager"], serde_yaml::from_str("metric: {}").unwrap());
            set(v, &["plugin_manager", "metric"], metric);
        });
        assert!(text.ends_with(
            "plugin_manager:\n  metric:\n    source: cadvisor\n    cadvisor:\n      scrapeInterval: 20s\n"
        ));
    }

    #[test]
    fn test_removed_keys_lose_their_lines() {
        let text = patched(DOC, |v| {
            v.get_mut("mail")
                .unwrap()
                .as_mapping_mut()
                .unwrap()
                .shift_remove("smtp");
        });
        assert!(!text.contains("smtp"));
        assert!(!text.contains("port"));
    }

    #[test]
    fn test_flow_mapping_is_rerendered() {
        let doc = "plugin_manager: {}\nother: 1\n";
        let text = patched(doc, |v| {
            set(v, &["plugin_manager"], serde_yaml::from_str("metric:\n  source: prometheus\n").unwrap());
        });
        assert_eq!(text, "plugin_manager:\n  metric:\n    source: prometheus\nother: 1\n");
    }

    #[test]
    fn test_sequence_change_rerenders_entry() {
        let doc = "ingress:\n  tls: []\n  className: nginx  # controller\n";
        let text = patched(doc, |v| {
            let tls: Value = serde_yaml::from_str("- hosts: [a.example.com]\n  secretName: a-tls\n").unwrap();
            set(v, &["ingress", "tls"], tls);
        });
        assert!(text.contains("  className: nginx  # controller\n"));
        assert!(text.contains("  tls:\n    - hosts:\n"));
    }

    #[test]
    fn test_empty_value_gets_filled() {
        let doc = "mail:\n  defaultSender:\n  type: resend\n";
        let text = patched(doc, |v| {
            set(v, &["mail", "defaultSender"], Value::from("no-reply@example.com"));
        });
        assert!(text.contains("  defaultSender: no-reply@example.com\n"));
    }

    #[test]
    fn test_dotted_key_is_inserted() {
        let doc = "ingress:\n  annotations:\n    kubernetes.io/ingress.class: nginx\n";
        let text = patched(doc, |v| {
            set(
                v,
                &["ingress", "annotations", "cert-manager.io/cluster-issuer"],
                Value::from("letsencrypt"),
            );
        });
        assert!(text.contains("    cert-manager.io/cluster-issuer: letsencrypt\n"));
    }

    #[test]
    fn test_top_level_type_change_is_unaddressable() {
        let old: Value = serde_yaml::from_str("a: 1\n").unwrap();
        let outline = outline::parse("a: 1\n").unwrap();
        assert!(patch(&outline, &old, &Value::from("scalar"), true).is_none());
    }
}
