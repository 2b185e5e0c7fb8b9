//! Line outline of a block-style YAML document
//!
//! The outline records, for every mapping key, the lines its entry spans and
//! (for one-line scalars) where the value sits on the key line. It is just
//! enough structure to patch a values file in place. Sequences, block
//! scalars, flow collections and multi-line plain scalars are opaque: they
//! can only be replaced as a whole.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteStyle {
    Plain,
    Single,
    Double,
}

/// One-line scalar value on a key line (byte offsets into the line)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scalar {
    pub value_start: usize,
    pub value_end: usize,
    pub style: QuoteStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Scalar(Scalar),
    Mapping(Vec<Entry>),
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    /// Key as YAML reads it (quotes removed)
    pub key: String,
    pub indent: usize,
    /// Byte offset of the key/value colon on the key line
    pub colon: usize,
    /// Key line
    pub line: usize,
    /// One past the last content line of the entry
    pub end: usize,
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Outline {
    pub lines: Vec<String>,
    pub entries: Vec<Entry>,
    /// Indentation of top-level keys
    pub indent: usize,
    /// One past the last content line of the document
    pub end: usize,
}

impl Outline {
    /// Raw key text (quotes included) of an entry
    pub fn raw_key(&self, entry: &Entry) -> &str {
        &self.lines[entry.line][entry.indent..entry.colon]
    }
}

/// Build the outline; `None` when the document uses constructs the outline
/// does not understand at mapping level
pub(crate) fn parse(text: &str) -> Option<Outline> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let parser = Parser { lines: &lines };

    let mut start = parser.next_content(0);
    if let Some(first) = start {
        if lines[first].trim_end() == "---" {
            start = parser.next_content(first + 1);
        }
    }
    let (entries, indent) = match start {
        Some(first) => {
            let indent = parser.indent(first);
            let (entries, next) = parser.block(first, indent)?;
            if next < lines.len() {
                return None;
            }
            (entries, indent)
        }
        None => (Vec::new(), 0),
    };
    let end = entries.last().map(|e| e.end).unwrap_or(0);
    Some(Outline {
        lines,
        entries,
        indent,
        end,
    })
}

struct Parser<'a> {
    lines: &'a [String],
}

impl Parser<'_> {
    fn indent(&self, i: usize) -> usize {
        let line = &self.lines[i];
        line.len() - line.trim_start_matches(' ').len()
    }

    fn is_blank_or_comment(&self, i: usize) -> bool {
        let trimmed = self.lines[i].trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    }

    fn next_content(&self, from: usize) -> Option<usize> {
        (from..self.lines.len()).find(|&i| !self.is_blank_or_comment(i))
    }

    /// Parse the mapping whose keys sit at `indent`, starting at line
    /// `start`. Returns the entries and the first line not consumed.
    fn block(&self, start: usize, indent: usize) -> Option<(Vec<Entry>, usize)> {
        let mut entries = Vec::new();
        let mut i = start;
        loop {
            let Some(j) = self.next_content(i) else {
                return Some((entries, self.lines.len()));
            };
            let ind = self.indent(j);
            if ind < indent {
                return Some((entries, j));
            }
            if ind > indent {
                return None;
            }
            let line = &self.lines[j];
            let (key, colon_rel) = parse_key(&line[ind..])?;
            let colon = ind + colon_rel;

            let after = &line[colon + 1..];
            let rest = after.trim_start();
            let value_start = colon + 1 + (after.len() - rest.len());
            let value_len = value_len(rest);

            let (node, end, next) = if value_len == Some(0) {
                self.nested(j, ind, value_start)?
            } else {
                let more = self.consume(j + 1, ind, false);
                let opaque = more > j + 1
                    || value_len.is_none()
                    || rest.starts_with(['|', '>', '{', '[', '&', '*', '!']);
                let node = if opaque {
                    Node::Opaque
                } else {
                    Node::Scalar(Scalar {
                        value_start,
                        value_end: value_start + value_len.unwrap_or(0),
                        style: quote_style(rest),
                    })
                };
                (node, more, more)
            };

            entries.push(Entry {
                key,
                indent: ind,
                colon,
                line: j,
                end,
                node,
            });
            i = next;
        }
    }

    /// Value of a key with nothing after the colon: a nested mapping, a
    /// sequence or multi-line scalar, or an empty (null) scalar
    fn nested(&self, j: usize, ind: usize, value_start: usize) -> Option<(Node, usize, usize)> {
        let empty = Node::Scalar(Scalar {
            value_start,
            value_end: value_start,
            style: QuoteStyle::Plain,
        });
        let Some(k) = self.next_content(j + 1) else {
            return Some((empty, j + 1, j + 1));
        };
        let child_indent = self.indent(k);
        let content = &self.lines[k][child_indent..];
        let is_item = is_sequence_item(content);

        if child_indent > ind && !is_item && parse_key(content).is_some() {
            let (children, next) = self.block(k, child_indent)?;
            let end = children.last().map(|c| c.end).unwrap_or(k + 1);
            return Some((Node::Mapping(children), end, next));
        }
        if child_indent > ind || (child_indent == ind && is_item) {
            let end = self.consume(j + 1, ind, true);
            return Some((Node::Opaque, end, end));
        }
        Some((empty, j + 1, j + 1))
    }

    /// Lines belonging to a value that started on the line before `from`:
    /// everything indented deeper than `ind` (and sequence items at `ind`
    /// when `items_at_indent`). Returns one past the last such line.
    fn consume(&self, from: usize, ind: usize, items_at_indent: bool) -> usize {
        let mut end = from;
        for k in from..self.lines.len() {
            let line = &self.lines[k];
            if line.trim().is_empty() {
                continue;
            }
            let indent = self.indent(k);
            let content = &line[indent..];
            if indent > ind || (items_at_indent && indent == ind && is_sequence_item(content)) {
                end = k + 1;
            } else if content.starts_with('#') {
                continue;
            } else {
                break;
            }
        }
        end
    }
}

fn is_sequence_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Split `key: value` content; returns the unquoted key and the colon offset
pub(crate) fn parse_key(content: &str) -> Option<(String, usize)> {
    if is_sequence_item(content) {
        return None;
    }
    let first = content.chars().next()?;
    match first {
        '"' | '\'' => {
            let close = closing_quote(content, first)?;
            let raw = &content[1..close];
            let key = if first == '"' {
                raw.replace("\\\"", "\"").replace("\\\\", "\\")
            } else {
                raw.replace("''", "'")
            };
            let after = &content[close + 1..];
            let trimmed = after.trim_start_matches(' ');
            if !trimmed.starts_with(':') {
                return None;
            }
            let colon = close + 1 + (after.len() - trimmed.len());
            is_value_boundary(content, colon).then_some((key, colon))
        }
        '#' | '{' | '[' | '&' | '*' | '!' | '|' | '>' | '%' | '@' | '`' | '?' => None,
        _ => {
            let mut search = 0;
            loop {
                let colon = search + content[search..].find(':')?;
                if is_value_boundary(content, colon) {
                    let key = content[..colon].trim_end();
                    if key.contains(" #") {
                        return None;
                    }
                    return Some((key.to_string(), colon));
                }
                search = colon + 1;
            }
        }
    }
}

fn is_value_boundary(content: &str, colon: usize) -> bool {
    matches!(content[colon + 1..].chars().next(), None | Some(' ') | Some('\t'))
}

/// Byte index of the quote closing the one at index 0
fn closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
        } else if c == quote {
            if quote == '\'' && chars.peek().map(|(_, n)| *n) == Some('\'') {
                chars.next();
                continue;
            }
            return Some(i);
        }
    }
    None
}

/// Length of the value text at the start of `rest` (comment excluded);
/// `None` for an unterminated quoted scalar
fn value_len(rest: &str) -> Option<usize> {
    match rest.chars().next() {
        None | Some('#') => Some(0),
        Some(q @ ('"' | '\'')) => closing_quote(rest, q).map(|i| i + 1),
        Some(_) => {
            let cut = [" #", "\t#"]
                .iter()
                .filter_map(|marker| rest.find(marker))
                .min()
                .unwrap_or(rest.len());
            Some(rest[..cut].trim_end().len())
        }
    }
}

fn quote_style(rest: &str) -> QuoteStyle {
    match rest.chars().next() {
        Some('"') => QuoteStyle::Double,
        Some('\'') => QuoteStyle::Single,
        _ => QuoteStyle::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Global settings
global:
  appSecretKey: \"\"   # generated
  consoleApiDomain: 'console.dify.local'
  rag:
    topKMaxValue: 10

ingress:
  enabled: false
  annotations:
    cert-manager.io/cluster-issuer: letsencrypt
  tls:
  - hosts:
    - a.example.com
    secretName: a-tls
plugin_manager: {}
notes: |
  line one
  line two
empty:
";

    fn keys(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_top_level_structure() {
        let outline = parse(DOC).unwrap();
        assert_eq!(keys(&outline.entries), ["global", "ingress", "plugin_manager", "notes", "empty"]);
        assert_eq!(outline.indent, 0);
        assert_eq!(outline.end, outline.lines.len());
    }

    #[test]
    fn test_nested_mapping_and_spans() {
        let outline = parse(DOC).unwrap();
        let global = &outline.entries[0];
        assert_eq!(global.line, 1);
        assert_eq!(global.end, 6);
        let Node::Mapping(children) = &global.node else {
            panic!("global should be a mapping");
        };
        assert_eq!(keys(children), ["appSecretKey", "consoleApiDomain", "rag"]);

        let Node::Scalar(secret) = children[0].node else {
            panic!("appSecretKey should be a scalar");
        };
        assert_eq!(secret.style, QuoteStyle::Double);
        assert_eq!(&outline.lines[2][secret.value_start..secret.value_end], "\"\"");

        let Node::Scalar(domain) = children[1].node else {
            panic!("consoleApiDomain should be a scalar");
        };
        assert_eq!(domain.style, QuoteStyle::Single);
    }

    #[test]
    fn test_opaque_values() {
        let outline = parse(DOC).unwrap();
        let Node::Mapping(ingress) = &outline.entries[1].node else {
            panic!("ingress should be a mapping");
        };
        assert_eq!(keys(ingress), ["enabled", "annotations", "tls"]);
        let tls = &ingress[2];
        assert_eq!(tls.node, Node::Opaque);
        assert_eq!(tls.end - tls.line, 4);

        let Node::Mapping(annotations) = &ingress[1].node else {
            panic!("annotations should be a mapping");
        };
        assert_eq!(annotations[0].key, "cert-manager.io/cluster-issuer");

        assert_eq!(outline.entries[2].node, Node::Opaque);
        assert_eq!(outline.entries[3].node, Node::Opaque);
        assert_eq!(outline.entries[3].end - outline.entries[3].line, 3);
        assert!(matches!(outline.entries[4].node, Node::Scalar(s) if s.value_start == s.value_end));
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("a: 1"), Some(("a".to_string(), 1)));
        assert_eq!(parse_key("url: http://x:80"), Some(("url".to_string(), 3)));
        assert_eq!(parse_key("\"a.b\": c"), Some(("a.b".to_string(), 5)));
        assert_eq!(parse_key("'it''s': c"), Some(("it's".to_string(), 7)));
        assert_eq!(parse_key("- item"), None);
        assert_eq!(parse_key("plain text"), None);
        assert_eq!(parse_key("? complex"), None);
    }

    #[test]
    fn test_value_len() {
        assert_eq!(value_len("abc  # note"), Some(3));
        assert_eq!(value_len("\"a # b\" # c"), Some(7));
        assert_eq!(value_len("'it''s'"), Some(7));
        assert_eq!(value_len("# only comment"), Some(0));
        assert_eq!(value_len("\"open"), None);
    }

    #[test]
    fn test_unsupported_layout() {
        // key indented between parent and sibling level
        assert!(parse("a:\n    b: 1\n  c: 2\n").is_none());
        // top-level sequence
        assert!(parse("- a\n- b\n").is_none());
    }

    #[test]
    fn test_document_marker_and_comments() {
        let outline = parse("---\n# c\na: 1\n# trailing\n").unwrap();
        assert_eq!(keys(&outline.entries), ["a"]);
        assert_eq!(outline.end, 3);
        assert!(parse("").unwrap().entries.is_empty());
    }
}
