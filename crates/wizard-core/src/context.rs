//! Configuration context: the values tree a wizard run edits
//!
//! The tree is a `serde_yaml::Value` mapping seeded from the chart's values
//! template. Paths are dotted (`global.rag.topKMaxValue`); keys that contain
//! dots themselves are addressed with the `*_at` variants taking segments.
//!
//! Every attributed write remembers who made it. A value written by a
//! feature is never overwritten by base module logic: such a write (to the
//! same path, an ancestor or a descendant) is dropped and reported back as
//! [`WriteOutcome::Kept`] so the caller can warn about it.

use serde_yaml::{Mapping, Value};

/// Who is writing into the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writer {
    /// Base logic of a module
    Module(&'static str),
    /// A version-gated feature
    Feature(&'static str),
}

/// Result of an attributed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The write was dropped because a feature owns the path
    Kept { feature: &'static str, path: String },
}

/// Mutable key-value tree plus the chart version gating features
#[derive(Debug, Clone)]
pub struct ConfigContext {
    root: Value,
    chart_version: String,
    feature_writes: Vec<(Vec<String>, &'static str)>,
}

impl ConfigContext {
    /// Create a context from a values tree; anything but a mapping becomes
    /// an empty mapping
    pub fn new(root: Value, chart_version: impl Into<String>) -> Self {
        let root = match root {
            Value::Mapping(_) => root,
            _ => Value::Mapping(Mapping::new()),
        };
        Self {
            root,
            chart_version: chart_version.into(),
            feature_writes: Vec::new(),
        }
    }

    /// Empty context for the given chart version
    pub fn empty(chart_version: impl Into<String>) -> Self {
        Self::new(Value::Mapping(Mapping::new()), chart_version)
    }

    pub fn chart_version(&self) -> &str {
        &self.chart_version
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.get_at(&split(path))
    }

    pub fn get_at(&self, segments: &[&str]) -> Option<&Value> {
        segments
            .iter()
            .try_fold(&self.root, |node, segment| node.as_mapping()?.get(*segment))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    /// Scalar rendered as text (for prompt defaults); `None` for null,
    /// missing and collection values
    pub fn get_display(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Unattributed write, creating intermediate mappings as needed
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        set_in(&mut self.root, &split(path), value.into());
    }

    /// Unattributed write addressed by segments
    pub fn set_at(&mut self, segments: &[&str], value: impl Into<Value>) {
        set_in(&mut self.root, segments, value.into());
    }

    /// Unattributed removal; returns the removed value
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        remove_in(&mut self.root, &split(path))
    }

    /// Make sure `path` holds a mapping (replacing a scalar if necessary)
    pub fn ensure_mapping(&mut self, path: &str) {
        let segments = split(path);
        if !self.get_at(&segments).is_some_and(Value::is_mapping) {
            set_in(&mut self.root, &segments, Value::Mapping(Mapping::new()));
        }
    }

    /// Attributed write honouring feature precedence
    pub fn write(&mut self, writer: Writer, segments: &[&str], value: Value) -> WriteOutcome {
        if let Some(kept) = self.conflict(writer, segments) {
            return kept;
        }
        set_in(&mut self.root, segments, value);
        self.record(writer, segments);
        WriteOutcome::Written
    }

    /// Attributed removal honouring feature precedence
    pub fn remove_as(&mut self, writer: Writer, segments: &[&str]) -> WriteOutcome {
        if let Some(kept) = self.conflict(writer, segments) {
            return kept;
        }
        remove_in(&mut self.root, segments);
        self.record(writer, segments);
        WriteOutcome::Written
    }

    /// Attributed `ensure_mapping`; only counts as a write when it changes
    /// something
    pub fn ensure_mapping_as(&mut self, writer: Writer, segments: &[&str]) -> WriteOutcome {
        if self.get_at(segments).is_some_and(Value::is_mapping) {
            return WriteOutcome::Written;
        }
        if let Some(kept) = self.conflict(writer, segments) {
            return kept;
        }
        set_in(&mut self.root, segments, Value::Mapping(Mapping::new()));
        WriteOutcome::Written
    }

    /// Feature that last wrote `path` (or an ancestor of it)
    pub fn feature_owner(&self, path: &str) -> Option<&'static str> {
        let segments = split(path);
        self.feature_writes
            .iter()
            .rev()
            .find(|(owned, _)| is_prefix(owned, &segments))
            .map(|(_, feature)| *feature)
    }

    fn conflict(&self, writer: Writer, segments: &[&str]) -> Option<WriteOutcome> {
        if !matches!(writer, Writer::Module(_)) {
            return None;
        }
        self.feature_writes
            .iter()
            .find(|(owned, _)| is_prefix(owned, segments) || is_prefix_of_owned(segments, owned))
            .map(|(_, feature)| WriteOutcome::Kept {
                feature: *feature,
                path: segments.join("."),
            })
    }

    fn record(&mut self, writer: Writer, segments: &[&str]) {
        if let Writer::Feature(feature) = writer {
            let owned: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
            self.feature_writes.retain(|(existing, _)| *existing != owned);
            self.feature_writes.push((owned, feature));
        }
    }
}

/// Split a dotted path into segments
pub fn split(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

/// `owned` is a (non-strict) prefix of `segments`
fn is_prefix(owned: &[String], segments: &[&str]) -> bool {
    owned.len() <= segments.len() && owned.iter().zip(segments).all(|(a, b)| a == b)
}

/// `segments` is a (non-strict) prefix of `owned`
fn is_prefix_of_owned(segments: &[&str], owned: &[String]) -> bool {
    segments.len() <= owned.len() && segments.iter().zip(owned).all(|(a, b)| a == b)
}

fn set_in(node: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_mapping() {
        *node = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = node {
        if rest.is_empty() {
            map.insert(Value::from(*first), value);
            return;
        }
        match map.get_mut(*first) {
            Some(child) => set_in(child, rest, value),
            None => {
                let mut child = Value::Mapping(Mapping::new());
                set_in(&mut child, rest, value);
                map.insert(Value::from(*first), child);
            }
        }
    }
}

fn remove_in(node: &mut Value, segments: &[&str]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    let map = node.as_mapping_mut()?;
    if rest.is_empty() {
        map.shift_remove(*first)
    } else {
        remove_in(map.get_mut(*first)?, rest)
    }
}
