//! Nested record reconstruction from dot-path headers
//!
//! A delimited source names its columns with dot-paths such as
//! `name.firstName` or `address.city`. Each data line is rebuilt into a
//! [`Record`]: a tree whose internal nodes are mappings created on demand and
//! whose leaves are the raw, untyped column values.
//!
//! ```
//! use census_common::record::{build, HeaderSchema, Node};
//!
//! let schema = HeaderSchema::parse("name.firstName,name.lastName,address.city");
//! let record = build(&schema, &["Ada", "Lovelace", "London"]);
//!
//! let name = record.branch("name").unwrap();
//! assert_eq!(name.leaf("firstName"), Some("Ada"));
//! assert!(matches!(record.get("address"), Some(Node::Branch(_))));
//! ```

use indexmap::IndexMap;
use serde_json::Value;

/// Separator between columns of a line.
pub const FIELD_DELIMITER: char = ',';

/// Separator between the segments of a header path.
pub const PATH_SEPARATOR: char = '.';

/// Splits a line on [`FIELD_DELIMITER`].
///
/// There is no quoting or escaping: a delimiter inside a value starts a new
/// column.
pub fn split_fields(line: &str) -> impl Iterator<Item = &str> + '_ {
    line.split(FIELD_DELIMITER)
}

// ============================================================================
// Header Schema
// ============================================================================

/// A header split into its path segments, e.g. `["name", "firstName"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Splits a header on [`PATH_SEPARATOR`]. Segments are kept verbatim,
    /// including empty ones.
    pub fn parse(header: &str) -> Self {
        Self {
            segments: header.split(PATH_SEPARATOR).map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment, which names the leaf.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Ordered column paths taken from the header line of a source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderSchema {
    paths: Vec<FieldPath>,
}

impl HeaderSchema {
    /// Parses a header line.
    pub fn parse(line: &str) -> Self {
        Self::from_headers(split_fields(line))
    }

    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: headers
                .into_iter()
                .map(|header| FieldPath::parse(header.as_ref()))
                .collect(),
        }
    }

    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

// ============================================================================
// Record Tree
// ============================================================================

/// A node of a [`Record`] tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Raw column value
    Leaf(String),
    /// Mapping created while walking a header path
    Branch(Record),
}

impl Node {
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Record> {
        match self {
            Node::Branch(record) => Some(record),
            Node::Leaf(_) => None,
        }
    }

    /// The mapping held by this node. A leaf is first turned into an empty
    /// mapping.
    fn branch_or_reset(&mut self) -> &mut Record {
        match self {
            Node::Branch(record) => record,
            Node::Leaf(_) => {
                *self = Node::Branch(Record::new());
                self.branch_or_reset()
            },
        }
    }

    /// Renders the node as JSON; leaves become strings.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Leaf(value) => Value::String(value.clone()),
            Node::Branch(record) => record.to_json(),
        }
    }
}

/// A string-keyed mapping rebuilt from one line. Keys keep the order in which
/// they were first written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: IndexMap<String, Node>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields.get(key)
    }

    /// Top-level leaf value, if `key` holds a leaf.
    pub fn leaf(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_leaf)
    }

    /// Top-level mapping, if `key` holds one.
    pub fn branch(&self, key: &str) -> Option<&Record> {
        self.get(key).and_then(Node::as_branch)
    }

    /// Follows `path` from this record.
    pub fn lookup(&self, path: &FieldPath) -> Option<&Node> {
        let (last, parents) = path.segments().split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.branch(segment)?;
        }
        current.get(last)
    }

    /// Returns the mapping stored under `key`, creating it when absent.
    ///
    /// A leaf already stored under `key` is replaced by an empty mapping.
    pub fn branch_mut(&mut self, key: &str) -> &mut Record {
        self.fields
            .entry(key.to_string())
            .or_insert_with(|| Node::Branch(Record::new()))
            .branch_or_reset()
    }

    /// Writes `value` at `path`, creating intermediate mappings. An existing
    /// node at exactly `path` is overwritten.
    pub fn set(&mut self, path: &FieldPath, value: impl Into<String>) {
        let Some((last, parents)) = path.segments().split_last() else {
            return;
        };

        let mut current = self;
        for segment in parents {
            current = current.branch_mut(segment);
        }
        current.fields.insert(last.clone(), Node::Leaf(value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders the record as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, node)| (key.clone(), node.to_json()))
                .collect(),
        )
    }
}

/// Rebuilds one line into a [`Record`].
///
/// Columns pair positionally with `schema`; when the lengths differ the
/// surplus on either side is ignored. Later columns win when two headers
/// address the same node.
pub fn build<S: AsRef<str>>(schema: &HeaderSchema, values: &[S]) -> Record {
    let mut record = Record::new();
    for (path, value) in schema.paths().iter().zip(values) {
        record.set(path, value.as_ref());
    }
    record
}
