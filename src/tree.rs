//! Content tree: a nested, ordered mapping of books and sections.
//!
//! Attribute keys are resolved once when the tree is built from JSON, so
//! traversal never inspects key names again.

use crate::mode::CountingMode;
use crate::numerals::{GERESH, from_hebrew_numeral};
use crate::persistence::{PersistenceError, PersistenceResult};
use crate::units::PageLabel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Separator used when displaying a node path.
pub const PATH_SEPARATOR: &str = " / ";

/// Key names recognised in the source JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSchema {
    pub chapter_count_keys: Vec<String>,
    pub unit_count_keys: Vec<String>,
    pub page_length_keys: Vec<String>,
    pub first_page_keys: Vec<String>,
    pub last_page_keys: Vec<String>,
    /// Name prefixes marking a child as an explicit chapter, e.g. "פרק ".
    pub chapter_prefixes: Vec<String>,
}

impl Default for TreeSchema {
    fn default() -> Self {
        fn keys(names: &[&str]) -> Vec<String> {
            names.iter().map(|name| name.to_string()).collect()
        }
        Self {
            chapter_count_keys: keys(&["פרקים", "chapterCount"]),
            unit_count_keys: keys(&["משניות", "unitCount"]),
            page_length_keys: keys(&["אורך בדפים", "pageLength"]),
            first_page_keys: keys(&["עמוד ראשון", "firstPage"]),
            last_page_keys: keys(&["עמוד אחרון", "lastPage", "lastPageLabel"]),
            chapter_prefixes: keys(&["פרק ", "chap "]),
        }
    }
}

impl TreeSchema {
    fn is_attribute_key(&self, key: &str) -> bool {
        [
            &self.chapter_count_keys,
            &self.unit_count_keys,
            &self.page_length_keys,
            &self.first_page_keys,
            &self.last_page_keys,
        ]
        .iter()
        .any(|keys| keys.iter().any(|k| k == key))
    }

    /// Chapter number for a child named like "פרק ג" or "chap 3".
    ///
    /// Returns `None` when the name has no chapter prefix or its suffix is
    /// not a positive number, so "chap intro" stays an ordinary section. A
    /// trailing geresh ("פרק ה׳") never means thousands here.
    pub fn chapter_number(&self, name: &str) -> Option<u32> {
        let suffix = self
            .chapter_prefixes
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix.as_str()))?
            .trim()
            .trim_end_matches(['\'', GERESH]);
        let number = suffix
            .parse::<u32>()
            .unwrap_or_else(|_| from_hebrew_numeral(suffix));
        (number > 0).then_some(number)
    }
}

/// Count attributes carried by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeAttributes {
    pub chapter_count: Option<u32>,
    pub unit_count: Option<u32>,
    pub page_length: Option<f64>,
    pub first_page: Option<u32>,
    pub last_page: Option<PageLabel>,
}

impl NodeAttributes {
    pub fn is_empty(&self) -> bool {
        self == &NodeAttributes::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Section,
    /// Explicit chapter child with its numeric value.
    Chapter(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentNode {
    name: String,
    kind: NodeKind,
    attributes: NodeAttributes,
    children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn new(name: impl Into<String>, attributes: NodeAttributes) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Section,
            attributes,
            children: Vec::new(),
        }
    }

    /// Add a child, classifying it as a chapter when its name matches `schema`.
    pub fn with_child(mut self, mut child: ContentNode, schema: &TreeSchema) -> Self {
        if let Some(number) = schema.chapter_number(&child.name) {
            child.kind = NodeKind::Chapter(number);
        }
        self.children.push(child);
        self
    }

    fn from_map(name: &str, map: &Map<String, Value>, schema: &TreeSchema) -> Self {
        let mut node = ContentNode::new(name, read_attributes(name, map, schema));
        for (key, value) in map {
            match value {
                Value::Object(child) => {
                    node = node.with_child(ContentNode::from_map(key, child, schema), schema);
                }
                _ if schema.is_attribute_key(key) => {}
                _ => warn!(node = name, key = key.as_str(), "ignoring non-object entry"),
            }
        }
        node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_chapter(&self) -> bool {
        matches!(self.kind, NodeKind::Chapter(_))
    }

    pub fn chapter_number(&self) -> Option<u32> {
        match self.kind {
            NodeKind::Chapter(number) => Some(number),
            NodeKind::Section => None,
        }
    }

    pub fn attributes(&self) -> &NodeAttributes {
        &self.attributes
    }

    pub fn children(&self) -> &[ContentNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&ContentNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Explicit chapter children ordered by chapter number (stable for ties).
    pub fn chapter_children(&self) -> Vec<&ContentNode> {
        let mut chapters: Vec<&ContentNode> =
            self.children.iter().filter(|c| c.is_chapter()).collect();
        chapters.sort_by_key(|c| c.chapter_number().unwrap_or(0));
        chapters
    }

    /// Non-chapter children in source order.
    pub fn sections(&self) -> impl Iterator<Item = &ContentNode> {
        self.children.iter().filter(|c| !c.is_chapter())
    }

    fn has_chapter_children(&self) -> bool {
        self.children.iter().any(ContentNode::is_chapter)
    }

    /// This node's own contribution for `mode`, excluding its children.
    ///
    /// In chapters mode explicit chapter children count one each and take
    /// precedence over a `chapterCount` attribute.
    pub fn own_length(&self, mode: CountingMode) -> f64 {
        match mode {
            CountingMode::Chapters => {
                let explicit = self.children.iter().filter(|c| c.is_chapter()).count();
                if explicit > 0 {
                    explicit as f64
                } else {
                    f64::from(self.attributes.chapter_count.unwrap_or(0))
                }
            }
            CountingMode::Units => f64::from(self.attributes.unit_count.unwrap_or(0)),
            CountingMode::Pages => self.attributes.page_length.unwrap_or(0.0),
            CountingMode::Leaves => self.attributes.page_length.unwrap_or(0.0) * 2.0,
        }
    }

    /// Own contribution plus the aggregate of every child.
    pub fn aggregate_length(&self, mode: CountingMode) -> f64 {
        self.own_length(mode)
            + self
                .children
                .iter()
                .map(|child| child.aggregate_length(mode))
                .sum::<f64>()
    }

    pub fn has_relevant_data(&self, mode: CountingMode) -> bool {
        let own = match mode {
            CountingMode::Chapters => {
                self.attributes.chapter_count.is_some() || self.has_chapter_children()
            }
            CountingMode::Units => self.attributes.unit_count.is_some(),
            CountingMode::Pages | CountingMode::Leaves => self.attributes.page_length.is_some(),
        };
        own || self
            .children
            .iter()
            .any(|child| child.has_relevant_data(mode))
    }
}

fn read_attributes(node: &str, map: &Map<String, Value>, schema: &TreeSchema) -> NodeAttributes {
    let lookup = |keys: &[String]| keys.iter().find_map(|key| map.get(key));
    let count = |keys: &[String]| {
        lookup(keys)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };

    let last_page = lookup(&schema.last_page_keys).and_then(|value| {
        let label = value.as_str().and_then(PageLabel::parse);
        if label.is_none() {
            warn!(node, value = %value, "unreadable last page label");
        }
        label
    });

    let first_page = count(&schema.first_page_keys).filter(|&leaf| {
        if leaf == 0 {
            warn!(node, "first page must be at least 1, using the default");
        }
        leaf > 0
    });

    NodeAttributes {
        chapter_count: count(&schema.chapter_count_keys),
        unit_count: count(&schema.unit_count_keys),
        page_length: lookup(&schema.page_length_keys)
            .and_then(Value::as_f64)
            .filter(|len| *len >= 0.0),
        first_page,
        last_page,
    }
}

/// Split a slash-delimited selection path into trimmed components.
pub fn parse_path(path: &str) -> Vec<String> {
    path.split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn display_path<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// The whole loaded dataset. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTree {
    root: ContentNode,
    #[serde(skip)]
    schema: TreeSchema,
}

impl ContentTree {
    pub fn new(root: ContentNode, schema: TreeSchema) -> Self {
        Self { root, schema }
    }

    pub fn from_json_value(value: &Value, schema: TreeSchema) -> PersistenceResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            PersistenceError::InvalidData("content tree root must be a JSON object".to_string())
        })?;
        let root = ContentNode::from_map("", map, &schema);
        Ok(Self { root, schema })
    }

    pub fn from_json_str(json: &str, schema: TreeSchema) -> PersistenceResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value, schema)
    }

    pub fn root(&self) -> &ContentNode {
        &self.root
    }

    pub fn schema(&self) -> &TreeSchema {
        &self.schema
    }

    /// Top-level entries in source order.
    pub fn top_level(&self) -> &[ContentNode] {
        self.root.children()
    }

    pub fn node_at<S: AsRef<str>>(&self, parts: &[S]) -> Option<&ContentNode> {
        parts
            .iter()
            .try_fold(&self.root, |node, part| node.child(part.as_ref()))
    }

    pub fn node_at_path(&self, path: &str) -> Option<&ContentNode> {
        self.node_at(&parse_path(path))
    }

    /// Sum of aggregate lengths over the selected paths; unknown paths add 0.
    pub fn aggregate_length<S: AsRef<str>>(&self, paths: &[S], mode: CountingMode) -> f64 {
        paths
            .iter()
            .filter_map(|path| self.node_at_path(path.as_ref()))
            .map(|node| node.aggregate_length(mode))
            .sum()
    }

    pub fn has_relevant_data<S: AsRef<str>>(&self, paths: &[S], mode: CountingMode) -> bool {
        paths
            .iter()
            .filter_map(|path| self.node_at_path(path.as_ref()))
            .any(|node| node.has_relevant_data(mode))
    }

    /// Counting modes that can be offered for a selection.
    pub fn available_modes<S: AsRef<str>>(&self, paths: &[S]) -> Vec<CountingMode> {
        CountingMode::ALL
            .into_iter()
            .filter(|mode| self.has_relevant_data(paths, *mode))
            .collect()
    }

    /// Display paths (pre-order) of every node whose name contains `query`.
    pub fn search(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        let mut found = Vec::new();
        if query.is_empty() {
            return found;
        }
        let mut path = Vec::new();
        collect_matches(&self.root, query, &mut path, &mut found);
        found
    }
}

fn collect_matches<'a>(
    node: &'a ContentNode,
    query: &str,
    path: &mut Vec<&'a str>,
    found: &mut Vec<String>,
) {
    for child in node.children() {
        path.push(child.name());
        if child.name().contains(query) {
            found.push(display_path(path.as_slice()));
        }
        collect_matches(child, query, path, found);
        path.pop();
    }
}
