//! Document Indexing
//!
//! Builds the path index (path -> entry) and the keyword index
//! (keyword -> paths) for one document version. Building is a pure
//! function of the document: the session throws the index away together
//! with the document it was built from.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use crate::keyword::extract_keywords;
use crate::path::DocPath;

/// Runtime type of an indexed node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl NodeKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
        }
    }
}

/// One indexed node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathEntry {
    pub path: DocPath,
    pub parent: DocPath,
    pub kind: NodeKind,
}

/// Path and keyword indexes over a single document version
#[derive(Debug)]
pub struct DocumentIndex {
    document: Arc<Value>,
    paths: IndexMap<String, PathEntry>,
    keywords: IndexMap<String, IndexSet<String>>,
}

impl DocumentIndex {
    /// Index every mapping key and sequence element of `document`
    pub fn build(document: Arc<Value>) -> Self {
        let mut index = Self {
            document: Arc::clone(&document),
            paths: IndexMap::new(),
            keywords: IndexMap::new(),
        };
        index.walk(&document, &DocPath::root());

        tracing::debug!(
            paths = index.paths.len(),
            keywords = index.keywords.len(),
            "Built lexicon index"
        );
        index
    }

    fn walk(&mut self, node: &Value, path: &DocPath) {
        match node {
            Value::Object(map) => {
                for (key, child) in map {
                    let child_path = path.key(key.as_str());
                    self.insert(&child_path, path, child);

                    let path_str = child_path.to_string();
                    self.add_keywords(key, &path_str);
                    if let Some(description) = description_of(child) {
                        self.add_keywords(description, &path_str);
                    }

                    self.walk(child, &child_path);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    let child_path = path.index(i);
                    self.insert(&child_path, path, child);

                    if let Some(description) = description_of(child) {
                        self.add_keywords(description, &child_path.to_string());
                    }

                    self.walk(child, &child_path);
                }
            }
            _ => {}
        }
    }

    fn insert(&mut self, path: &DocPath, parent: &DocPath, node: &Value) {
        self.paths.insert(
            path.to_string(),
            PathEntry {
                path: path.clone(),
                parent: parent.clone(),
                kind: NodeKind::of(node),
            },
        );
    }

    fn add_keywords(&mut self, text: &str, path: &str) {
        for keyword in extract_keywords(text) {
            self.keywords
                .entry(keyword)
                .or_default()
                .insert(path.to_string());
        }
    }

    /// The document this index was built from
    pub fn document(&self) -> &Arc<Value> {
        &self.document
    }

    pub fn entry(&self, path: &str) -> Option<&PathEntry> {
        self.paths.get(path)
    }

    /// Node at an indexed path
    pub fn node(&self, path: &str) -> Option<&Value> {
        self.paths.get(path)?.path.resolve(&self.document)
    }

    pub fn paths(&self) -> impl Iterator<Item = (&str, &PathEntry)> {
        self.paths.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    /// Paths that produced `keyword`
    pub fn lookup(&self, keyword: &str) -> Option<&IndexSet<String>> {
        self.keywords.get(keyword)
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.keywords.iter().map(|(keyword, paths)| (keyword.as_str(), paths))
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

fn description_of(node: &Value) -> Option<&str> {
    node.as_object()?.get("description")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Arc<Value> {
        Arc::new(json!({
            "interior": {
                "leather_seats": {
                    "description": "Heated leather seating",
                    "available": true,
                    "price": 1500
                },
                "ambientLighting": {"price": 300}
            },
            "packages": [
                {"name": "Winter", "description": "Cold weather package"},
                "plain"
            ]
        }))
    }

    #[test]
    fn test_paths_cover_every_key_and_element() {
        let index = DocumentIndex::build(sample());
        let paths: Vec<&str> = index.paths().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec![
                "interior",
                "interior.leather_seats",
                "interior.leather_seats.description",
                "interior.leather_seats.available",
                "interior.leather_seats.price",
                "interior.ambientLighting",
                "interior.ambientLighting.price",
                "packages",
                "packages[0]",
                "packages[0].name",
                "packages[0].description",
                "packages[1]",
            ]
        );

        let entry = index.entry("packages[0].name").unwrap();
        assert_eq!(entry.parent.to_string(), "packages[0]");
        assert_eq!(entry.kind, NodeKind::String);
        assert_eq!(index.entry("packages").unwrap().kind, NodeKind::Array);
    }

    #[test]
    fn test_keywords_from_keys_and_descriptions() {
        let index = DocumentIndex::build(sample());

        let heated = index.lookup("heated").unwrap();
        assert!(heated.contains("interior.leather_seats"));

        let seats = index.lookup("seats").unwrap();
        assert!(seats.contains("interior.leather_seats"));

        assert!(index.lookup("ambient").unwrap().contains("interior.ambientLighting"));
        assert!(index.lookup("weather").unwrap().contains("packages[0]"));

        let price = index.lookup("price").unwrap();
        assert_eq!(price.len(), 2);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let doc = sample();
        let first = DocumentIndex::build(Arc::clone(&doc));
        let second = DocumentIndex::build(doc);

        let a: Vec<_> = first.paths().collect();
        let b: Vec<_> = second.paths().collect();
        assert_eq!(a, b);

        let a: Vec<_> = first.keywords().collect();
        let b: Vec<_> = second.keywords().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_path_resolves_to_its_node() {
        let doc = sample();
        let index = DocumentIndex::build(Arc::clone(&doc));

        for (path, entry) in index.paths() {
            let reparsed = DocPath::parse(path).unwrap();
            assert_eq!(&reparsed, &entry.path);

            let node = reparsed.resolve(&doc).unwrap();
            assert_eq!(Some(node), index.node(path));
            assert_eq!(NodeKind::of(node), entry.kind);
        }
    }

    #[test]
    fn test_scalar_document_has_empty_index() {
        let index = DocumentIndex::build(Arc::new(json!(42)));
        assert_eq!(index.path_count(), 0);
        assert_eq!(index.keyword_count(), 0);
    }
}
