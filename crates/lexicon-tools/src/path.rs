//! Document Paths
//!
//! Canonical string form of a node location: mapping keys join with `.`,
//! sequence elements append `[i]`.
//!
//! ```text
//! interior.leather_seats          -> Key(interior) Key(leather_seats)
//! packages[1].options[0].price    -> Key(packages) Index(1) Key(options) Index(0) Key(price)
//! [2].name                        -> Index(2) Key(name)     (root is a sequence)
//! ```

use std::fmt;

use serde_json::Value;

use crate::error::{LexiconError, Result};

/// One step from a container to its child
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Parsed path, empty for the document root
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DocPath {
    steps: Vec<PathStep>,
}

impl DocPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a canonical path string
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: &str| LexiconError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let mut steps = Vec::new();
        if path.is_empty() {
            return Ok(Self { steps });
        }

        for (position, segment) in path.split('.').enumerate() {
            let (name, mut rest) = match segment.find('[') {
                Some(open) => segment.split_at(open),
                None => (segment, ""),
            };

            if name.contains(']') {
                return Err(invalid("unbalanced ']'"));
            }
            if name.is_empty() && (position > 0 || rest.is_empty()) {
                return Err(invalid("empty segment"));
            }
            if !name.is_empty() {
                steps.push(PathStep::Key(name.to_string()));
            }

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| invalid("missing ']'"))?;
                let digits = rest
                    .get(1..close)
                    .filter(|d| !d.is_empty())
                    .ok_or_else(|| invalid("empty index"))?;
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| invalid("index is not a number"))?;
                steps.push(PathStep::Index(index));

                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(invalid("unexpected text after index"));
                }
            }
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Child path under a mapping key
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::Key(key.into()));
        Self { steps }
    }

    /// Child path under a sequence index
    pub fn index(&self, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::Index(index));
        Self { steps }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.steps.split_last()?;
        Some(Self { steps: parent.to_vec() })
    }

    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    /// Nearest mapping key at or above the final step
    pub fn last_key(&self) -> Option<&str> {
        self.steps.iter().rev().find_map(|step| match step {
            PathStep::Key(key) => Some(key.as_str()),
            PathStep::Index(_) => None,
        })
    }

    /// Top-level mapping key
    pub fn first_key(&self) -> Option<&str> {
        match self.steps.first() {
            Some(PathStep::Key(key)) => Some(key.as_str()),
            _ => None,
        }
    }

    /// Walk `root` along this path
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.steps.iter().try_fold(root, |node, step| match (step, node) {
            (PathStep::Key(key), Value::Object(map)) => map.get(key),
            (PathStep::Index(i), Value::Array(items)) => items.get(*i),
            _ => None,
        })
    }

    /// Mutable walk of `root` along this path
    pub fn resolve_mut<'v>(&self, root: &'v mut Value) -> Option<&'v mut Value> {
        self.steps.iter().try_fold(root, |node, step| match (step, node) {
            (PathStep::Key(key), Value::Object(map)) => map.get_mut(key),
            (PathStep::Index(i), Value::Array(items)) => items.get_mut(*i),
            _ => None,
        })
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Key(key) if i == 0 => write!(f, "{key}")?,
                PathStep::Key(key) => write!(f, ".{key}")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for DocPath {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_format() {
        for raw in [
            "interior",
            "interior.leather_seats",
            "packages[1].options[0].price",
            "matrix[0][3]",
            "[2].name",
        ] {
            let path = DocPath::parse(raw).unwrap();
            assert_eq!(path.to_string(), raw);
        }

        let path = DocPath::parse("packages[1].name").unwrap();
        assert_eq!(
            path.steps(),
            &[
                PathStep::Key("packages".into()),
                PathStep::Index(1),
                PathStep::Key("name".into()),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["a..b", "a[", "a[x]", "a[]", "a[0]b", ".a", "a]"] {
            assert!(DocPath::parse(raw).is_err(), "{raw} should not parse");
        }
        assert!(DocPath::parse("").unwrap().is_root());
    }

    #[test]
    fn test_parent_and_keys() {
        let path = DocPath::parse("packages[1].options[0]").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "packages[1].options");
        assert_eq!(path.last(), Some(&PathStep::Index(0)));
        assert_eq!(path.last_key(), Some("options"));
        assert_eq!(path.first_key(), Some("packages"));
        assert!(DocPath::root().parent().is_none());
    }

    #[test]
    fn test_resolve() {
        let doc = json!({"packages": [{"name": "Winter"}, {"name": "Sport", "options": ["a", "b"]}]});

        let path = DocPath::parse("packages[1].options[1]").unwrap();
        assert_eq!(path.resolve(&doc), Some(&json!("b")));
        assert!(DocPath::parse("packages[5]").unwrap().resolve(&doc).is_none());
        assert!(DocPath::parse("packages.name").unwrap().resolve(&doc).is_none());

        let mut doc = doc;
        let name = DocPath::parse("packages[0].name").unwrap();
        *name.resolve_mut(&mut doc).unwrap() = json!("Cold Weather");
        assert_eq!(doc["packages"][0]["name"], "Cold Weather");
    }
}
