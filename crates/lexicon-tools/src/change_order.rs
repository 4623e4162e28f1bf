//! Change Orders
//!
//! After a confirmed modification the before/after pair is handed to an
//! external generator. The modification is already applied by then, so a
//! failure here is reported next to the result and never rolls it back.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{LexiconError, Result};
use crate::path::DocPath;

/// Change-order generator trait (Strategy pattern)
#[async_trait]
pub trait ChangeOrderGenerator: Send + Sync {
    async fn generate(&self, original: &Value, modified: &Value) -> Result<Value>;

    fn name(&self) -> &str;
}

/// Posts `{original, modified}` to a change-order endpoint
pub struct HttpChangeOrderGenerator {
    client: reqwest::Client,
    url: String,
}

impl HttpChangeOrderGenerator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl ChangeOrderGenerator for HttpChangeOrderGenerator {
    async fn generate(&self, original: &Value, modified: &Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({"original": original, "modified": modified}))
            .send()
            .await
            .map_err(|e| LexiconError::ChangeOrder(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LexiconError::ChangeOrder(format!("service returned {status}")));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| LexiconError::ChangeOrder(e.to_string()))
    }

    fn name(&self) -> &str {
        "HttpChangeOrderService"
    }
}

/// How a path differs between two document versions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
}

/// One differing path
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub path: String,
    pub change: DiffKind,
}

/// Paths that differ between `before` and `after`, outermost first
pub fn diff(before: &Value, after: &Value) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    diff_at(before, after, &DocPath::root(), &mut entries);
    entries
}

fn diff_at(before: &Value, after: &Value, path: &DocPath, out: &mut Vec<DiffEntry>) {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            for (key, old_child) in old {
                match new.get(key) {
                    Some(new_child) => diff_at(old_child, new_child, &path.key(key.as_str()), out),
                    None => out.push(DiffEntry {
                        path: path.key(key.as_str()).to_string(),
                        change: DiffKind::Removed,
                    }),
                }
            }
            for key in new.keys().filter(|k| !old.contains_key(*k)) {
                out.push(DiffEntry {
                    path: path.key(key.as_str()).to_string(),
                    change: DiffKind::Added,
                });
            }
        }
        (Value::Array(old), Value::Array(new)) => {
            for (i, old_child) in old.iter().enumerate() {
                match new.get(i) {
                    Some(new_child) => diff_at(old_child, new_child, &path.index(i), out),
                    None => out.push(DiffEntry {
                        path: path.index(i).to_string(),
                        change: DiffKind::Removed,
                    }),
                }
            }
            for i in old.len()..new.len() {
                out.push(DiffEntry {
                    path: path.index(i).to_string(),
                    change: DiffKind::Added,
                });
            }
        }
        (old, new) if old != new => out.push(DiffEntry {
            path: path.to_string(),
            change: DiffKind::Modified,
        }),
        _ => {}
    }
}

/// Local generator that records the structural diff
#[derive(Default)]
pub struct MockChangeOrderGenerator;

#[async_trait]
impl ChangeOrderGenerator for MockChangeOrderGenerator {
    async fn generate(&self, original: &Value, modified: &Value) -> Result<Value> {
        let changes = diff(original, modified);
        Ok(json!({
            "change_order_id": format!("co_{}", Uuid::new_v4().simple()),
            "created_at": Utc::now().to_rfc3339(),
            "change_count": changes.len(),
            "changes": changes,
        }))
    }

    fn name(&self) -> &str {
        "MockChangeOrderService"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_reports_each_kind() {
        let before = json!({
            "interior": {"leather_seats": {"price": 1500}, "mats": true},
            "packages": ["winter"]
        });
        let after = json!({
            "interior": {"leather_seats": {"price": 1600}, "trim": "oak"},
            "packages": ["winter", "sport"]
        });

        let changes = diff(&before, &after);
        assert_eq!(
            changes,
            vec![
                DiffEntry { path: "interior.leather_seats.price".into(), change: DiffKind::Modified },
                DiffEntry { path: "interior.mats".into(), change: DiffKind::Removed },
                DiffEntry { path: "interior.trim".into(), change: DiffKind::Added },
                DiffEntry { path: "packages[1]".into(), change: DiffKind::Added },
            ]
        );
        assert!(diff(&before, &before).is_empty());
    }

    #[tokio::test]
    async fn test_mock_generator() {
        let order = MockChangeOrderGenerator
            .generate(&json!({"a": 1}), &json!({"a": 2}))
            .await
            .unwrap();
        assert_eq!(order["change_count"], 1);
        assert!(order["change_order_id"].as_str().unwrap().starts_with("co_"));
    }
}
