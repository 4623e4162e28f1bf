//! Response Bounding
//!
//! Every tool payload leaves through [`ResponseLimits::bound`]. Long strings
//! are clipped, containers capped, and a payload that is still over the
//! total ceiling is cut down until it fits.

use serde_json::{json, Map, Value};

use crate::error::LexiconError;

pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Identifiers a caller needs even when the rest of a payload is dropped
const KEPT_ON_FALLBACK: [&str; 3] = ["plan_id", "code", "target_path"];

/// Size ceilings for a single tool response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseLimits {
    /// Maximum characters in any string field
    pub max_string_chars: usize,

    /// Maximum items in any array
    pub max_list_items: usize,

    /// Maximum keys in any object
    pub max_object_keys: usize,

    /// Maximum serialized size in bytes
    pub max_total_bytes: usize,
}

impl Default for ResponseLimits {
    fn default() -> Self {
        Self {
            max_string_chars: 1000,
            max_list_items: 25,
            max_object_keys: 50,
            max_total_bytes: 16 * 1024,
        }
    }
}

impl ResponseLimits {
    /// Clip `payload` until it satisfies every limit
    pub fn bound(&self, payload: Value) -> Value {
        let mut bounded = self.clip(payload.clone(), self.max_list_items);
        let mut size = serialized_len(&bounded);
        if size <= self.max_total_bytes {
            return bounded;
        }

        let original_size = size;
        let mut list_cap = self.max_list_items;
        while size > self.max_total_bytes && list_cap > 1 {
            list_cap /= 2;
            bounded = mark_truncated(self.clip(payload.clone(), list_cap));
            size = serialized_len(&bounded);
        }

        if size > self.max_total_bytes {
            let err = LexiconError::ResponseTooLarge {
                size: original_size,
                limit: self.max_total_bytes,
            };
            tracing::warn!(%err, "Replacing oversized response with a summary");
            return self.fallback(&payload, &err);
        }

        tracing::debug!(original_size, size, "Truncated response lists to fit");
        bounded
    }

    /// Status-only replacement that still carries the caller's handles
    fn fallback(&self, payload: &Value, err: &LexiconError) -> Value {
        let mut summary = Map::new();
        summary.insert(
            "status".into(),
            payload.get("status").cloned().unwrap_or_else(|| json!("truncated")),
        );
        for key in KEPT_ON_FALLBACK {
            if let Some(value) = payload.get(key).filter(|v| !v.is_object() && !v.is_array()) {
                summary.insert(key.into(), self.clip(value.clone(), 1));
            }
        }
        summary.insert("truncated".into(), Value::Bool(true));
        summary.insert("message".into(), Value::String(err.user_message()));

        if serialized_len(&Value::Object(summary.clone())) > self.max_total_bytes {
            summary.remove("message");
        }
        Value::Object(summary)
    }

    fn clip(&self, value: Value, list_cap: usize) -> Value {
        match value {
            Value::String(s) => Value::String(clip_string(s, self.max_string_chars)),
            Value::Array(items) => {
                let total = items.len();
                let mut clipped: Vec<Value> = items
                    .into_iter()
                    .take(list_cap)
                    .map(|item| self.clip(item, list_cap))
                    .collect();
                if total > list_cap {
                    clipped.push(Value::String(format!("... {} more items", total - list_cap)));
                }
                Value::Array(clipped)
            }
            Value::Object(map) => {
                let total = map.len();
                let mut clipped: Map<String, Value> = map
                    .into_iter()
                    .take(self.max_object_keys)
                    .map(|(key, item)| (key, self.clip(item, list_cap)))
                    .collect();
                if total > self.max_object_keys {
                    clipped.insert(
                        "_omitted_keys".into(),
                        Value::from(total - self.max_object_keys),
                    );
                }
                Value::Object(clipped)
            }
            scalar => scalar,
        }
    }
}

fn clip_string(s: String, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s;
    }
    let keep = max_chars.saturating_sub(TRUNCATION_MARKER.chars().count());
    let mut clipped: String = s.chars().take(keep).collect();
    clipped.push_str(TRUNCATION_MARKER);
    clipped
}

fn mark_truncated(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.insert("truncated".into(), Value::Bool(true));
    }
    value
}

fn serialized_len(value: &Value) -> usize {
    serde_json::to_vec(value).map_or(usize::MAX, |bytes| bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_payload_untouched() {
        let payload = json!({"status": "success", "results": [1, 2, 3]});
        assert_eq!(ResponseLimits::default().bound(payload.clone()), payload);
    }

    #[test]
    fn test_long_strings_clipped() {
        let limits = ResponseLimits::default();
        let bounded = limits.bound(json!({"summary": "x".repeat(5000)}));
        let summary = bounded["summary"].as_str().unwrap();
        assert_eq!(summary.chars().count(), 1000);
        assert!(summary.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_lists_capped() {
        let limits = ResponseLimits::default();
        let items: Vec<u32> = (0..100).collect();
        let bounded = limits.bound(json!({"results": items}));
        let results = bounded["results"].as_array().unwrap();
        assert_eq!(results.len(), 26);
        assert_eq!(results[25], json!("... 75 more items"));
    }

    #[test]
    fn test_total_ceiling_enforced() {
        let limits = ResponseLimits {
            max_total_bytes: 2048,
            ..Default::default()
        };
        let rows: Vec<String> = (0..25).map(|i| format!("{i}-{}", "y".repeat(900))).collect();
        let bounded = limits.bound(json!({"status": "success", "results": rows}));

        assert!(serde_json::to_vec(&bounded).unwrap().len() <= 2048);
        assert_eq!(bounded["truncated"], json!(true));
        assert_eq!(bounded["status"], json!("success"));
    }

    #[test]
    fn test_unfittable_payload_becomes_summary() {
        let limits = ResponseLimits {
            max_total_bytes: 256,
            ..Default::default()
        };
        let bounded = limits.bound(json!({"status": "success", "blob": "z".repeat(900)}));
        assert_eq!(bounded["truncated"], json!(true));
        assert_eq!(bounded["status"], json!("success"));
        assert!(bounded.get("blob").is_none());
    }

    #[test]
    fn test_truncation_flag_counts_toward_ceiling() {
        let limits = ResponseLimits {
            max_total_bytes: 2048,
            ..Default::default()
        };
        for pad in 0..400 {
            let rows: Vec<String> = (0..25).map(|i| format!("{i}-{}", "p".repeat(pad))).collect();
            let bounded = limits.bound(json!({"status": "success", "results": rows}));
            let size = serde_json::to_vec(&bounded).unwrap().len();
            assert!(size <= 2048, "pad {pad} produced {size} bytes");
        }
    }

    #[test]
    fn test_summary_keeps_confirmation_handle() {
        let limits = ResponseLimits {
            max_total_bytes: 256,
            ..Default::default()
        };
        let bounded = limits.bound(json!({
            "status": "confirmation_required",
            "plan_id": "plan-42",
            "target_path": "exterior.sunroof",
            "new_value": {"blob": "z".repeat(900)},
        }));

        assert_eq!(bounded["status"], json!("confirmation_required"));
        assert_eq!(bounded["plan_id"], json!("plan-42"));
        assert_eq!(bounded["target_path"], json!("exterior.sunroof"));
        assert_eq!(bounded["truncated"], json!(true));
        assert!(bounded.get("new_value").is_none());
        assert!(serde_json::to_vec(&bounded).unwrap().len() <= 256);
    }

    #[test]
    fn test_summary_keeps_error_code() {
        let limits = ResponseLimits {
            max_total_bytes: 200,
            ..Default::default()
        };
        let bounded = limits.bound(json!({
            "status": "error",
            "code": "UNKNOWN_CONFIRMATION_ID",
            "valid_ids": ["a".repeat(300)],
        }));
        assert_eq!(bounded["code"], json!("UNKNOWN_CONFIRMATION_ID"));
    }
}
