//! JSON output formatting
//!
//! Everything printed with `--format json` is wrapped in one envelope:
//! `{"data": ..., "meta": {"generatedAt", "version", "count"?}}`.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<'a, T: ?Sized> {
    data: &'a T,
    meta: Meta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    generated_at: DateTime<Utc>,
    version: &'static str,
    /// Only present for collections
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

impl Meta {
    fn now(count: Option<usize>) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            count,
        }
    }
}

/// Format a single value inside the envelope.
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope {
        data,
        meta: Meta::now(None),
    })
}

/// Format a collection inside the envelope, recording its length.
pub fn format_json_list<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope {
        data: items,
        meta: Meta::now(Some(items.len())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Belt {
        rank: u8,
        color_name: String,
    }

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn test_list_envelope_counts_items() {
        let belts = vec![
            Belt {
                rank: 1,
                color_name: "white".to_string(),
            },
            Belt {
                rank: 2,
                color_name: "yellow".to_string(),
            },
        ];

        let value = parse(&format_json_list(&belts).unwrap());
        assert_eq!(value["data"][1]["colorName"], "yellow");
        assert_eq!(value["meta"]["count"], 2);
        assert_eq!(value["meta"]["version"], env!("CARGO_PKG_VERSION"));
        assert!(value["meta"]["generatedAt"].is_string());
    }

    #[test]
    fn test_empty_list_is_empty_array() {
        let value = parse(&format_json_list::<Belt>(&[]).unwrap());
        assert_eq!(value["data"], Value::Array(vec![]));
        assert_eq!(value["meta"]["count"], 0);
    }

    #[test]
    fn test_single_value_has_no_count() {
        let belt = Belt {
            rank: 10,
            color_name: "black".to_string(),
        };

        let value = parse(&format_json(&belt).unwrap());
        assert_eq!(value["data"]["rank"], 10);
        assert!(value["meta"].get("count").is_none());
    }
}
