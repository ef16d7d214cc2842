//! News item model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::parse_instant;

/// A news item shown on the console front page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Item identifier.
    pub id: u64,
    /// Headline.
    pub title: String,
    /// Publication date (`YYYY-MM-DD`).
    pub date: String,
    /// One-paragraph summary.
    #[serde(default)]
    pub summary: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Estimated reading time, e.g. `"3 min"`.
    #[serde(default, rename = "readTime", skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    /// Pinned to the top of the list.
    #[serde(default)]
    pub featured: bool,
    /// Fields the console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsItem {
    /// Parsed publication instant.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.date)
    }

    /// Parse a JSON array of news items.
    pub fn parse_list(json: &str) -> Result<Vec<Self>, docadmin_core::AppError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let items = NewsItem::parse_list(
            r#"[{"id":1,"title":"Firma del acuerdo","date":"2025-06-25","summary":"s","category":"Acuerdos","readTime":"2 min","featured":true},
                {"id":2,"title":"Biblioteca digital","date":"2025-06-20","category":"Comunicados"}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].featured);
        assert!(!items[1].featured);
        assert!(items[1].published_at().is_some());
    }
}
