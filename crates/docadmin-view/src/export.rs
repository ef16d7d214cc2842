//! CSV export of the audit view.

use docadmin_entity::audit::AuditLogEntry;

use crate::format::format_timestamp;

/// Header row of the audit export.
pub const AUDIT_CSV_HEADER: &str = "Date,User,Event,Severity,Details";

/// Render entries as CSV, one row per entry, in the given order.
///
/// Details are the compact JSON of the entry's details with every quote
/// doubled, wrapped in quotes. Unparseable timestamps leave the date empty.
pub fn audit_csv(entries: &[AuditLogEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(AUDIT_CSV_HEADER.to_string());

    for entry in entries {
        let date = entry.occurred_at().map(format_timestamp).unwrap_or_default();
        let row = [
            csv_field(&date),
            csv_field(entry.user_id.as_deref().unwrap_or_default()),
            csv_field(entry.event_type.as_str()),
            csv_field(entry.severity.map(|s| s.as_str()).unwrap_or_default()),
            quoted(&entry.details_json()),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// File name for an export produced on `date` (`YYYY-MM-DD`).
pub fn audit_csv_filename(date: chrono::NaiveDate) -> String {
    format!("audit-logs-{}.csv", date.format("%Y-%m-%d"))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quoted(value)
    } else {
        value.to_string()
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_header() {
        let entries: Vec<AuditLogEntry> = serde_json::from_value(serde_json::json!([
            {
                "timestamp": "2025-03-01T10:15:00.123456",
                "user_id": "uid-7",
                "event_type": "AUTHENTICATION",
                "severity": "WARNING",
                "details": {"action": "LOGIN_FAILED", "email": "a@b.c"}
            },
            {"event_type": "SEARCH", "details": null}
        ]))
        .unwrap();

        let csv = audit_csv(&entries);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,User,Event,Severity,Details");
        assert_eq!(
            lines[1],
            r#"2025-03-01T10:15:00.123Z,uid-7,AUTHENTICATION,WARNING,"{""action"":""LOGIN_FAILED"",""email"":""a@b.c""}""#
        );
        assert_eq!(lines[2], r#",,SEARCH,,"null""#);
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn test_filename() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(audit_csv_filename(date), "audit-logs-2025-03-09.csv");
    }
}
