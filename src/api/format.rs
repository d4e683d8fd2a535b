//! Row to wire conversion. Date columns are rendered for display; every other
//! column passes through untouched.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::entities::{parse_date, TableDescriptor};

/// Render a timestamp with a chrono pattern, in UTC
pub fn format_datetime(dt: DateTime<Utc>, pattern: &str) -> String {
    dt.format(pattern).to_string()
}

/// Render a stored date value; anything that is not a parseable date
/// (including null) comes back unchanged
pub fn format_date_value(value: &Value, pattern: &str) -> Value {
    match value.as_str().and_then(parse_date) {
        Some(dt) => Value::String(format_datetime(dt, pattern)),
        None => value.clone(),
    }
}

/// Convert a stored row into its public shape
pub fn row_to_api_value(table: &TableDescriptor, row: &Map<String, Value>, pattern: &str) -> Value {
    let date_columns = table.date_columns();
    let rendered = row
        .iter()
        .map(|(k, v)| {
            if date_columns.contains(&k.as_str()) {
                (k.clone(), format_date_value(v, pattern))
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect();
    Value::Object(rendered)
}

pub fn rows_to_api_values(table: &TableDescriptor, rows: &[Map<String, Value>], pattern: &str) -> Vec<Value> {
    rows.iter().map(|row| row_to_api_value(table, row, pattern)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DATE_FORMAT;
    use crate::entities::TASK;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn default_pattern_matches_short_display_form() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 15, 42, 10).unwrap();
        assert_eq!(format_datetime(dt, DEFAULT_DATE_FORMAT), "Mar 5, 2024 3 PM");

        let midnight = Utc.with_ymd_and_hms(2023, 12, 25, 0, 5, 0).unwrap();
        assert_eq!(format_datetime(midnight, DEFAULT_DATE_FORMAT), "Dec 25, 2023 12 AM");
    }

    #[test]
    fn only_date_columns_are_rendered() {
        let row = json!({
            "id": 1,
            "name": "2024-01-01",
            "dueDate": "2024-01-02T13:00:00.000000Z",
            "createdAt": null
        });
        let out = row_to_api_value(&TASK, row.as_object().unwrap(), DEFAULT_DATE_FORMAT);
        assert_eq!(out["name"], json!("2024-01-01"));
        assert_eq!(out["dueDate"], json!("Jan 2, 2024 1 PM"));
        assert_eq!(out["createdAt"], Value::Null);
        assert_eq!(out["id"], json!(1));
    }

    #[test]
    fn pattern_is_configurable() {
        let v = format_date_value(&json!("2024-07-04T09:00:00Z"), "%Y/%m/%d");
        assert_eq!(v, json!("2024/07/04"));
        assert_eq!(format_date_value(&json!(12), "%Y"), json!(12));
    }
}
