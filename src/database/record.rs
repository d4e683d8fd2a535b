use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::database::store::Row;
use crate::entities::{format_timestamp, TableDescriptor};

/// Operation type for record processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// Errors that can occur during Record operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("{table} has no column '{field}'")]
    UnknownField { table: &'static str, field: String },
}

/// Client-supplied column values on their way into storage.
///
/// Audit and lifecycle columns are owned by the server: whatever the client
/// sent for them is overwritten or dropped when the record is stamped.
#[derive(Debug, Clone)]
pub struct Record {
    table: &'static TableDescriptor,
    fields: Row,
    operation: Operation,
}

impl Record {
    /// Create record from API input JSON, keeping only columns of `table`
    pub fn from_json(table: &'static TableDescriptor, json: Value, operation: Operation) -> Result<Self, RecordError> {
        let map = match json {
            Value::Object(map) => map,
            _ => return Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        };

        let mut fields = Row::new();
        for (key, value) in map {
            let column = table.column(&key).ok_or_else(|| RecordError::UnknownField {
                table: table.name,
                field: key.clone(),
            })?;
            fields.insert(column.name.to_string(), column.kind.normalize(&value));
        }
        Ok(Self { table, fields, operation })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Insert stamping: key discarded, row active and not deleted, owned by
    /// the principal, both timestamps at `now`, declared defaults filled in
    pub fn stamp_create(&mut self, principal: i64, now: DateTime<Utc>) -> &mut Self {
        let lifecycle = &self.table.lifecycle;
        let timestamp = Value::String(format_timestamp(now));

        self.fields.remove(self.table.primary_key);
        self.fields.remove(lifecycle.updated_by);
        self.fields.insert(lifecycle.is_active.to_string(), Value::Bool(true));
        self.fields.insert(lifecycle.is_deleted.to_string(), Value::Bool(false));
        self.fields.insert(lifecycle.added_by.to_string(), Value::from(principal));
        self.fields.insert(lifecycle.created_at.to_string(), timestamp.clone());
        self.fields.insert(lifecycle.updated_at.to_string(), timestamp);

        for column in self.table.columns {
            if let Some(default) = column.default {
                let missing = self.fields.get(column.name).map_or(true, Value::is_null);
                if missing {
                    self.fields.insert(column.name.to_string(), default.to_value());
                }
            }
        }
        self
    }

    /// Update stamping: creation facts are immutable and the principal
    /// becomes the last editor. `updatedAt` is left to the store.
    pub fn stamp_update(&mut self, principal: i64) -> &mut Self {
        let lifecycle = &self.table.lifecycle;
        self.fields.remove(self.table.primary_key);
        self.fields.remove(lifecycle.added_by);
        self.fields.remove(lifecycle.created_at);
        self.fields.remove(lifecycle.updated_at);
        self.fields.insert(lifecycle.updated_by.to_string(), Value::from(principal));
        self
    }

    pub fn into_row(self) -> Row {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{TASK, USER_AUTH_SETTINGS};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 15, 0, 0).unwrap()
    }

    #[test]
    fn create_overrides_client_lifecycle_values() {
        let payload = json!({
            "id": 99, "name": "write docs", "isActive": false, "isDeleted": true,
            "addedBy": 5, "updatedBy": 6, "createdAt": "2020-01-01"
        });
        let mut record = Record::from_json(&TASK, payload, Operation::Create).unwrap();
        let row = record.stamp_create(42, now()).clone().into_row();

        assert!(row.get("id").is_none());
        assert!(row.get("updatedBy").is_none());
        assert_eq!(row["isActive"], json!(true));
        assert_eq!(row["isDeleted"], json!(false));
        assert_eq!(row["addedBy"], json!(42));
        assert_eq!(row["createdAt"], json!("2024-03-05T15:00:00.000000Z"));
        assert_eq!(row["createdAt"], row["updatedAt"]);
    }

    #[test]
    fn create_fills_declared_defaults() {
        let mut record = Record::from_json(&USER_AUTH_SETTINGS, json!({ "userId": 1 }), Operation::Create).unwrap();
        let row = record.stamp_create(1, now()).clone().into_row();
        assert_eq!(row["loginRetryLimit"], json!(0));

        let mut record =
            Record::from_json(&USER_AUTH_SETTINGS, json!({ "loginRetryLimit": 3 }), Operation::Create).unwrap();
        let row = record.stamp_create(1, now()).clone().into_row();
        assert_eq!(row["loginRetryLimit"], json!(3));
    }

    #[test]
    fn update_strips_creation_facts() {
        let payload = json!({ "id": 1, "name": "b", "addedBy": 3, "createdAt": "2020-01-01", "updatedAt": "2020-01-01" });
        let mut record = Record::from_json(&TASK, payload, Operation::Update).unwrap();
        let row = record.stamp_update(7).clone().into_row();
        assert_eq!(row.len(), 2);
        assert_eq!(row["name"], json!("b"));
        assert_eq!(row["updatedBy"], json!(7));
    }

    #[test]
    fn rejects_non_objects_and_unknown_columns() {
        assert!(matches!(Record::from_json(&TASK, json!([1]), Operation::Create), Err(RecordError::InvalidJson(_))));
        assert!(matches!(
            Record::from_json(&TASK, json!({ "bogus": 1 }), Operation::Create),
            Err(RecordError::UnknownField { .. })
        ));
    }

    #[test]
    fn dates_are_normalized_on_the_way_in() {
        let record = Record::from_json(&TASK, json!({ "dueDate": "2024-06-01" }), Operation::Create).unwrap();
        assert_eq!(record.get("dueDate"), Some(&json!("2024-06-01T00:00:00.000000Z")));
        assert_eq!(record.operation(), Operation::Create);
    }
}
