use serde::Serialize;
use serde_json::Value;

use crate::entities::{ColumnType, TableDescriptor};

use super::ValidationError;

/// Which columns a payload may carry and which it must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// Domain columns plus client-visible lifecycle flags; required enforced
    Create,
    /// As `Create`, and the primary key may be echoed back
    Update,
    /// As `Update` with nothing required
    PartialUpdate,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: ColumnType,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSchema {
    pub fields: Vec<FieldRule>,
}

impl ValidationSchema {
    pub fn for_table(table: &TableDescriptor, mode: SchemaMode) -> Self {
        let mut fields = vec![];
        if mode != SchemaMode::Create {
            fields.push(FieldRule { name: table.primary_key, kind: ColumnType::Integer, required: false });
        }
        for column in table.columns {
            fields.push(FieldRule {
                name: column.name,
                kind: column.kind,
                required: column.required && mode != SchemaMode::PartialUpdate,
            });
        }
        let lifecycle = &table.lifecycle;
        fields.push(FieldRule { name: lifecycle.is_active, kind: ColumnType::Boolean, required: false });
        fields.push(FieldRule { name: lifecycle.is_deleted, kind: ColumnType::Boolean, required: false });
        fields.push(FieldRule { name: lifecycle.added_by, kind: ColumnType::Integer, required: false });
        fields.push(FieldRule { name: lifecycle.updated_by, kind: ColumnType::Integer, required: false });
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Check a payload against a schema, reporting the first violation.
///
/// Fields are checked in schema order, unknown keys last.
pub fn validate_create(payload: &Value, schema: &ValidationSchema) -> Result<(), ValidationError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ValidationError::new("\"value\" must be of type object"))?;

    for rule in &schema.fields {
        match obj.get(rule.name) {
            None | Some(Value::Null) if rule.required => {
                return Err(ValidationError::new(format!("\"{}\" is required", rule.name)));
            }
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s.is_empty() && rule.required => {
                return Err(ValidationError::new(format!("\"{}\" is not allowed to be empty", rule.name)));
            }
            Some(value) if !rule.kind.accepts(value) => {
                return Err(ValidationError::new(format!("\"{}\" must be {}", rule.name, rule.kind.expectation())));
            }
            Some(_) => {}
        }
    }

    if let Some(unknown) = obj.keys().find(|k| schema.field(k).is_none()) {
        return Err(ValidationError::not_allowed(unknown));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ORDER_ITEM, PROJECT_ROUTE, TASK};
    use serde_json::json;

    fn create(table: &TableDescriptor) -> ValidationSchema {
        ValidationSchema::for_table(table, SchemaMode::Create)
    }

    #[test]
    fn accepts_well_formed_payloads() {
        assert!(validate_create(&json!({ "name": "a", "dueDate": "2024-05-01", "isCompleted": false }), &create(&TASK)).is_ok());
        assert!(validate_create(&json!({ "name": "a", "description": null, "isActive": true }), &create(&TASK)).is_ok());
    }

    #[test]
    fn reports_missing_required_field() {
        let err = validate_create(&json!({ "description": "x" }), &create(&TASK)).unwrap_err();
        assert_eq!(err.message, "\"name\" is required");

        let err = validate_create(&json!({ "route_name": "r", "method": "GET" }), &create(&PROJECT_ROUTE)).unwrap_err();
        assert_eq!(err.message, "\"uri\" is required");
    }

    #[test]
    fn reports_wrong_types_and_unknown_keys() {
        let err = validate_create(&json!({ "qty": "many" }), &create(&ORDER_ITEM)).unwrap_err();
        assert_eq!(err.message, "\"qty\" must be a number");

        let err = validate_create(&json!({ "name": "a", "foo": 1 }), &create(&TASK)).unwrap_err();
        assert_eq!(err.message, "\"foo\" is not allowed");

        let err = validate_create(&json!({ "name": "a", "dueDate": "soon" }), &create(&TASK)).unwrap_err();
        assert_eq!(err.message, "\"dueDate\" must be a valid date");

        let err = validate_create(&json!([]), &create(&TASK)).unwrap_err();
        assert_eq!(err.message, "\"value\" must be of type object");
    }

    #[test]
    fn modes_differ_on_key_and_required_columns() {
        let payload = json!({ "id": 3, "name": "a" });
        assert_eq!(
            validate_create(&payload, &create(&TASK)).unwrap_err().message,
            "\"id\" is not allowed"
        );
        assert!(validate_create(&payload, &ValidationSchema::for_table(&TASK, SchemaMode::Update)).is_ok());

        let partial = json!({ "isCompleted": true });
        assert!(validate_create(&partial, &ValidationSchema::for_table(&TASK, SchemaMode::Update)).is_err());
        assert!(validate_create(&partial, &ValidationSchema::for_table(&TASK, SchemaMode::PartialUpdate)).is_ok());
    }

    #[test]
    fn server_owned_timestamps_are_not_accepted() {
        let err = validate_create(&json!({ "name": "a", "createdAt": "2024-01-01" }), &create(&TASK)).unwrap_err();
        assert_eq!(err.message, "\"createdAt\" is not allowed");
    }

    #[test]
    fn required_strings_cannot_be_empty() {
        let err = validate_create(&json!({ "name": "" }), &create(&TASK)).unwrap_err();
        assert_eq!(err.message, "\"name\" is not allowed to be empty");
    }
}
