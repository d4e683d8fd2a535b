use serde_json::{Map, Value};

use super::ValidationError;

/// Which request shape a filter payload belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `{ query, options, isCountOnly }`
    List,
    /// `{ where }`
    Count,
}

impl FilterKind {
    fn allowed_keys(&self) -> &'static [&'static str] {
        match self {
            FilterKind::List => &["query", "options", "isCountOnly"],
            FilterKind::Count => &["where"],
        }
    }

    fn condition_key(&self) -> &'static str {
        match self {
            FilterKind::List => "query",
            FilterKind::Count => "where",
        }
    }
}

const LOGICAL_OPERATORS: &[&str] = &["$and", "$or", "$not"];
const OPTION_KEYS: &[&str] = &["page", "limit", "sort", "select", "includes", "includeDeleted"];

/// Check the outer shape of a list or count request. Operator contents
/// are left to the filter compiler.
pub fn validate_filter(payload: &Value, kind: FilterKind, known_columns: Option<&[&str]>) -> Result<(), ValidationError> {
    let obj = match payload {
        Value::Object(obj) => obj,
        // An absent body means "everything"
        Value::Null => return Ok(()),
        _ => return Err(ValidationError::new("\"value\" must be of type object")),
    };

    if let Some(unknown) = obj.keys().find(|k| !kind.allowed_keys().contains(&k.as_str())) {
        return Err(ValidationError::not_allowed(unknown));
    }

    let condition_key = kind.condition_key();
    match obj.get(condition_key) {
        None | Some(Value::Null) => {}
        Some(Value::Object(conditions)) => check_condition_keys(condition_key, conditions, known_columns)?,
        Some(_) => return Err(ValidationError::new(format!("\"{}\" must be of type object", condition_key))),
    }

    if kind == FilterKind::List {
        match obj.get("isCountOnly") {
            None | Some(Value::Null) | Some(Value::Bool(_)) => {}
            Some(_) => return Err(ValidationError::new("\"isCountOnly\" must be a boolean")),
        }
        match obj.get("options") {
            None | Some(Value::Null) => {}
            Some(Value::Object(options)) => check_options(options)?,
            Some(_) => return Err(ValidationError::new("\"options\" must be of type object")),
        }
    }
    Ok(())
}

fn check_condition_keys(
    path: &str,
    conditions: &Map<String, Value>,
    known_columns: Option<&[&str]>,
) -> Result<(), ValidationError> {
    let Some(columns) = known_columns else {
        return Ok(());
    };
    for key in conditions.keys() {
        if !LOGICAL_OPERATORS.contains(&key.as_str()) && !columns.contains(&key.as_str()) {
            return Err(ValidationError::not_allowed(&format!("{}.{}", path, key)));
        }
    }
    Ok(())
}

fn check_options(options: &Map<String, Value>) -> Result<(), ValidationError> {
    if let Some(unknown) = options.keys().find(|k| !OPTION_KEYS.contains(&k.as_str())) {
        return Err(ValidationError::not_allowed(&format!("options.{}", unknown)));
    }

    check_integer(options, "page", 1)?;
    check_integer(options, "limit", 0)?;

    match options.get("select") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
        Some(_) => return Err(ValidationError::new("\"options.select\" must be an array of strings")),
    }
    match options.get("includeDeleted") {
        None | Some(Value::Null) | Some(Value::Bool(_)) => {}
        Some(_) => return Err(ValidationError::new("\"options.includeDeleted\" must be a boolean")),
    }
    Ok(())
}

fn check_integer(options: &Map<String, Value>, key: &str, min: i64) -> Result<(), ValidationError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(value) => match value.as_i64() {
            Some(n) if n >= min => Ok(()),
            Some(_) => Err(ValidationError::new(format!(
                "\"options.{}\" must be greater than or equal to {}",
                key, min
            ))),
            None => Err(ValidationError::new(format!("\"options.{}\" must be an integer", key))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[&str] = &["id", "name", "isDeleted"];

    #[test]
    fn list_requests_accept_query_options_and_count_flag() {
        let payload = json!({
            "query": { "name": "a", "$or": [] },
            "options": { "page": 2, "limit": 10, "sort": { "name": 1 }, "select": ["name"], "includes": [] },
            "isCountOnly": false
        });
        assert!(validate_filter(&payload, FilterKind::List, Some(COLUMNS)).is_ok());
        assert!(validate_filter(&Value::Null, FilterKind::List, Some(COLUMNS)).is_ok());
    }

    #[test]
    fn unknown_top_level_keys_are_rejected() {
        let err = validate_filter(&json!({ "where": {} }), FilterKind::List, None).unwrap_err();
        assert_eq!(err.message, "\"where\" is not allowed");

        let err = validate_filter(&json!({ "query": {} }), FilterKind::Count, None).unwrap_err();
        assert_eq!(err.message, "\"query\" is not allowed");
    }

    #[test]
    fn condition_keys_must_be_known_columns() {
        let err = validate_filter(&json!({ "where": { "bogus": 1 } }), FilterKind::Count, Some(COLUMNS)).unwrap_err();
        assert_eq!(err.message, "\"where.bogus\" is not allowed");
        assert!(validate_filter(&json!({ "where": { "bogus": 1 } }), FilterKind::Count, None).is_ok());
    }

    #[test]
    fn paging_bounds_are_enforced() {
        let err = validate_filter(&json!({ "options": { "page": 0 } }), FilterKind::List, None).unwrap_err();
        assert_eq!(err.message, "\"options.page\" must be greater than or equal to 1");

        let err = validate_filter(&json!({ "options": { "limit": "ten" } }), FilterKind::List, None).unwrap_err();
        assert_eq!(err.message, "\"options.limit\" must be an integer");

        let err = validate_filter(&json!({ "options": { "offset": 3 } }), FilterKind::List, None).unwrap_err();
        assert_eq!(err.message, "\"options.offset\" is not allowed");

        assert!(validate_filter(&json!({ "options": { "limit": 0 } }), FilterKind::List, None).is_ok());
    }

    #[test]
    fn shapes_are_checked() {
        let err = validate_filter(&json!({ "query": [1] }), FilterKind::List, None).unwrap_err();
        assert_eq!(err.message, "\"query\" must be of type object");
        let err = validate_filter(&json!({ "isCountOnly": "yes" }), FilterKind::List, None).unwrap_err();
        assert_eq!(err.message, "\"isCountOnly\" must be a boolean");
    }
}
