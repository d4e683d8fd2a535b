use serde_json::Value;

use crate::entities::TableDescriptor;

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(table: &TableDescriptor, order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Self::parse_order_string(table, s),
            Value::Array(arr) => {
                // Expect array of strings like ["createdAt desc", "name asc"]
                let mut out = Vec::new();
                for v in arr {
                    let s = v
                        .as_str()
                        .ok_or_else(|| FilterError::InvalidOrder(format!("expected string, got {}", v)))?;
                    out.extend(Self::parse_order_string(table, s)?);
                }
                Ok(out)
            }
            Value::Object(obj) => {
                // { "createdAt": "desc", "name": 1 }
                let mut out = Vec::new();
                for (k, v) in obj {
                    let sort = match v {
                        Value::String(s) => Self::parse_direction(s)?,
                        Value::Number(n) if n.as_i64() == Some(-1) => SortDirection::Desc,
                        Value::Number(n) if n.as_i64() == Some(1) => SortDirection::Asc,
                        other => return Err(FilterError::InvalidOrder(format!("invalid direction for {}: {}", k, other))),
                    };
                    out.push(FilterOrderInfo { column: Self::resolve(table, k)?, sort });
                }
                Ok(out)
            }
            other => Err(FilterError::InvalidOrder(format!("unsupported order format: {}", other))),
        }
    }

    fn parse_order_string(table: &TableDescriptor, s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                let sort = Self::parse_direction(it.next().unwrap_or("asc"))?;
                out.push(FilterOrderInfo { column: Self::resolve(table, col)?, sort });
            }
        }
        Ok(out)
    }

    fn parse_direction(dir: &str) -> Result<SortDirection, FilterError> {
        if dir.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if dir.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(FilterError::InvalidOrder(format!("unknown direction {}", dir)))
        }
    }

    fn resolve(table: &TableDescriptor, column: &str) -> Result<&'static str, FilterError> {
        table
            .column(column)
            .map(|c| c.name)
            .ok_or_else(|| FilterError::InvalidColumn(format!("{} has no column {}", table.name, column)))
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::COMMENT;
    use serde_json::json;

    #[test]
    fn parses_string_array_and_object_forms() {
        let a = FilterOrder::validate_and_parse(&COMMENT, &json!("upvoteCount desc, id")).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].sort, SortDirection::Desc);
        assert_eq!(a[1].sort, SortDirection::Asc);

        let b = FilterOrder::validate_and_parse(&COMMENT, &json!(["commentTime asc"])).unwrap();
        assert_eq!(b[0].column, "commentTime");

        let c = FilterOrder::validate_and_parse(&COMMENT, &json!({ "upvoteCount": -1 })).unwrap();
        assert_eq!(c[0].sort, SortDirection::Desc);
        assert_eq!(FilterOrder::generate(&c), "ORDER BY \"upvoteCount\" DESC");
    }

    #[test]
    fn rejects_unknown_columns_and_directions() {
        assert!(FilterOrder::validate_and_parse(&COMMENT, &json!("nope desc")).is_err());
        assert!(FilterOrder::validate_and_parse(&COMMENT, &json!("comment sideways")).is_err());
        assert!(FilterOrder::validate_and_parse(&COMMENT, &json!({ "comment": 2 })).is_err());
    }
}
