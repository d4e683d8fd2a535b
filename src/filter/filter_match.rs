//! In-process evaluation of a parsed filter, following SQL semantics:
//! comparisons against NULL are unknown, and unknown rows are not matched.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::filter_where::operand_list;
use super::types::{FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection, WhereNode};

impl WhereNode {
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        self.eval(row) == Some(true)
    }

    /// Three-valued evaluation; `None` is SQL's UNKNOWN
    fn eval(&self, row: &Map<String, Value>) -> Option<bool> {
        match self {
            WhereNode::Condition(info) => eval_condition(info, row),
            WhereNode::And(children) => {
                let mut unknown = false;
                for child in children {
                    match child.eval(row) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                if unknown { None } else { Some(true) }
            }
            WhereNode::Or(children) => {
                let mut unknown = false;
                for child in children {
                    match child.eval(row) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                if unknown { None } else { Some(false) }
            }
            WhereNode::Not(child) => child.eval(row).map(|b| !b),
        }
    }
}

fn eval_condition(info: &FilterWhereInfo, row: &Map<String, Value>) -> Option<bool> {
    let actual = row.get(info.column).unwrap_or(&Value::Null);

    match info.operator {
        FilterOp::Eq if info.data.is_null() => return Some(actual.is_null()),
        FilterOp::Ne if info.data.is_null() => return Some(!actual.is_null()),
        _ => {}
    }
    if actual.is_null() {
        return None;
    }

    match info.operator {
        FilterOp::Eq => compare(actual, &info.data).map(|o| o == Ordering::Equal),
        FilterOp::Ne => compare(actual, &info.data).map(|o| o != Ordering::Equal),
        FilterOp::Gt => compare(actual, &info.data).map(|o| o == Ordering::Greater),
        FilterOp::Gte => compare(actual, &info.data).map(|o| o != Ordering::Less),
        FilterOp::Lt => compare(actual, &info.data).map(|o| o == Ordering::Less),
        FilterOp::Lte => compare(actual, &info.data).map(|o| o != Ordering::Greater),
        FilterOp::Like | FilterOp::ILike => {
            let text = actual.as_str()?;
            let pattern = info.data.as_str()?;
            if info.operator == FilterOp::ILike {
                Some(like_match(&text.to_lowercase(), &pattern.to_lowercase()))
            } else {
                Some(like_match(text, pattern))
            }
        }
        FilterOp::In | FilterOp::NIn => {
            let values = operand_list(&info.data);
            let found = values.iter().any(|v| compare(actual, v) == Some(Ordering::Equal));
            Some(if info.operator == FilterOp::In { found } else { !found })
        }
        FilterOp::Between => {
            let values = operand_list(&info.data);
            let low = compare(actual, values.first()?)?;
            let high = compare(actual, values.get(1)?)?;
            Some(low != Ordering::Less && high != Ordering::Greater)
        }
    }
}

/// Ordering between two non-null scalars of the same JSON kind
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// SQL LIKE: `%` matches any run, `_` matches one character
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}

/// Row comparator for ORDER BY. NULLs sort last ascending and first
/// descending, as in Postgres.
pub fn compare_rows(order: &[FilterOrderInfo], a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    for info in order {
        let left = a.get(info.column).unwrap_or(&Value::Null);
        let right = b.get(info.column).unwrap_or(&Value::Null);
        let ord = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare(left, right).unwrap_or(Ordering::Equal),
        };
        let ord = match info.sort {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
