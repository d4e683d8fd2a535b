use serde_json::{Map, Value};

use crate::entities::{ColumnType, TableDescriptor};

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo, FilterWhereOptions, SqlParam, WhereNode};

pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Resolve a JSON where object against the table's columns
    pub fn parse(table: &TableDescriptor, where_data: &Value) -> Result<WhereNode, FilterError> {
        match where_data {
            Value::Null => Ok(WhereNode::And(vec![])),
            Value::Object(obj) => Self::parse_object(table, obj),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn parse_object(table: &TableDescriptor, obj: &Map<String, Value>) -> Result<WhereNode, FilterError> {
        let mut nodes = Vec::with_capacity(obj.len());
        for (key, value) in obj {
            if key.starts_with('$') {
                nodes.push(Self::parse_logical_operator(table, key, value)?);
            } else {
                nodes.extend(Self::parse_field_condition(table, key, value)?);
            }
        }
        Ok(match nodes.len() {
            1 => nodes.remove(0),
            _ => WhereNode::And(nodes),
        })
    }

    fn parse_logical_operator(table: &TableDescriptor, op: &str, value: &Value) -> Result<WhereNode, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let children = arr
                    .iter()
                    .map(|v| Self::parse(table, v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if op == "$and" { WhereNode::And(children) } else { WhereNode::Or(children) })
            }
            "$not" => Ok(WhereNode::Not(Box::new(Self::parse(table, value)?))),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(table: &TableDescriptor, field: &str, value: &Value) -> Result<Vec<WhereNode>, FilterError> {
        let column = table
            .column(field)
            .ok_or_else(|| FilterError::InvalidColumn(format!("{} has no column {}", table.name, field)))?;

        let mut out = vec![];
        match value {
            Value::Object(obj) => {
                for (op_key, op_val) in obj {
                    let operator = FilterOp::parse(op_key)?;
                    Self::check_operator_data(field, column.kind, operator, op_val)?;
                    out.push(WhereNode::Condition(FilterWhereInfo {
                        column: column.name,
                        kind: column.kind,
                        operator,
                        data: normalize_operand(column.kind, op_val),
                    }));
                }
            }
            // Implicit equality: { field: value }
            _ => out.push(WhereNode::Condition(FilterWhereInfo {
                column: column.name,
                kind: column.kind,
                operator: FilterOp::Eq,
                data: normalize_operand(column.kind, value),
            })),
        }
        Ok(out)
    }

    fn check_operator_data(field: &str, kind: ColumnType, op: FilterOp, data: &Value) -> Result<(), FilterError> {
        match op {
            FilterOp::Between => match data.as_array() {
                Some(values) if values.len() == 2 => Ok(()),
                _ => Err(FilterError::InvalidOperatorData(format!("$between on {} requires array with 2 values", field))),
            },
            FilterOp::Like | FilterOp::ILike => {
                if kind != ColumnType::String {
                    return Err(FilterError::InvalidOperatorData(format!("$like requires a string column, {} is not", field)));
                }
                if !data.is_string() {
                    return Err(FilterError::InvalidOperatorData(format!("$like on {} requires a string pattern", field)));
                }
                Ok(())
            }
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte if data.is_null() => {
                Err(FilterError::InvalidOperatorData(format!("cannot compare {} with null", field)))
            }
            _ => Ok(()),
        }
    }

    /// Render a parsed tree into a SQL predicate with positional parameters
    /// numbered after `starting_param_index`.
    pub fn generate(
        node: Option<&WhereNode>,
        starting_param_index: usize,
        options: &FilterWhereOptions,
        soft_delete_column: &str,
    ) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);

        let mut sql_conditions = vec![];
        if !options.include_deleted {
            sql_conditions.push(format!("\"{}\" IS NOT TRUE", soft_delete_column));
        }
        if let Some(sql) = node.and_then(|n| filter_where.build_node(n)) {
            sql_conditions.push(sql);
        }

        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        (where_clause, filter_where.param_values)
    }

    fn build_node(&mut self, node: &WhereNode) -> Option<String> {
        match node {
            WhereNode::Condition(info) => Some(self.build_sql_condition(info)),
            WhereNode::And(children) => {
                let parts: Vec<String> = children.iter().filter_map(|c| self.build_node(c)).collect();
                match parts.len() {
                    0 => None,
                    1 => parts.into_iter().next(),
                    _ => Some(format!("({})", parts.join(" AND "))),
                }
            }
            WhereNode::Or(children) => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|c| self.build_node(c).unwrap_or_else(|| "1=1".to_string()))
                    .collect();
                if parts.is_empty() {
                    return Some("1=0".to_string());
                }
                Some(format!("({})", parts.join(" OR ")))
            }
            WhereNode::Not(child) => {
                let inner = self.build_node(child).unwrap_or_else(|| "1=1".to_string());
                Some(format!("NOT ({})", inner))
            }
        }
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let quoted_column = format!("\"{}\"", condition.column);
        let kind = condition.kind;
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() { format!("{} IS NULL", quoted_column) }
                else { format!("{} = {}", quoted_column, self.param(kind, condition.data.clone())) }
            }
            FilterOp::Ne => {
                if condition.data.is_null() { format!("{} IS NOT NULL", quoted_column) }
                else { format!("{} <> {}", quoted_column, self.param(kind, condition.data.clone())) }
            }
            FilterOp::Gt => format!("{} > {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::Lt => format!("{} < {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::Lte => format!("{} <= {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::Like => format!("{} LIKE {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::ILike => format!("{} ILIKE {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::In | FilterOp::NIn => {
                let values = operand_list(&condition.data);
                let negate = condition.operator == FilterOp::NIn;
                if values.is_empty() {
                    return if negate { "1=1".to_string() } else { "1=0".to_string() };
                }
                let params: Vec<String> = values.into_iter().map(|v| self.param(kind, v)).collect();
                let keyword = if negate { "NOT IN" } else { "IN" };
                format!("{} {} ({})", quoted_column, keyword, params.join(", "))
            }
            FilterOp::Between => {
                let values = operand_list(&condition.data);
                let low = self.param(kind, values.first().cloned().unwrap_or(Value::Null));
                let high = self.param(kind, values.get(1).cloned().unwrap_or(Value::Null));
                format!("{} BETWEEN {} AND {}", quoted_column, low, high)
            }
        }
    }

    fn param(&mut self, kind: ColumnType, value: Value) -> String {
        self.param_values.push(SqlParam { kind, value });
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Operand of `$in` / `$nin` / `$between` as a list; a scalar is a list of one
pub(crate) fn operand_list(data: &Value) -> Vec<Value> {
    match data {
        Value::Array(values) => values.clone(),
        other => vec![other.clone()],
    }
}

fn normalize_operand(kind: ColumnType, value: &Value) -> Value {
    match value {
        Value::Array(values) => Value::Array(values.iter().map(|v| kind.normalize(v)).collect()),
        other => kind.normalize(other),
    }
}
