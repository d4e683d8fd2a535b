use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::ColumnType;

use super::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$ne")] Ne,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,

    #[serde(rename = "$like")] Like,
    #[serde(rename = "$ilike")] ILike,

    #[serde(rename = "$in")] In,
    #[serde(rename = "$nin")] NIn,

    #[serde(rename = "$between")] Between,
}

impl FilterOp {
    pub fn parse(op_key: &str) -> Result<Self, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$nin" | "$notIn" => FilterOp::NIn,
            "$between" => FilterOp::Between,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }
}

/// A single resolved field condition. `data` is already normalized to the
/// column's stored representation.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: &'static str,
    pub kind: ColumnType,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    Condition(FilterWhereInfo),
    And(Vec<WhereNode>),
    Or(Vec<WhereNode>),
    Not(Box<WhereNode>),
}

#[derive(Debug, Clone, Default)]
pub struct FilterWhereOptions {
    /// When false, rows flagged as soft-deleted are excluded
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

/// Positional parameter with the column type it binds against
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParam {
    pub kind: ColumnType,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
