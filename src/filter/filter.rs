use serde_json::{Map, Value};

use crate::entities::TableDescriptor;

use super::error::FilterError;
use super::filter_match::compare_rows;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, FilterWhereOptions, SortDirection, SqlResult, WhereNode};

/// A query against one table, compiled from the JSON filter language.
///
/// The same compiled filter renders Postgres SQL fragments (`to_where_sql`,
/// `to_order_sql`, `to_limit_sql`, `to_count_sql`) and evaluates rows in process (`matches`, `sort`,
/// `project`), so both storage backends share one set of semantics.
#[derive(Debug, Clone)]
pub struct Filter {
    table: &'static TableDescriptor,
    select_columns: Vec<&'static str>,
    where_node: Option<WhereNode>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<u64>,
    offset: Option<u64>,
    options: FilterWhereOptions,
}

impl Filter {
    pub fn new(table: &'static TableDescriptor) -> Result<Self, FilterError> {
        if !Self::is_valid_identifier(table.table) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", table.table)));
        }
        Ok(Self {
            table,
            select_columns: vec![],
            where_node: None,
            order_data: vec![],
            limit: None,
            offset: None,
            options: FilterWhereOptions::default(),
        })
    }

    /// Filter matching exactly one primary key, including soft-deleted rows
    pub fn by_primary_key(table: &'static TableDescriptor, id: i64) -> Result<Self, FilterError> {
        let mut filter = Self::new(table)?;
        filter
            .where_clause(serde_json::json!({ table.primary_key: id }))?
            .include_deleted(true);
        Ok(filter)
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        let mut resolved = Vec::with_capacity(columns.len());
        for column in &columns {
            if column == "*" {
                continue;
            }
            let def = self
                .table
                .column(column)
                .ok_or_else(|| FilterError::InvalidColumn(format!("{} has no column {}", self.table.name, column)))?;
            resolved.push(def.name);
        }
        self.select_columns = resolved;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        self.where_node = Some(FilterWhere::parse(self.table, &conditions)?);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(self.table, &order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: Option<u64>, offset: Option<u64>) -> &mut Self {
        let config = crate::config::config();
        self.limit = match (limit, config.pagination.max_limit) {
            (Some(l), Some(max)) if l > max => {
                if config.pagination.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", l, max);
                }
                Some(max)
            }
            (l, _) => l,
        };
        self.offset = offset;
        self
    }

    pub fn include_deleted(&mut self, include: bool) -> &mut Self {
        self.options.include_deleted = include;
        self
    }

    pub fn table(&self) -> &'static TableDescriptor {
        self.table
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// Requested ordering with the primary key appended as a tiebreaker so
    /// pages are stable; with no ordering this is insertion order.
    pub fn effective_order(&self) -> Vec<FilterOrderInfo> {
        let mut order = self.order_data.clone();
        if !order.iter().any(|o| o.column == self.table.primary_key) {
            order.push(FilterOrderInfo { column: self.table.primary_key, sort: SortDirection::Asc });
        }
        order
    }

    pub fn to_where_sql(&self, starting_param_index: usize) -> SqlResult {
        let (query, params) = FilterWhere::generate(
            self.where_node.as_ref(),
            starting_param_index,
            &self.options,
            self.table.lifecycle.is_deleted,
        );
        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql(0);
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table.table, where_result.query);
        SqlResult { query, params: where_result.params }
    }

    /// Row-level predicate equivalent to the rendered WHERE clause
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        if !self.options.include_deleted
            && row.get(self.table.lifecycle.is_deleted) == Some(&Value::Bool(true))
        {
            return false;
        }
        self.where_node.as_ref().map_or(true, |node| node.matches(row))
    }

    pub fn sort(&self, rows: &mut [Map<String, Value>]) {
        let order = self.effective_order();
        rows.sort_by(|a, b| compare_rows(&order, a, b));
    }

    /// Apply offset and limit to an already sorted result set
    pub fn window<T>(&self, rows: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0) as usize;
        let iter = rows.into_iter().skip(offset);
        match self.limit {
            Some(limit) => iter.take(limit as usize).collect(),
            None => iter.collect(),
        }
    }

    pub fn project(&self, row: Map<String, Value>) -> Map<String, Value> {
        if self.select_columns.is_empty() {
            return row;
        }
        row.into_iter()
            .filter(|(k, _)| self.select_columns.iter().any(|c| c == k))
            .collect()
    }

    pub fn is_valid_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }

    pub fn to_order_sql(&self) -> String {
        FilterOrder::generate(&self.effective_order())
    }

    pub fn to_limit_sql(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}
