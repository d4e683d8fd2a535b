//! Table bindings for every scaffolded entity.
//!
//! A [`TableDescriptor`] is the only thing the generic data access layer knows
//! about an entity: its table name, primary key, domain columns and the fixed
//! lifecycle suffix shared by every table.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

pub mod comment;
pub mod encounter;
pub mod order_item;
pub mod patient;
pub mod plan;
pub mod project_route;
pub mod route_role;
pub mod task;
pub mod user_auth_settings;

pub use comment::COMMENT;
pub use encounter::ENCOUNTER;
pub use order_item::ORDER_ITEM;
pub use patient::PATIENT;
pub use plan::PLAN;
pub use project_route::PROJECT_ROUTE;
pub use route_role::ROUTE_ROLE;
pub use task::TASK;
pub use user_auth_settings::USER_AUTH_SETTINGS;

/// Every entity binding served by the API
pub static ALL: &[&TableDescriptor] = &[
    &TASK,
    &COMMENT,
    &PLAN,
    &ENCOUNTER,
    &ORDER_ITEM,
    &PATIENT,
    &PROJECT_ROUTE,
    &ROUTE_ROLE,
    &USER_AUTH_SETTINGS,
];

/// Resolve a binding by entity name or table name, ignoring case
/// (`task`, `Task` and `Tasks` all resolve to the Task binding).
pub fn lookup(name: &str) -> Option<&'static TableDescriptor> {
    ALL.iter()
        .copied()
        .find(|t| t.name.eq_ignore_ascii_case(name) || t.table.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    String,
    Boolean,
    Date,
}

impl ColumnType {
    /// Check whether a non-null JSON value is acceptable for this column
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ColumnType::Integer => value.as_i64().is_some(),
            ColumnType::String => value.is_string(),
            ColumnType::Boolean => value.is_boolean(),
            ColumnType::Date => value.as_str().and_then(parse_date).is_some(),
        }
    }

    /// Phrase used in validation messages (`"qty" must be a number`)
    pub fn expectation(&self) -> &'static str {
        match self {
            ColumnType::Integer => "a number",
            ColumnType::String => "a string",
            ColumnType::Boolean => "a boolean",
            ColumnType::Date => "a valid date",
        }
    }

    /// Canonical stored form of a value. Dates become RFC 3339 UTC with
    /// microsecond precision so they compare lexicographically.
    pub fn normalize(&self, value: &Value) -> Value {
        match (self, value) {
            (ColumnType::Date, Value::String(s)) => parse_date(s)
                .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Micros, true)))
                .unwrap_or_else(|| value.clone()),
            _ => value.clone(),
        }
    }
}

/// Parse the date shapes accepted from clients and returned by storage
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Canonical string for a timestamp produced by the server
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnDefault {
    Integer(i64),
    Boolean(bool),
    String(&'static str),
}

impl ColumnDefault {
    pub fn to_value(&self) -> Value {
        match self {
            ColumnDefault::Integer(i) => Value::from(*i),
            ColumnDefault::Boolean(b) => Value::Bool(*b),
            ColumnDefault::String(s) => Value::String((*s).to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnType,
    pub required: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ColumnDefault>,
}

impl ColumnDef {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind, required: false, unique: false, default: None }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn default_value(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// Names of the audit and lifecycle columns appended to every table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifecycleFields {
    pub is_active: &'static str,
    pub is_deleted: &'static str,
    pub added_by: &'static str,
    pub updated_by: &'static str,
    pub created_at: &'static str,
    pub updated_at: &'static str,
}

impl LifecycleFields {
    pub const STANDARD: LifecycleFields = LifecycleFields {
        is_active: "isActive",
        is_deleted: "isDeleted",
        added_by: "addedBy",
        updated_by: "updatedBy",
        created_at: "createdAt",
        updated_at: "updatedAt",
    };

    fn columns(&self) -> [ColumnDef; 6] {
        [
            ColumnDef::new(self.is_active, ColumnType::Boolean),
            ColumnDef::new(self.is_deleted, ColumnType::Boolean),
            ColumnDef::new(self.added_by, ColumnType::Integer),
            ColumnDef::new(self.updated_by, ColumnType::Integer),
            ColumnDef::new(self.created_at, ColumnType::Date),
            ColumnDef::new(self.updated_at, ColumnType::Date),
        ]
    }
}

/// Schema/table binding that parameterizes every generic data access call
#[derive(Debug, Serialize)]
pub struct TableDescriptor {
    pub name: &'static str,
    pub table: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [ColumnDef],
    pub lifecycle: LifecycleFields,
}

impl TableDescriptor {
    pub const fn new(name: &'static str, table: &'static str, columns: &'static [ColumnDef]) -> Self {
        Self {
            name,
            table,
            primary_key: "id",
            columns,
            lifecycle: LifecycleFields::STANDARD,
        }
    }

    /// Look up any column, including the primary key and lifecycle columns
    pub fn column(&self, name: &str) -> Option<ColumnDef> {
        if name == self.primary_key {
            return Some(ColumnDef::new(self.primary_key, ColumnType::Integer));
        }
        self.columns
            .iter()
            .copied()
            .chain(self.lifecycle.columns())
            .find(|c| c.name == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column(name).map(|c| c.kind)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// All columns in table order: primary key, domain columns, lifecycle suffix
    pub fn all_columns(&self) -> Vec<ColumnDef> {
        std::iter::once(ColumnDef::new(self.primary_key, ColumnType::Integer))
            .chain(self.columns.iter().copied())
            .chain(self.lifecycle.columns())
            .collect()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.all_columns().into_iter().map(|c| c.name).collect()
    }

    /// Columns rendered through the date formatter on the way out
    pub fn date_columns(&self) -> Vec<&'static str> {
        self.all_columns()
            .into_iter()
            .filter(|c| c.kind == ColumnType::Date)
            .map(|c| c.name)
            .collect()
    }

    pub fn unique_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.unique)
    }

    /// Fields a client may never write directly
    pub fn is_system_field(&self, name: &str) -> bool {
        name == self.primary_key
            || name == self.lifecycle.created_at
            || name == self.lifecycle.updated_at
    }
}
