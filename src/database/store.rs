use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::entities::TableDescriptor;
use crate::filter::Filter;

/// A stored row keyed by column name
pub type Row = Map<String, Value>;

/// Storage collaborator behind the generic repository.
///
/// Rows handed to `insert` and patches handed to `update` are already
/// stamped and hold only columns of the table. Every method returns rows
/// with all columns present and dates in canonical RFC 3339 form.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert rows as one atomic batch, returning them with generated keys
    async fn insert(&self, table: &'static TableDescriptor, rows: Vec<Row>) -> Result<Vec<Row>, DatabaseError>;

    async fn select(&self, filter: &Filter) -> Result<Vec<Row>, DatabaseError>;

    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError>;

    /// Apply `patch` to every row matching `filter`. `updatedAt` becomes the
    /// later of `touched_at` and one microsecond past its previous value.
    async fn update(&self, filter: &Filter, patch: &Row, touched_at: DateTime<Utc>) -> Result<Vec<Row>, DatabaseError>;

    /// Permanently remove matching rows, returning what was removed
    async fn delete(&self, filter: &Filter) -> Result<Vec<Row>, DatabaseError>;

    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Bring a row coming out of storage into canonical form
pub(crate) fn canonicalize(table: &TableDescriptor, mut row: Row) -> Row {
    for column in table.all_columns() {
        let value = row.remove(column.name).unwrap_or(Value::Null);
        row.insert(column.name.to_string(), column.kind.normalize(&value));
    }
    row
}
