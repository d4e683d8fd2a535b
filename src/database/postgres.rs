use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Postgres, Row as _};

use crate::database::manager::DatabaseError;
use crate::database::store::{canonicalize, Row, Store};
use crate::entities::{parse_date, ColumnType, TableDescriptor};
use crate::filter::{Filter, SqlParam, SqlResult};

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Postgres-backed storage. Rows travel as JSON through `row_to_json`, so
/// one decoding path serves every table.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(&self, table: &TableDescriptor, sql: SqlResult) -> Result<Vec<Row>, DatabaseError> {
        if crate::config::config().database.enable_query_logging {
            tracing::debug!(query = %sql.query, params = sql.params.len(), "executing");
        }

        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(&self.pool).await.map_err(DatabaseError::from_sqlx)?;

        rows.into_iter()
            .map(|row| {
                let value: Value = row.try_get("row").map_err(DatabaseError::from_sqlx)?;
                match value {
                    Value::Object(map) => Ok(canonicalize(table, map)),
                    other => Err(DatabaseError::Decode(format!("expected object, got {}", other))),
                }
            })
            .collect()
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert(&self, table: &'static TableDescriptor, rows: Vec<Row>) -> Result<Vec<Row>, DatabaseError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let sql = insert_sql(table, &rows);
        let mut created = self.fetch_rows(table, sql).await?;
        created.sort_by_key(|row| row.get(table.primary_key).and_then(Value::as_i64));
        Ok(created)
    }

    async fn select(&self, filter: &Filter) -> Result<Vec<Row>, DatabaseError> {
        let rows = self.fetch_rows(filter.table(), select_sql(filter)).await?;
        Ok(rows.into_iter().map(|row| filter.project(row)).collect())
    }

    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        let sql = filter.to_count_sql();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }
        let row = q.fetch_one(&self.pool).await.map_err(DatabaseError::from_sqlx)?;
        let count: i64 = row.try_get("count").map_err(DatabaseError::from_sqlx)?;
        Ok(count.max(0) as u64)
    }

    async fn update(&self, filter: &Filter, patch: &Row, touched_at: DateTime<Utc>) -> Result<Vec<Row>, DatabaseError> {
        let mut updated = self.fetch_rows(filter.table(), update_sql(filter, patch, touched_at)).await?;
        filter.sort(&mut updated);
        Ok(updated)
    }

    async fn delete(&self, filter: &Filter) -> Result<Vec<Row>, DatabaseError> {
        let mut removed = self.fetch_rows(filter.table(), delete_sql(filter)).await?;
        filter.sort(&mut removed);
        Ok(removed)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn select_sql(filter: &Filter) -> SqlResult {
    let where_result = filter.to_where_sql(0);
    let query = [
        format!("SELECT row_to_json(t) AS row FROM \"{}\" t", filter.table().table),
        format!("WHERE {}", where_result.query),
        filter.to_order_sql(),
        filter.to_limit_sql(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");
    SqlResult { query, params: where_result.params }
}

/// Multi-row insert; a column some rows omit falls back to its DEFAULT
fn insert_sql(table: &TableDescriptor, rows: &[Row]) -> SqlResult {
    let columns: Vec<_> = table
        .all_columns()
        .into_iter()
        .filter(|c| rows.iter().any(|row| row.contains_key(c.name)))
        .collect();

    let mut params = vec![];
    let mut tuples = vec![];
    for row in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|c| match row.get(c.name) {
                Some(value) => {
                    params.push(SqlParam { kind: c.kind, value: value.clone() });
                    format!("${}", params.len())
                }
                None => "DEFAULT".to_string(),
            })
            .collect();
        tuples.push(format!("({})", values.join(", ")));
    }

    let column_list = columns.iter().map(|c| format!("\"{}\"", c.name)).collect::<Vec<_>>().join(", ");
    let query = format!(
        "WITH inserted AS (INSERT INTO \"{}\" ({}) VALUES {} RETURNING *) SELECT row_to_json(inserted) AS row FROM inserted",
        table.table,
        column_list,
        tuples.join(", ")
    );
    SqlResult { query, params }
}

fn update_sql(filter: &Filter, patch: &Row, touched_at: DateTime<Utc>) -> SqlResult {
    let table = filter.table();
    let updated_at = table.lifecycle.updated_at;

    let mut params = vec![];
    let mut assignments = vec![];
    for column in table.all_columns() {
        if column.name == updated_at {
            continue;
        }
        if let Some(value) = patch.get(column.name) {
            params.push(SqlParam { kind: column.kind, value: value.clone() });
            assignments.push(format!("\"{}\" = ${}", column.name, params.len()));
        }
    }
    params.push(SqlParam {
        kind: ColumnType::Date,
        value: Value::String(crate::entities::format_timestamp(touched_at)),
    });
    assignments.push(format!(
        "\"{0}\" = GREATEST(${1}, \"{0}\" + INTERVAL '1 microsecond')",
        updated_at,
        params.len()
    ));

    let where_result = filter.to_where_sql(params.len());
    params.extend(where_result.params);

    let query = format!(
        "WITH updated AS (UPDATE \"{}\" SET {} WHERE {} RETURNING *) SELECT row_to_json(updated) AS row FROM updated",
        table.table,
        assignments.join(", "),
        where_result.query
    );
    SqlResult { query, params }
}

fn delete_sql(filter: &Filter) -> SqlResult {
    let where_result = filter.to_where_sql(0);
    let query = format!(
        "WITH deleted AS (DELETE FROM \"{}\" WHERE {} RETURNING *) SELECT row_to_json(deleted) AS row FROM deleted",
        filter.table().table,
        where_result.query
    );
    SqlResult { query, params: where_result.params }
}

/// Bind with the column's SQL type so NULLs and dates arrive typed
fn bind_param<'q>(q: PgQuery<'q>, param: &'q SqlParam) -> PgQuery<'q> {
    let value = &param.value;
    match param.kind {
        ColumnType::Integer => q.bind(value.as_i64()),
        ColumnType::Boolean => q.bind(value.as_bool()),
        ColumnType::String => q.bind(value.as_str()),
        ColumnType::Date => q.bind(value.as_str().and_then(parse_date)),
    }
}
