//! Process-local storage with the same observable behavior as Postgres:
//! autoincrement keys, unique columns, atomic batches and SQL filter semantics.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{canonicalize, Row, Store};
use crate::entities::{format_timestamp, parse_date, TableDescriptor};
use crate::filter::Filter;

#[derive(Default)]
struct MemoryTable {
    last_id: i64,
    rows: BTreeMap<i64, Row>,
}

impl MemoryTable {
    fn matching_ids(&self, filter: &Filter) -> Vec<i64> {
        self.rows
            .iter()
            .filter(|(_, row)| filter.matches(row))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Reject a value already held by another row in a unique column
    fn check_unique(&self, table: &TableDescriptor, row: &Row, skip: &[i64]) -> Result<(), DatabaseError> {
        for column in table.unique_columns() {
            let value = match row.get(column.name) {
                Some(v) if !v.is_null() => v,
                _ => continue,
            };
            let taken = self
                .rows
                .iter()
                .any(|(id, other)| !skip.contains(id) && other.get(column.name) == Some(value));
            if taken {
                return Err(DatabaseError::UniqueViolation(format!("{}_{}_key", table.table, column.name)));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, table: &'static TableDescriptor, rows: Vec<Row>) -> Result<Vec<Row>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table.table).or_default();

        // Stage the whole batch first so a violation leaves nothing behind
        let mut staged = MemoryTable { last_id: stored.last_id, rows: BTreeMap::new() };
        for row in rows {
            stored.check_unique(table, &row, &[])?;
            staged.check_unique(table, &row, &[])?;
            staged.last_id += 1;
            let mut row = canonicalize(table, row);
            row.insert(table.primary_key.to_string(), Value::from(staged.last_id));
            staged.rows.insert(staged.last_id, row);
        }

        stored.last_id = staged.last_id;
        let created: Vec<Row> = staged.rows.values().cloned().collect();
        stored.rows.append(&mut staged.rows);
        Ok(created)
    }

    async fn select(&self, filter: &Filter) -> Result<Vec<Row>, DatabaseError> {
        let tables = self.tables.read().await;
        let Some(stored) = tables.get(filter.table().table) else {
            return Ok(vec![]);
        };

        let mut rows: Vec<Row> = stored.rows.values().filter(|row| filter.matches(row)).cloned().collect();
        filter.sort(&mut rows);
        Ok(filter.window(rows).into_iter().map(|row| filter.project(row)).collect())
    }

    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(filter.table().table)
            .map_or(0, |stored| stored.rows.values().filter(|row| filter.matches(row)).count() as u64))
    }

    async fn update(&self, filter: &Filter, patch: &Row, touched_at: DateTime<Utc>) -> Result<Vec<Row>, DatabaseError> {
        let table = filter.table();
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.get_mut(table.table) else {
            return Ok(vec![]);
        };

        let ids = stored.matching_ids(filter);
        if ids.len() > 1 && table.unique_columns().any(|c| patch.get(c.name).map_or(false, |v| !v.is_null())) {
            return Err(DatabaseError::UniqueViolation(format!("{}_unique_key", table.table)));
        }
        stored.check_unique(table, patch, &ids)?;

        let updated_at = table.lifecycle.updated_at;
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(row) = stored.rows.get_mut(&id) else { continue };
            let previous = row.get(updated_at).and_then(Value::as_str).and_then(parse_date);
            for (key, value) in patch {
                row.insert(key.clone(), value.clone());
            }
            let stamp = match previous {
                Some(prev) if prev + Duration::microseconds(1) > touched_at => prev + Duration::microseconds(1),
                _ => touched_at,
            };
            row.insert(updated_at.to_string(), Value::String(format_timestamp(stamp)));
            updated.push(row.clone());
        }

        filter.sort(&mut updated);
        Ok(updated)
    }

    async fn delete(&self, filter: &Filter) -> Result<Vec<Row>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.get_mut(filter.table().table) else {
            return Ok(vec![]);
        };

        let mut removed: Vec<Row> = stored
            .matching_ids(filter)
            .into_iter()
            .filter_map(|id| stored.rows.remove(&id))
            .collect();
        filter.sort(&mut removed);
        Ok(removed)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PATIENT, TASK};
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_fills_columns() {
        let store = MemoryStore::new();
        let rows = store
            .insert(&TASK, vec![row(json!({ "name": "a" })), row(json!({ "name": "b" }))])
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[1]["id"], json!(2));
        assert_eq!(rows[0]["dueDate"], Value::Null);

        let more = store.insert(&TASK, vec![row(json!({ "name": "c" }))]).await.unwrap();
        assert_eq!(more[0]["id"], json!(3));
    }

    #[tokio::test]
    async fn unique_violation_rolls_back_the_whole_batch() {
        let store = MemoryStore::new();
        store.insert(&PATIENT, vec![row(json!({ "code": "P1" }))]).await.unwrap();

        let result = store
            .insert(&PATIENT, vec![row(json!({ "code": "P2" })), row(json!({ "code": "P1" }))])
            .await;
        assert!(matches!(result, Err(DatabaseError::UniqueViolation(_))));

        let dup_in_batch = store
            .insert(&PATIENT, vec![row(json!({ "code": "P3" })), row(json!({ "code": "P3" }))])
            .await;
        assert!(matches!(dup_in_batch, Err(DatabaseError::UniqueViolation(_))));

        let filter = Filter::new(&PATIENT).unwrap();
        assert_eq!(store.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_moves_updated_at_forward_even_with_a_stale_clock() {
        let store = MemoryStore::new();
        let created = store
            .insert(&TASK, vec![row(json!({ "name": "a", "updatedAt": "2030-01-01T00:00:00Z" }))])
            .await
            .unwrap();
        assert_eq!(created[0]["updatedAt"], json!("2030-01-01T00:00:00.000000Z"));

        let filter = Filter::by_primary_key(&TASK, 1).unwrap();
        let updated = store.update(&filter, &row(json!({ "name": "b" })), Utc::now()).await.unwrap();
        assert_eq!(updated[0]["name"], json!("b"));
        assert_eq!(updated[0]["updatedAt"], json!("2030-01-01T00:00:00.000001Z"));
    }

    #[tokio::test]
    async fn delete_returns_removed_rows() {
        let store = MemoryStore::new();
        store
            .insert(&TASK, vec![row(json!({ "name": "a" })), row(json!({ "name": "b" }))])
            .await
            .unwrap();
        let mut filter = Filter::new(&TASK).unwrap();
        filter.where_clause(json!({ "name": "a" })).unwrap();

        let removed = store.delete(&filter).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert!(store.delete(&filter).await.unwrap().is_empty());
        assert_eq!(store.count(&Filter::new(&TASK).unwrap()).await.unwrap(), 1);
    }
}
