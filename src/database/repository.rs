use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::database::manager::DatabaseError;
use crate::database::record::{Operation, Record};
use crate::database::store::{Row, Store};
use crate::entities::TableDescriptor;
use crate::filter::Filter;

/// Largest offset Postgres accepts (bigint)
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Paging controls for `paginate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    pub page: Option<u64>,
    /// Page size; `None` returns every matching row on one page
    pub limit: Option<u64>,
    pub sort: Option<Value>,
    pub select: Option<Vec<String>>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub rows: Vec<Row>,
    pub total_records: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub limit: Option<u64>,
}

/// Entity-agnostic data access, parameterized by a table binding.
///
/// Not-found is always an empty result. Storage failures propagate unchanged.
pub struct Repository {
    table: &'static TableDescriptor,
    store: Arc<dyn Store>,
}

impl Repository {
    pub fn new(table: &'static TableDescriptor, store: Arc<dyn Store>) -> Self {
        Self { table, store }
    }

    pub fn table(&self) -> &'static TableDescriptor {
        self.table
    }

    /// Compile a where object for this table
    pub fn filter(&self, where_clause: Value) -> Result<Filter, DatabaseError> {
        let mut filter = Filter::new(self.table)?;
        filter.where_clause(where_clause)?;
        Ok(filter)
    }

    pub async fn create_one(&self, data: Value, principal: i64) -> Result<Row, DatabaseError> {
        let mut created = self.create_many(vec![data], principal).await?;
        created
            .pop()
            .ok_or_else(|| DatabaseError::Decode("insert returned no row".to_string()))
    }

    pub async fn create_many(&self, data: Vec<Value>, principal: i64) -> Result<Vec<Row>, DatabaseError> {
        let now = Utc::now();
        let rows = data
            .into_iter()
            .map(|item| -> Result<Row, DatabaseError> {
                let mut record = Record::from_json(self.table, item, Operation::Create)?;
                record.stamp_create(principal, now);
                Ok(record.into_row())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let created = self.store.insert(self.table, rows).await?;
        tracing::info!("Created {} {} row(s) for user {}", created.len(), self.table.name, principal);
        Ok(created)
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Row>, DatabaseError> {
        let mut filter = filter.clone();
        filter.limit(Some(1), None);
        Ok(self.store.select(&filter).await?.into_iter().next())
    }

    pub async fn find_all(&self, filter: &Filter) -> Result<Vec<Row>, DatabaseError> {
        self.store.select(filter).await
    }

    pub async fn paginate(&self, filter: &Filter, options: &PageOptions) -> Result<Page, DatabaseError> {
        let mut filter = filter.clone();
        filter.include_deleted(options.include_deleted);
        if let Some(sort) = &options.sort {
            filter.order(sort.clone())?;
        }
        if let Some(select) = &options.select {
            filter.select(select.clone())?;
        }

        let current_page = options.page.unwrap_or(1).max(1);
        // Offset steps by the capped page size
        filter.limit(options.limit.filter(|l| *l > 0), None);
        let limit = filter.limit_value();
        let offset = limit.map(|l| (current_page - 1).saturating_mul(l).min(MAX_OFFSET));
        filter.limit(limit, offset);

        let total_records = self.store.count(&filter).await?;
        let rows = self.store.select(&filter).await?;
        let total_pages = match limit {
            Some(l) => total_records.div_ceil(l),
            None => total_records.min(1),
        };

        Ok(Page { rows, total_records, total_pages, current_page, limit })
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        self.store.count(filter).await
    }

    pub async fn update(&self, filter: &Filter, patch: Value, principal: i64) -> Result<Vec<Row>, DatabaseError> {
        let mut record = Record::from_json(self.table, patch, Operation::Update)?;
        record.stamp_update(principal);
        let updated = self.store.update(filter, &record.into_row(), Utc::now()).await?;
        tracing::debug!("Updated {} {} row(s) for user {}", updated.len(), self.table.name, principal);
        Ok(updated)
    }

    pub async fn soft_delete(&self, filter: &Filter, principal: i64) -> Result<Vec<Row>, DatabaseError> {
        self.update(filter, json!({ self.table.lifecycle.is_deleted: true }), principal).await
    }

    pub async fn destroy(&self, filter: &Filter) -> Result<Vec<Row>, DatabaseError> {
        let removed = self.store.delete(filter).await?;
        tracing::info!("Destroyed {} {} row(s)", removed.len(), self.table.name);
        Ok(removed)
    }

    pub async fn delete_by_pk(&self, id: i64) -> Result<Option<Row>, DatabaseError> {
        let filter = Filter::by_primary_key(self.table, id)?;
        Ok(self.destroy(&filter).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::entities::{ORDER_ITEM, PATIENT, TASK};
    use std::collections::HashSet;

    fn repo(table: &'static TableDescriptor) -> Repository {
        Repository::new(table, Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn create_forces_lifecycle_flags() {
        let tasks = repo(&TASK);
        let row = tasks
            .create_one(json!({ "name": "n", "isActive": false, "isDeleted": true, "addedBy": 99 }), 7)
            .await
            .unwrap();
        assert_eq!(row["isActive"], json!(true));
        assert_eq!(row["isDeleted"], json!(false));
        assert_eq!(row["addedBy"], json!(7));
        assert_eq!(row["updatedBy"], Value::Null);
        assert!(row["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn updates_strictly_increase_updated_at() {
        let tasks = repo(&TASK);
        let created = tasks.create_one(json!({ "name": "n" }), 1).await.unwrap();
        let id = created["id"].as_i64().unwrap();
        let filter = Filter::by_primary_key(&TASK, id).unwrap();

        let mut previous = created["updatedAt"].as_str().unwrap().to_string();
        for i in 0..5 {
            let updated = tasks.update(&filter, json!({ "name": format!("n{}", i) }), 3).await.unwrap();
            let current = updated[0]["updatedAt"].as_str().unwrap().to_string();
            assert!(current > previous, "{} should be after {}", current, previous);
            assert_eq!(updated[0]["updatedBy"], json!(3));
            assert_eq!(updated[0]["addedBy"], json!(1));
            previous = current;
        }
    }

    #[tokio::test]
    async fn soft_deleted_rows_leave_default_reads_but_can_be_destroyed() {
        let tasks = repo(&TASK);
        let a = tasks.create_one(json!({ "name": "a" }), 1).await.unwrap();
        tasks.create_one(json!({ "name": "b" }), 1).await.unwrap();
        let id = a["id"].as_i64().unwrap();

        let soft = tasks.soft_delete(&Filter::by_primary_key(&TASK, id).unwrap(), 2).await.unwrap();
        assert_eq!(soft[0]["isDeleted"], json!(true));

        let all = tasks.filter(json!({})).unwrap();
        assert_eq!(tasks.count(&all).await.unwrap(), 1);
        assert!(tasks.find_one(&tasks.filter(json!({ "id": id })).unwrap()).await.unwrap().is_none());

        let mut with_deleted = all.clone();
        with_deleted.include_deleted(true);
        assert_eq!(tasks.count(&with_deleted).await.unwrap(), 2);

        let removed = tasks.delete_by_pk(id).await.unwrap();
        assert_eq!(removed.map(|r| r["name"].clone()), Some(json!("a")));
        assert!(tasks.delete_by_pk(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn count_matches_unlimited_page() {
        let items = repo(&ORDER_ITEM);
        let batch = (0..7).map(|i| json!({ "item": format!("i{}", i), "qty": i })).collect();
        items.create_many(batch, 1).await.unwrap();

        let filter = items.filter(json!({ "qty": { "$gte": 2 } })).unwrap();
        let page = items.paginate(&filter, &PageOptions::default()).await.unwrap();
        assert_eq!(items.count(&filter).await.unwrap(), page.rows.len() as u64);
        assert_eq!(page.total_records, 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.limit, None);
    }

    #[tokio::test]
    async fn paginate_orders_by_key_and_reports_pages() {
        let items = repo(&ORDER_ITEM);
        let batch = (0..5).map(|i| json!({ "item": format!("i{}", i), "qty": 10 - i })).collect();
        items.create_many(batch, 1).await.unwrap();

        let filter = items.filter(json!({})).unwrap();
        let options = PageOptions { page: Some(2), limit: Some(2), ..Default::default() };
        let page = items.paginate(&filter, &options).await.unwrap();
        let ids: Vec<_> = page.rows.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(3), json!(4)]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);

        let sorted = PageOptions { sort: Some(json!({ "qty": 1 })), limit: Some(1), ..Default::default() };
        let page = items.paginate(&filter, &sorted).await.unwrap();
        assert_eq!(page.rows[0]["qty"], json!(6));
    }

    #[tokio::test]
    async fn capped_limit_steps_pages_by_the_cap() {
        let Some(max) = crate::config::config().pagination.max_limit else {
            return;
        };
        let items = repo(&ORDER_ITEM);
        let total = max * 2 + 5;
        let batch = (0..total).map(|i| json!({ "item": format!("i{}", i) })).collect();
        items.create_many(batch, 1).await.unwrap();

        let filter = items.filter(json!({})).unwrap();
        let options = PageOptions { page: Some(2), limit: Some(max * 2), ..Default::default() };
        let page = items.paginate(&filter, &options).await.unwrap();
        assert_eq!(page.limit, Some(max));
        assert_eq!(page.rows.len() as u64, max);
        assert_eq!(page.rows[0]["id"], json!(max + 1));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_records, total);

        let last = PageOptions { page: Some(3), limit: Some(max * 2), ..Default::default() };
        let page = items.paginate(&filter, &last).await.unwrap();
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.rows[0]["id"], json!(max * 2 + 1));
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let items = repo(&ORDER_ITEM);
        let batch = (0..5).map(|i| json!({ "item": format!("i{}", i) })).collect();
        items.create_many(batch, 1).await.unwrap();
        let filter = items.filter(json!({})).unwrap();

        for page_number in [4, i64::MAX as u64, u64::MAX] {
            let options = PageOptions { page: Some(page_number), limit: Some(2), ..Default::default() };
            let page = items.paginate(&filter, &options).await.unwrap();
            assert!(page.rows.is_empty(), "page {} should be empty", page_number);
            assert_eq!(page.total_records, 5);
            assert_eq!(page.total_pages, 3);
            assert_eq!(page.current_page, page_number);
        }
    }

    #[tokio::test]
    async fn bulk_create_yields_unique_ids() {
        let tasks = repo(&TASK);
        let batch = (0..10).map(|i| json!({ "name": format!("t{}", i) })).collect();
        let created = tasks.create_many(batch, 1).await.unwrap();
        assert_eq!(created.len(), 10);
        let ids: HashSet<i64> = created.iter().filter_map(|r| r["id"].as_i64()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn unique_violation_propagates() {
        let patients = repo(&PATIENT);
        patients.create_one(json!({ "code": "P-1" }), 1).await.unwrap();
        let err = patients.create_one(json!({ "code": "P-1" }), 1).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn task_lifecycle() {
        let tasks = repo(&TASK);
        let created = tasks.create_one(json!({ "name": "write report" }), 1).await.unwrap();
        let id = created["id"].as_i64().unwrap();
        let by_id = tasks.filter(json!({ "id": id })).unwrap();

        let found = tasks.find_one(&by_id).await.unwrap().unwrap();
        assert_eq!(found["name"], json!("write report"));

        tasks.soft_delete(&Filter::by_primary_key(&TASK, id).unwrap(), 1).await.unwrap();
        let page = tasks.paginate(&tasks.filter(json!({})).unwrap(), &PageOptions::default()).await.unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 0);

        assert!(tasks.delete_by_pk(id).await.unwrap().is_some());
        assert!(tasks.find_one(&by_id).await.unwrap().is_none());
    }
}
