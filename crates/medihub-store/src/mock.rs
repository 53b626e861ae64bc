//! 内存模拟存储
//!
//! 无网络环境和测试使用的存储实现。每个集合是一个按ID排序的记录表，
//! 新记录的ID为当前最大ID加一，删除直接移除记录。

use crate::fixtures;
use crate::store::{
    BatchResponse, Condition, FetchQuery, FetchResponse, Operator, RecordResponse, RecordResult,
    RecordStore, SortDirection,
};
use async_trait::async_trait;
use medihub_core::{MediHubError, RecordId, Result};
use medihub_records::ExternalRecord;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tokio::sync::RwLock;
use tracing::{debug, info};

type Collection = BTreeMap<RecordId, ExternalRecord>;

/// 内存模拟存储
#[derive(Debug, Default)]
pub struct MockStore {
    collections: RwLock<HashMap<String, Collection>>,
    offline: AtomicBool,
}

impl MockStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建并载入内置演示数据
    pub fn seeded() -> Self {
        let collections = fixtures::seed()
            .into_iter()
            .map(|(name, records)| (name.to_string(), Self::index(records)))
            .collect();
        Self {
            collections: RwLock::new(collections),
            offline: AtomicBool::new(false),
        }
    }

    /// 使用指定记录创建单个集合
    pub fn with_collection(self, name: &str, records: Vec<ExternalRecord>) -> Self {
        let mut collections = self.collections.into_inner();
        collections.insert(name.to_string(), Self::index(records));
        Self {
            collections: RwLock::new(collections),
            offline: self.offline,
        }
    }

    /// 模拟网络中断，之后的所有调用返回传输错误
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// 集合中的记录数
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    /// 为没有ID的记录按顺序分配ID
    fn index(records: Vec<ExternalRecord>) -> Collection {
        let mut collection = Collection::new();
        for mut record in records {
            let id = match record.id() {
                Some(id) => id,
                None => next_id(&collection),
            };
            record.set_id(id);
            collection.insert(id, record);
        }
        collection
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            Err(MediHubError::Transport("Mock store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, collection: &str, query: &FetchQuery) -> Result<FetchResponse> {
        self.check_online()?;
        let collections = self.collections.read().await;

        let mut records: Vec<ExternalRecord> = collections
            .get(collection)
            .map(|c| {
                c.values()
                    .filter(|record| query.where_clauses.iter().all(|cond| matches(record, cond)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // BTreeMap 已按ID升序，排序保持稳定
        if !query.order_by.is_empty() {
            records.sort_by(|a, b| {
                for order in &query.order_by {
                    let ordering = compare_values(
                        a.get(&order.field_name),
                        b.get(&order.field_name),
                    );
                    let ordering = match order.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        if let Some(paging) = query.paging {
            records = records
                .into_iter()
                .skip(paging.offset)
                .take(paging.limit)
                .collect();
        }

        debug!("Mock fetch {} returned {} records", collection, records.len());
        Ok(FetchResponse::ok(records))
    }

    async fn get_by_id(&self, collection: &str, id: RecordId) -> Result<RecordResponse> {
        self.check_online()?;
        let collections = self.collections.read().await;
        match collections.get(collection).and_then(|c| c.get(&id)) {
            Some(record) => Ok(RecordResponse::found(record.clone())),
            None => Ok(RecordResponse::missing()),
        }
    }

    async fn create(&self, collection: &str, records: Vec<ExternalRecord>) -> Result<BatchResponse> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        let table = collections.entry(collection.to_string()).or_default();

        let mut results = Vec::with_capacity(records.len());
        for mut record in records {
            if record.is_empty() {
                results.push(RecordResult::failed(400, "Record has no fields"));
                continue;
            }

            let id = next_id(table);
            record.set_id(id);
            table.insert(id, record.clone());
            info!("Mock store created {} record {}", collection, id);
            results.push(RecordResult::ok(record));
        }

        Ok(BatchResponse::ok(results))
    }

    async fn update(&self, collection: &str, records: Vec<ExternalRecord>) -> Result<BatchResponse> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        let table = collections.entry(collection.to_string()).or_default();

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let Some(id) = record.id() else {
                results.push(RecordResult::failed(400, "Record is missing Id"));
                continue;
            };

            match table.get_mut(&id) {
                Some(existing) => {
                    existing.merge_from(&record);
                    info!("Mock store updated {} record {}", collection, id);
                    results.push(RecordResult::ok(existing.clone()));
                }
                None => {
                    results.push(RecordResult::failed(404, format!("Record {} not found", id)));
                }
            }
        }

        Ok(BatchResponse::ok(results))
    }

    async fn delete(&self, collection: &str, ids: Vec<RecordId>) -> Result<BatchResponse> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        let table = collections.entry(collection.to_string()).or_default();

        let results = ids
            .into_iter()
            .map(|id| match table.remove(&id) {
                Some(_) => {
                    info!("Mock store deleted {} record {}", collection, id);
                    RecordResult {
                        success: true,
                        ..Default::default()
                    }
                }
                None => RecordResult::failed(404, format!("Record {} not found", id)),
            })
            .collect();

        Ok(BatchResponse::ok(results))
    }
}

/// 最大ID加一
fn next_id(collection: &Collection) -> RecordId {
    collection.keys().next_back().map(|id| id + 1).unwrap_or(1)
}

/// 关联字段比较时取其中的ID
fn comparable(value: &Value) -> &Value {
    match value {
        Value::Object(obj) => obj.get("Id").unwrap_or(value),
        other => other,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    let (a, b) = (comparable(a), comparable(b));
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => as_text(a).eq_ignore_ascii_case(&as_text(b)),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.map(comparable), b.map(comparable)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(_), Value::Number(_)) => as_number(a)
                .partial_cmp(&as_number(b))
                .unwrap_or(Ordering::Equal),
            _ => as_text(a).cmp(&as_text(b)),
        },
    }
}

fn matches(record: &ExternalRecord, condition: &Condition) -> bool {
    let field = record.get(&condition.field_name);
    let values = &condition.values;

    match condition.operator {
        Operator::EqualTo => {
            field.is_some_and(|f| values.iter().any(|v| loosely_equal(f, v)))
        }
        Operator::NotEqualTo => {
            !field.is_some_and(|f| values.iter().any(|v| loosely_equal(f, v)))
        }
        Operator::Contains => field.is_some_and(|f| {
            let text = as_text(comparable(f)).to_lowercase();
            values
                .iter()
                .any(|v| text.contains(&as_text(v).to_lowercase()))
        }),
        Operator::GreaterThan => field.is_some_and(|f| {
            values
                .iter()
                .any(|v| compare_values(Some(f), Some(v)) == Ordering::Greater)
        }),
        Operator::LessThan => field.is_some_and(|f| {
            values
                .iter()
                .any(|v| compare_values(Some(f), Some(v)) == Ordering::Less)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medihub_records::collections;
    use serde_json::json;

    fn record(value: Value) -> ExternalRecord {
        ExternalRecord::try_from(value).unwrap()
    }

    fn store() -> MockStore {
        MockStore::new().with_collection(
            "patient_c",
            vec![
                record(json!({"Id": 1, "name_c": "Ann", "age_c": 40})),
                record(json!({"Id": 4, "name_c": "Bob", "age_c": 25})),
                record(json!({"Id": 2, "name_c": "Cid", "age_c": 61})),
            ],
        )
    }

    #[tokio::test]
    async fn test_create_assigns_max_plus_one() {
        let store = store();
        let response = store
            .create("patient_c", vec![record(json!({"name_c": "Dee"}))])
            .await
            .unwrap();

        let created = response.into_first_record("create patient").unwrap();
        assert_eq!(created.id(), Some(5));
        assert_eq!(store.count("patient_c").await, 4);
    }

    #[tokio::test]
    async fn test_create_in_empty_collection_starts_at_one() {
        let store = MockStore::new();
        let created = store
            .create("activity_c", vec![record(json!({"type_c": "admission"}))])
            .await
            .unwrap()
            .into_first_record("create activity")
            .unwrap();
        assert_eq!(created.id(), Some(1));
    }

    #[tokio::test]
    async fn test_fetch_sorts_and_pages() {
        let store = store();
        let query = FetchQuery::new()
            .order_by("Id", SortDirection::Desc)
            .paging(2, 0);
        let records = store
            .fetch("patient_c", &query)
            .await
            .unwrap()
            .into_records("fetch")
            .unwrap();

        let ids: Vec<_> = records.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec![4, 2]);
    }

    #[tokio::test]
    async fn test_fetch_filters() {
        let store = store();
        let query = FetchQuery::new().filter(Condition::new("age_c", Operator::GreaterThan, 30));
        let records = store.fetch("patient_c", &query).await.unwrap().data.unwrap();
        assert_eq!(records.len(), 2);

        let query = FetchQuery::new().filter(Condition::new("name_c", Operator::Contains, "o"));
        let records = store.fetch("patient_c", &query).await.unwrap().data.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].string("name_c"), "Bob");

        let query = FetchQuery::new().filter(Condition::equal_to("Id", "2"));
        let records = store.fetch("patient_c", &query).await.unwrap().data.unwrap();
        assert_eq!(records[0].id(), Some(2));
    }

    #[tokio::test]
    async fn test_filter_matches_lookup_objects() {
        let store = MockStore::new().with_collection(
            collections::MEDICAL_RECORD,
            vec![record(json!({"Id": 1, "patient_id_c": {"Id": 3, "Name": "Emily"}}))],
        );
        let query = FetchQuery::new().filter(Condition::equal_to("patient_id_c", 3));
        let records = store
            .fetch(collections::MEDICAL_RECORD, &query)
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_and_reports_missing() {
        let store = store();
        let response = store
            .update(
                "patient_c",
                vec![
                    record(json!({"Id": 1, "age_c": 41})),
                    record(json!({"Id": 99, "age_c": 1})),
                ],
            )
            .await
            .unwrap();

        let failure = response.first_failure().unwrap();
        assert_eq!(failure.code, Some(404));

        let updated = store.get_by_id("patient_c", 1).await.unwrap().data.unwrap();
        assert_eq!(updated.count("age_c"), 41);
        assert_eq!(updated.string("name_c"), "Ann");
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = store();
        store.delete("patient_c", vec![4]).await.unwrap();
        assert!(store.get_by_id("patient_c", 4).await.unwrap().data.is_none());

        let again = store.delete("patient_c", vec![4]).await.unwrap();
        assert!(again.into_records("delete").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_offline_store_fails_with_transport_error() {
        let store = store();
        store.set_offline(true);
        let err = store.fetch("patient_c", &FetchQuery::new()).await.unwrap_err();
        assert!(matches!(err, MediHubError::Transport(_)));

        store.set_offline(false);
        assert!(store.fetch("patient_c", &FetchQuery::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_seeded_store_has_every_collection() {
        let store = MockStore::seeded();
        assert!(store.count(collections::PATIENT).await > 0);
        assert!(store.count(collections::ACTIVITY).await > 0);
        assert!(store.count(collections::MEDICAL_RECORD).await > 0);
        assert_eq!(store.count(collections::METRIC).await, 1);
    }
}
