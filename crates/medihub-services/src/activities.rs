//! 活动服务
//!
//! 活动流只追加：可以查询和新建，不提供修改和删除。

use crate::latency::{Latency, Operation};
use crate::logged;
use chrono::Utc;
use medihub_core::{Activity, ActivityDraft, RecordId, Result};
use medihub_records::activity::fields;
use medihub_records::{collections, to_external, to_view, to_views};
use medihub_store::{FetchQuery, RecordStore, SortDirection};
use std::sync::Arc;
use tracing::info;

/// 活动服务
#[derive(Clone)]
pub struct ActivitiesService {
    store: Arc<dyn RecordStore>,
    latency: Latency,
}

impl ActivitiesService {
    pub fn new(store: Arc<dyn RecordStore>, latency: Latency) -> Self {
        Self { store, latency }
    }

    fn newest_first() -> FetchQuery {
        FetchQuery::new()
            .select(&fields::ALL)
            .order_by(fields::TIMESTAMP, SortDirection::Desc)
    }

    /// 最近的 `limit` 条活动
    pub async fn get_recent(&self, limit: usize) -> Result<Vec<Activity>> {
        self.latency.wait(Operation::RecentActivities).await;

        let query = Self::newest_first().paging(limit, 0);
        let response = self.store.fetch(collections::ACTIVITY, &query).await;
        let records = logged(
            "Error fetching recent activities",
            response.and_then(|r| r.into_records("fetch activities")),
        )?;

        Ok(to_views(&records))
    }

    /// 全部活动，按时间倒序
    pub async fn get_all(&self) -> Result<Vec<Activity>> {
        self.latency.wait(Operation::ListActivities).await;

        let response = self
            .store
            .fetch(collections::ACTIVITY, &Self::newest_first())
            .await;
        let records = logged(
            "Error fetching activities",
            response.and_then(|r| r.into_records("fetch activities")),
        )?;

        Ok(to_views(&records))
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<Activity> {
        self.latency.wait(Operation::GetActivity).await;

        let response = self.store.get_by_id(collections::ACTIVITY, id).await;
        let record = logged(
            &format!("Error fetching activity {}", id),
            response.and_then(|r| r.into_record("fetch activity", "Activity not found")),
        )?;

        Ok(to_view(&record))
    }

    /// 记录新活动，未指定时间时使用当前时间
    pub async fn create(&self, mut draft: ActivityDraft) -> Result<Activity> {
        self.latency.wait(Operation::CreateActivity).await;

        if draft.timestamp.is_none() {
            draft.timestamp = Some(Utc::now());
        }

        let response = self
            .store
            .create(collections::ACTIVITY, vec![to_external(&draft)])
            .await;
        let record = logged(
            "Error creating activity",
            response.and_then(|r| r.into_first_record("create activity")),
        )?;

        let activity: Activity = to_view(&record);
        info!(
            "Recorded {} activity {} for {}",
            activity.activity_type, activity.id, activity.patient_name
        );
        Ok(activity)
    }
}
