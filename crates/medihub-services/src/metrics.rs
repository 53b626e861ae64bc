//! 仪表盘指标服务
//!
//! 指标集合中ID最大的一条为当前快照，没有快照时各项为零。

use crate::latency::{Latency, Operation};
use crate::logged;
use medihub_core::{Metrics, Result};
use medihub_records::metrics::fields;
use medihub_records::{collections, to_external, to_view, ID_FIELD};
use medihub_store::{FetchQuery, RecordStore, SortDirection};
use std::sync::Arc;
use tracing::{debug, info};

/// 指标服务
#[derive(Clone)]
pub struct MetricsService {
    store: Arc<dyn RecordStore>,
    latency: Latency,
}

impl MetricsService {
    pub fn new(store: Arc<dyn RecordStore>, latency: Latency) -> Self {
        Self { store, latency }
    }

    /// 当前指标快照
    pub async fn get_current(&self) -> Result<Metrics> {
        self.latency.wait(Operation::ReadMetrics).await;

        let query = FetchQuery::new()
            .select(&fields::ALL)
            .order_by(ID_FIELD, SortDirection::Desc)
            .paging(1, 0);

        let response = self.store.fetch(collections::METRIC, &query).await;
        let records = logged(
            "Error fetching metrics",
            response.and_then(|r| r.into_records("fetch metrics")),
        )?;

        match records.first() {
            Some(record) => Ok(to_view(record)),
            None => {
                debug!("No metrics snapshot recorded yet");
                Ok(Metrics::default())
            }
        }
    }

    /// 写入新的指标快照，之后成为当前快照
    pub async fn record(&self, metrics: &Metrics) -> Result<Metrics> {
        self.latency.wait(Operation::RecordMetrics).await;

        let response = self
            .store
            .create(collections::METRIC, vec![to_external(metrics)])
            .await;
        let record = logged(
            "Error recording metrics",
            response.and_then(|r| r.into_first_record("record metrics")),
        )?;

        info!("Recorded metrics snapshot {:?}", record.id());
        Ok(to_view(&record))
    }
}
