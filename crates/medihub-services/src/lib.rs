//! # MediHub 业务服务
//!
//! 每个实体一个服务，负责构造存储查询、把外部记录转换成视图模型，并在失败时
//! 记录日志后把错误返回给调用方。
//! - 患者：列表、详情、入院、部分更新、删除
//! - 活动：最近活动、全部活动、新建
//! - 病历：按患者读取（失败退化为空病历）、保存
//! - 指标：当前快照、写入快照

pub mod activities;
pub mod latency;
pub mod medical_records;
pub mod metrics;
pub mod patients;

pub use activities::ActivitiesService;
pub use latency::{Latency, Operation};
pub use medical_records::MedicalRecordsService;
pub use metrics::MetricsService;
pub use patients::PatientsService;

use medihub_core::Result;
use medihub_store::RecordStore;
use std::sync::Arc;
use tracing::error;

/// 全部服务，共享同一个存储
#[derive(Clone)]
pub struct Services {
    pub patients: PatientsService,
    pub activities: ActivitiesService,
    pub medical_records: MedicalRecordsService,
    pub metrics: MetricsService,
}

impl Services {
    pub fn new(store: Arc<dyn RecordStore>, latency: Latency) -> Self {
        tracing::info!(
            "Services using {} store (simulated latency: {})",
            store.name(),
            latency.is_enabled()
        );
        Self {
            patients: PatientsService::new(store.clone(), latency),
            activities: ActivitiesService::new(store.clone(), latency),
            medical_records: MedicalRecordsService::new(store.clone(), latency),
            metrics: MetricsService::new(store, latency),
        }
    }
}

/// 失败时记录错误日志，结果原样返回
pub(crate) fn logged<T>(context: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        error!("{}: {}", context, e);
    }
    result
}
