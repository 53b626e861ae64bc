//! # MediHub 记录转换层
//!
//! 外部记录存储使用扁平的 `*_c` 字段，页面使用视图模型。本模块负责两者之间的双向转换：
//! - 字段重命名
//! - 逗号分隔列表的拆分与合并
//! - 数字ID与关联字段的类型转换
//! - 病历 JSON 字段的解析

pub mod activity;
pub mod medical_record;
pub mod metrics;
pub mod patient;
pub mod record;
pub mod transform;

// 重新导出主要类型
pub use record::{collections, ExternalRecord, ID_FIELD};
pub use transform::{to_external, to_view, to_views, FromExternal, ToExternal};
