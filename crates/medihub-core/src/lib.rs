//! # MediHub Core
//!
//! 医院管理仪表盘的核心模块，提供视图模型、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod utils;

pub use error::{MediHubError, Result};
pub use models::*;
