//! # MediHub 记录存储
//!
//! 服务层访问的外部记录存储：
//! - `RecordStore` 接口：查询、按ID获取、批量创建/更新/删除
//! - 远程HTTP存储实现
//! - 内存模拟存储实现，启动时载入演示数据

pub mod fixtures;
pub mod mock;
pub mod remote;
pub mod store;

pub use mock::MockStore;
pub use remote::{RemoteSettings, RemoteStore};
pub use store::{
    BatchResponse, Condition, FetchQuery, FetchResponse, Operator, OrderBy, Paging,
    RecordResponse, RecordResult, RecordStore, SortDirection,
};
