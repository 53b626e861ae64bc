//! # MediHub 页面状态
//!
//! 页面控制器负责加载数据、维护加载状态、客户端搜索和分页，并把修改通过服务写回：
//! - 加载状态机：`Idle → Loading → (Ready | Failed)`，失败可重试
//! - 代次票据：被取代的旧加载结果不会覆盖新状态
//! - 提示队列：加载或保存失败时给出短暂提示

pub mod load_state;
pub mod notifications;
pub mod pages;
pub mod pagination;
pub mod search;
pub mod view_state;

pub use load_state::{LoadEvent, LoadState};
pub use notifications::{Notification, NotificationLevel, Notifications};
pub use pages::{
    DashboardData, DashboardPage, DashboardView, DetailTab, DetailView, PatientDetail,
    PatientDetailPage, PatientStats, Pages, PatientsPage, PatientsView, ViewSettings,
};
pub use pagination::{clamp_page, total_pages, Page, DEFAULT_PAGE_SIZE};
pub use search::{filter, Searchable};
pub use view_state::{LoadTicket, ViewState};
