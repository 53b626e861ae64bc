//! 页面控制器

pub mod dashboard;
pub mod patient_detail;
pub mod patients;

pub use dashboard::{DashboardData, DashboardPage, DashboardView, DEFAULT_RECENT_ACTIVITY_LIMIT};
pub use patient_detail::{DetailTab, DetailView, PatientDetail, PatientDetailPage};
pub use patients::{PatientStats, PatientsPage, PatientsView};

use crate::notifications::Notifications;
use crate::pagination::DEFAULT_PAGE_SIZE;
use medihub_services::Services;

/// 页面参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub page_size: usize,
    pub recent_activity_limit: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            recent_activity_limit: DEFAULT_RECENT_ACTIVITY_LIMIT,
        }
    }
}

/// 全部页面，共享服务和提示队列
#[derive(Clone)]
pub struct Pages {
    pub dashboard: DashboardPage,
    pub patients: PatientsPage,
    pub patient_detail: PatientDetailPage,
    pub notifications: Notifications,
}

impl Pages {
    pub fn new(services: &Services, settings: ViewSettings) -> Self {
        let notifications = Notifications::default();
        Self {
            dashboard: DashboardPage::new(
                services.metrics.clone(),
                services.activities.clone(),
                notifications.clone(),
                settings.recent_activity_limit,
            ),
            patients: PatientsPage::new(
                services.patients.clone(),
                notifications.clone(),
                settings.page_size,
            ),
            patient_detail: PatientDetailPage::new(
                services.patients.clone(),
                services.medical_records.clone(),
                notifications.clone(),
            ),
            notifications,
        }
    }
}
