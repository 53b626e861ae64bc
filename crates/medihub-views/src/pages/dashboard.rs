//! 仪表盘页

use crate::load_state::LoadState;
use crate::notifications::Notifications;
use crate::view_state::ViewState;
use medihub_core::{Activity, Metrics};
use medihub_services::{ActivitiesService, MetricsService};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 默认显示的最近活动条数
pub const DEFAULT_RECENT_ACTIVITY_LIMIT: usize = 8;

/// 仪表盘数据
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub metrics: Metrics,
    pub recent_activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Loading,
    Failed { message: String },
    Ready(DashboardData),
}

/// 仪表盘页
#[derive(Clone)]
pub struct DashboardPage {
    metrics: MetricsService,
    activities: ActivitiesService,
    notifications: Notifications,
    activity_limit: usize,
    state: Arc<RwLock<ViewState<DashboardData>>>,
}

impl DashboardPage {
    pub fn new(
        metrics: MetricsService,
        activities: ActivitiesService,
        notifications: Notifications,
        activity_limit: usize,
    ) -> Self {
        Self {
            metrics,
            activities,
            notifications,
            activity_limit,
            state: Arc::new(RwLock::new(ViewState::new())),
        }
    }

    /// 并发加载指标和最近活动
    pub async fn load(&self) {
        let ticket = self.state.write().await.begin();
        debug!("Loading dashboard (generation {})", ticket.generation());

        let result = tokio::try_join!(
            self.metrics.get_current(),
            self.activities.get_recent(self.activity_limit)
        );

        let mut state = self.state.write().await;
        match result {
            Ok((metrics, recent_activities)) => {
                if state.resolve(
                    ticket,
                    DashboardData {
                        metrics,
                        recent_activities,
                    },
                ) {
                    info!("Dashboard loaded");
                }
            }
            Err(e) => {
                if state.reject(ticket, e.message()) {
                    drop(state);
                    self.notifications
                        .error("Failed to load dashboard data")
                        .await;
                }
            }
        }
    }

    pub async fn retry(&self) {
        self.load().await;
    }

    pub async fn view(&self) -> DashboardView {
        match self.state.read().await.state() {
            LoadState::Idle | LoadState::Loading => DashboardView::Loading,
            LoadState::Failed(message) => DashboardView::Failed {
                message: message.clone(),
            },
            LoadState::Ready(data) => DashboardView::Ready(data.clone()),
        }
    }
}
