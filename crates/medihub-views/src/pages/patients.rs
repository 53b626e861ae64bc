//! 患者列表页
//!
//! 一次加载全部患者，搜索和分页都在已加载的列表上进行。

use crate::load_state::LoadState;
use crate::notifications::Notifications;
use crate::pagination::{clamp_page, Page};
use crate::search::filter;
use crate::view_state::ViewState;
use medihub_core::{Patient, PatientStatus};
use medihub_services::PatientsService;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 按住院状态统计，基于全部已加载患者而不是搜索结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatientStats {
    pub total: usize,
    pub admitted: usize,
    pub emergency: usize,
    pub discharged: usize,
}

impl PatientStats {
    pub fn of(patients: &[Patient]) -> Self {
        let count = |status: PatientStatus| {
            patients
                .iter()
                .filter(|p| p.status == Some(status))
                .count()
        };
        Self {
            total: patients.len(),
            admitted: count(PatientStatus::Admitted),
            emergency: count(PatientStatus::Emergency),
            discharged: count(PatientStatus::Discharged),
        }
    }
}

/// 列表页展示状态
#[derive(Debug, Clone, PartialEq)]
pub enum PatientsView {
    Loading,
    Failed {
        message: String,
    },
    /// 没有患者，或搜索没有匹配
    Empty {
        search: String,
        stats: PatientStats,
    },
    Ready {
        stats: PatientStats,
        rows: Vec<Patient>,
        page: usize,
        total_pages: usize,
        total_matches: usize,
        start: usize,
        end: usize,
    },
}

#[derive(Debug, Default)]
struct PatientsState {
    patients: ViewState<Vec<Patient>>,
    search: String,
    page: usize,
}

impl PatientsState {
    fn matching(&self) -> Vec<Patient> {
        match self.patients.data() {
            Some(patients) => filter(patients, &self.search).into_iter().cloned().collect(),
            None => Vec::new(),
        }
    }
}

/// 患者列表页
#[derive(Clone)]
pub struct PatientsPage {
    service: PatientsService,
    notifications: Notifications,
    page_size: usize,
    state: Arc<RwLock<PatientsState>>,
}

impl PatientsPage {
    pub fn new(service: PatientsService, notifications: Notifications, page_size: usize) -> Self {
        Self {
            service,
            notifications,
            page_size: page_size.max(1),
            state: Arc::new(RwLock::new(PatientsState {
                page: 1,
                ..Default::default()
            })),
        }
    }

    /// 加载患者列表，失败时进入错误状态并提示
    pub async fn load(&self) {
        let ticket = self.state.write().await.patients.begin();
        debug!("Loading patients (generation {})", ticket.generation());

        let result = self.service.get_all().await;

        let mut state = self.state.write().await;
        match result {
            Ok(patients) => {
                let count = patients.len();
                if state.patients.resolve(ticket, patients) {
                    info!("Loaded {} patients", count);
                    let matches = state.matching().len();
                    state.page = clamp_page(state.page, matches, self.page_size);
                }
            }
            Err(e) => {
                if state.patients.reject(ticket, e.message()) {
                    drop(state);
                    self.notifications.error("Failed to load patients").await;
                }
            }
        }
    }

    /// 失败后重试
    pub async fn retry(&self) {
        self.load().await;
    }

    /// 设置搜索词，回到第一页
    pub async fn search(&self, term: &str) {
        let mut state = self.state.write().await;
        state.search = term.trim().to_string();
        state.page = 1;
    }

    pub async fn search_term(&self) -> String {
        self.state.read().await.search.clone()
    }

    /// 跳到指定页，超出范围时限制到最近的有效页
    pub async fn go_to_page(&self, page: usize) -> usize {
        let mut state = self.state.write().await;
        let matches = state.matching().len();
        state.page = clamp_page(page, matches, self.page_size);
        state.page
    }

    pub async fn next_page(&self) -> usize {
        let current = self.current_page().await;
        self.go_to_page(current + 1).await
    }

    pub async fn previous_page(&self) -> usize {
        let current = self.current_page().await;
        self.go_to_page(current.saturating_sub(1)).await
    }

    pub async fn current_page(&self) -> usize {
        self.state.read().await.page
    }

    pub async fn view(&self) -> PatientsView {
        let state = self.state.read().await;
        match state.patients.state() {
            LoadState::Idle | LoadState::Loading => PatientsView::Loading,
            LoadState::Failed(message) => PatientsView::Failed {
                message: message.clone(),
            },
            LoadState::Ready(patients) => {
                let stats = PatientStats::of(patients);
                let matching = state.matching();
                if matching.is_empty() {
                    return PatientsView::Empty {
                        search: state.search.clone(),
                        stats,
                    };
                }
                let page = Page::of(&matching, state.page, self.page_size);
                PatientsView::Ready {
                    stats,
                    rows: page.items,
                    page: page.page,
                    total_pages: page.total_pages,
                    total_matches: page.total,
                    start: page.start,
                    end: page.end,
                }
            }
        }
    }
}
