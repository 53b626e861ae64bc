//! 患者详情页
//!
//! 同时加载患者和病历，任一失败则整页失败。支持标签切换和患者信息编辑。

use crate::load_state::LoadState;
use crate::notifications::Notifications;
use crate::view_state::ViewState;
use medihub_core::{MedicalRecord, MediHubError, Patient, PatientPatch, RecordId, Result};
use medihub_services::{MedicalRecordsService, PatientsService};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 详情页标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetailTab {
    #[default]
    Overview,
    MedicalHistory,
    CurrentTreatment,
    Medications,
    LabResults,
    Notes,
}

impl DetailTab {
    pub const ALL: [DetailTab; 6] = [
        Self::Overview,
        Self::MedicalHistory,
        Self::CurrentTreatment,
        Self::Medications,
        Self::LabResults,
        Self::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::MedicalHistory => "history",
            Self::CurrentTreatment => "treatment",
            Self::Medications => "medications",
            Self::LabResults => "labs",
            Self::Notes => "notes",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::MedicalHistory => "Medical History",
            Self::CurrentTreatment => "Current Treatment",
            Self::Medications => "Medications",
            Self::LabResults => "Lab Results",
            Self::Notes => "Notes",
        }
    }

    /// 按短名或标题解析，不区分大小写
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(value) || tab.label().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 详情页数据
#[derive(Debug, Clone, PartialEq)]
pub struct PatientDetail {
    pub patient: Patient,
    pub medical_record: MedicalRecord,
}

/// 详情页展示状态
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loading,
    Failed {
        message: String,
    },
    Ready {
        /// 编辑中时为应用了未保存修改的患者
        patient: Patient,
        medical_record: MedicalRecord,
        tab: DetailTab,
        editing: bool,
    },
}

#[derive(Debug, Default)]
struct DetailState {
    patient_id: Option<RecordId>,
    detail: ViewState<PatientDetail>,
    tab: DetailTab,
    pending_edit: Option<PatientPatch>,
}

/// 患者详情页
#[derive(Clone)]
pub struct PatientDetailPage {
    patients: PatientsService,
    medical_records: MedicalRecordsService,
    notifications: Notifications,
    state: Arc<RwLock<DetailState>>,
}

impl PatientDetailPage {
    pub fn new(
        patients: PatientsService,
        medical_records: MedicalRecordsService,
        notifications: Notifications,
    ) -> Self {
        Self {
            patients,
            medical_records,
            notifications,
            state: Arc::new(RwLock::new(DetailState::default())),
        }
    }

    /// 加载指定患者，后发起的加载会取代尚未完成的旧加载
    pub async fn load(&self, patient_id: RecordId) {
        let ticket = {
            let mut state = self.state.write().await;
            if state.patient_id != Some(patient_id) {
                state.tab = DetailTab::Overview;
            }
            state.patient_id = Some(patient_id);
            state.pending_edit = None;
            state.detail.begin()
        };
        debug!(
            "Loading patient {} (generation {})",
            patient_id,
            ticket.generation()
        );

        let result = tokio::try_join!(self.patients.get_by_id(patient_id), async {
            Ok::<_, MediHubError>(self.medical_records.get_by_patient_id(patient_id).await)
        });

        let mut state = self.state.write().await;
        match result {
            Ok((patient, medical_record)) => {
                if state.detail.resolve(
                    ticket,
                    PatientDetail {
                        patient,
                        medical_record,
                    },
                ) {
                    info!("Loaded patient {}", patient_id);
                }
            }
            Err(e) => {
                if state.detail.reject(ticket, e.message()) {
                    drop(state);
                    self.notifications.error("Failed to load patient data").await;
                }
            }
        }
    }

    /// 重新加载当前患者
    pub async fn retry(&self) {
        let patient_id = self.state.read().await.patient_id;
        if let Some(id) = patient_id {
            self.load(id).await;
        }
    }

    pub async fn select_tab(&self, tab: DetailTab) {
        self.state.write().await.tab = tab;
    }

    pub async fn tab(&self) -> DetailTab {
        self.state.read().await.tab
    }

    pub async fn is_editing(&self) -> bool {
        self.state.read().await.pending_edit.is_some()
    }

    /// 进入编辑模式，只有数据加载完成后才能编辑
    pub async fn begin_edit(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if state.detail.data().is_none() {
            return Err(MediHubError::InvalidStateTransition {
                from: state.detail.state().name().to_string(),
                event: "edit".to_string(),
            });
        }
        state.pending_edit.get_or_insert_with(PatientPatch::default);
        Ok(())
    }

    /// 累积一次修改
    pub async fn edit(&self, patch: PatientPatch) -> Result<()> {
        let mut state = self.state.write().await;
        match state.pending_edit.as_mut() {
            Some(pending) => {
                pending.merge(patch);
                Ok(())
            }
            None => Err(not_editing("edit")),
        }
    }

    /// 放弃未保存的修改
    pub async fn cancel_edit(&self) {
        self.state.write().await.pending_edit = None;
    }

    /// 保存修改。成功后退出编辑模式并用服务返回的患者刷新页面；失败时保留修改
    ///
    /// 保存期间如果页面已切换或重新加载，结果只写入存储，不改动当前页面状态。
    pub async fn save(&self) -> Result<Patient> {
        let (patient_id, generation, patch) = {
            let state = self.state.read().await;
            let patch = state.pending_edit.clone().ok_or_else(|| not_editing("save"))?;
            let patient_id = state
                .detail
                .data()
                .map(|d| d.patient.id)
                .ok_or_else(|| not_editing("save"))?;
            (patient_id, state.detail.generation(), patch)
        };

        match self.patients.update(patient_id, &patch).await {
            Ok(updated) => {
                {
                    let mut state = self.state.write().await;
                    if state.patient_id == Some(patient_id)
                        && state.detail.generation() == generation
                    {
                        if let Some(detail) = state.detail.data_mut() {
                            detail.patient = updated.clone();
                        }
                        state.pending_edit = None;
                    } else {
                        debug!(
                            "Page moved on while saving patient {} (generation {} -> {})",
                            patient_id,
                            generation,
                            state.detail.generation()
                        );
                    }
                }
                self.notifications
                    .success("Patient information updated successfully")
                    .await;
                Ok(updated)
            }
            Err(e) => {
                self.notifications
                    .error("Failed to update patient information")
                    .await;
                Err(e)
            }
        }
    }

    pub async fn view(&self) -> DetailView {
        let state = self.state.read().await;
        match state.detail.state() {
            LoadState::Idle | LoadState::Loading => DetailView::Loading,
            LoadState::Failed(message) => DetailView::Failed {
                message: message.clone(),
            },
            LoadState::Ready(detail) => {
                let mut patient = detail.patient.clone();
                if let Some(patch) = &state.pending_edit {
                    patch.apply_to(&mut patient);
                }
                DetailView::Ready {
                    patient,
                    medical_record: detail.medical_record.clone(),
                    tab: state.tab,
                    editing: state.pending_edit.is_some(),
                }
            }
        }
    }
}

fn not_editing(event: &str) -> MediHubError {
    MediHubError::InvalidStateTransition {
        from: "viewing".to_string(),
        event: event.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationLevel;
    use async_trait::async_trait;
    use medihub_core::PatientStatus;
    use medihub_records::ExternalRecord;
    use medihub_services::Latency;
    use medihub_store::{
        BatchResponse, FetchQuery, FetchResponse, MockStore, RecordResponse, RecordStore,
    };
    use tokio::sync::Notify;

    fn page_with(store: Arc<dyn RecordStore>) -> (PatientDetailPage, Notifications) {
        let notifications = Notifications::default();
        let page = PatientDetailPage::new(
            PatientsService::new(store.clone(), Latency::none()),
            MedicalRecordsService::new(store, Latency::none()),
            notifications.clone(),
        );
        (page, notifications)
    }

    /// 对指定患者的读取（或全部更新）会停住，直到测试放行
    struct GatedStore {
        inner: MockStore,
        gated_id: RecordId,
        gate_updates: bool,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl GatedStore {
        async fn gate(&self) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    #[async_trait]
    impl RecordStore for GatedStore {
        fn name(&self) -> &str {
            "gated"
        }

        async fn fetch(&self, collection: &str, query: &FetchQuery) -> Result<FetchResponse> {
            self.inner.fetch(collection, query).await
        }

        async fn get_by_id(&self, collection: &str, id: RecordId) -> Result<RecordResponse> {
            if id == self.gated_id {
                self.gate().await;
            }
            self.inner.get_by_id(collection, id).await
        }

        async fn create(&self, collection: &str, records: Vec<ExternalRecord>) -> Result<BatchResponse> {
            self.inner.create(collection, records).await
        }

        async fn update(&self, collection: &str, records: Vec<ExternalRecord>) -> Result<BatchResponse> {
            if self.gate_updates {
                self.gate().await;
            }
            self.inner.update(collection, records).await
        }

        async fn delete(&self, collection: &str, ids: Vec<RecordId>) -> Result<BatchResponse> {
            self.inner.delete(collection, ids).await
        }
    }

    #[tokio::test]
    async fn test_load_joins_patient_and_record() {
        let (page, _) = page_with(Arc::new(MockStore::seeded()));
        page.load(2).await;

        match page.view().await {
            DetailView::Ready {
                patient,
                medical_record,
                tab,
                editing,
            } => {
                assert_eq!(patient.name, "James Wilson");
                assert_eq!(medical_record.patient_id, 2);
                assert_eq!(tab, DetailTab::Overview);
                assert!(!editing);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_patient_without_record_still_loads() {
        let (page, _) = page_with(Arc::new(MockStore::seeded()));
        page.load(12).await;

        match page.view().await {
            DetailView::Ready { medical_record, .. } => {
                assert_eq!(medical_record, MedicalRecord::empty(12));
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_patient_fails_whole_page() {
        let (page, notifications) = page_with(Arc::new(MockStore::seeded()));
        page.load(404).await;

        assert_eq!(
            page.view().await,
            DetailView::Failed {
                message: "Patient not found".to_string()
            }
        );
        let toasts = notifications.drain().await;
        assert_eq!(toasts[0].message, "Failed to load patient data");
    }

    #[tokio::test]
    async fn test_superseded_load_is_discarded() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Arc::new(GatedStore {
            inner: MockStore::seeded(),
            gated_id: 1,
            gate_updates: false,
            entered: entered.clone(),
            release: release.clone(),
        });
        let (page, _) = page_with(store);

        let slow = tokio::spawn({
            let page = page.clone();
            async move { page.load(1).await }
        });
        entered.notified().await;

        page.load(2).await;
        release.notify_one();
        slow.await.unwrap();

        match page.view().await {
            DetailView::Ready { patient, .. } => assert_eq!(patient.id, 2),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tabs() {
        let (page, _) = page_with(Arc::new(MockStore::seeded()));
        page.load(1).await;
        page.select_tab(DetailTab::LabResults).await;
        assert_eq!(page.tab().await, DetailTab::LabResults);

        // 重新加载同一患者保留标签，换患者回到概览
        page.retry().await;
        assert_eq!(page.tab().await, DetailTab::LabResults);
        page.load(2).await;
        assert_eq!(page.tab().await, DetailTab::Overview);

        assert_eq!(DetailTab::parse("labs"), Some(DetailTab::LabResults));
        assert_eq!(DetailTab::parse("medical history"), Some(DetailTab::MedicalHistory));
        assert_eq!(DetailTab::parse("billing"), None);
    }

    #[tokio::test]
    async fn test_edit_and_save() {
        let (page, notifications) = page_with(Arc::new(MockStore::seeded()));
        page.load(1).await;

        page.begin_edit().await.unwrap();
        page.edit(PatientPatch {
            room: Some("ICU-2".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        page.edit(PatientPatch {
            status: Some(PatientStatus::Emergency),
            ..Default::default()
        })
        .await
        .unwrap();

        match page.view().await {
            DetailView::Ready { patient, editing, .. } => {
                assert!(editing);
                assert_eq!(patient.room, "ICU-2");
            }
            other => panic!("unexpected view: {:?}", other),
        }

        let saved = page.save().await.unwrap();
        assert_eq!(saved.room, "ICU-2");
        assert_eq!(saved.status, Some(PatientStatus::Emergency));
        assert!(!page.is_editing().await);

        let toasts = notifications.drain().await;
        assert_eq!(toasts[0].level, NotificationLevel::Success);
        assert_eq!(toasts[0].message, "Patient information updated successfully");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits() {
        let store = Arc::new(MockStore::seeded());
        let (page, notifications) = page_with(store.clone());
        page.load(1).await;
        page.begin_edit().await.unwrap();
        page.edit(PatientPatch {
            room: Some("ICU-2".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        store.set_offline(true);
        assert!(page.save().await.is_err());
        assert!(page.is_editing().await);

        let toasts = notifications.drain().await;
        assert_eq!(toasts[0].message, "Failed to update patient information");

        page.cancel_edit().await;
        match page.view().await {
            DetailView::Ready { patient, editing, .. } => {
                assert!(!editing);
                assert_eq!(patient.room, "301A");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_edit_requires_loaded_patient() {
        let (page, _) = page_with(Arc::new(MockStore::seeded()));
        assert!(page.begin_edit().await.is_err());
        assert!(page.edit(PatientPatch::default()).await.is_err());
        assert!(page.save().await.is_err());
    }

    #[tokio::test]
    async fn test_slow_save_keeps_next_patient_edits() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Arc::new(GatedStore {
            inner: MockStore::seeded(),
            gated_id: 0,
            gate_updates: true,
            entered: entered.clone(),
            release: release.clone(),
        });
        let (page, _) = page_with(store);

        page.load(1).await;
        page.begin_edit().await.unwrap();
        page.edit(PatientPatch {
            room: Some("ICU-2".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        let saving = tokio::spawn({
            let page = page.clone();
            async move { page.save().await }
        });
        entered.notified().await;

        page.load(2).await;
        page.begin_edit().await.unwrap();
        page.edit(PatientPatch {
            room: Some("B-7".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        release.notify_one();
        let saved = saving.await.unwrap().unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(saved.room, "ICU-2");

        assert!(page.is_editing().await);
        match page.view().await {
            DetailView::Ready { patient, editing, .. } => {
                assert!(editing);
                assert_eq!(patient.id, 2);
                assert_eq!(patient.room, "B-7");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }
}
