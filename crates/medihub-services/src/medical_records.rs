//! 病历服务
//!
//! 每个患者最多一份病历。读取永远返回一份病历：没有记录或读取失败时退化为空病历，
//! 页面可以直接展示。保存按患者做 upsert。

use crate::latency::{Latency, Operation};
use crate::logged;
use medihub_core::{MedicalRecord, MedicalRecordDraft, RecordId, Result};
use medihub_records::medical_record::{draft_to_external, fields};
use medihub_records::{collections, to_view, ExternalRecord, ID_FIELD};
use medihub_store::{Condition, FetchQuery, RecordStore, SortDirection};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 病历服务
#[derive(Clone)]
pub struct MedicalRecordsService {
    store: Arc<dyn RecordStore>,
    latency: Latency,
}

impl MedicalRecordsService {
    pub fn new(store: Arc<dyn RecordStore>, latency: Latency) -> Self {
        Self { store, latency }
    }

    /// 查找患者已有的病历记录
    async fn find_existing(&self, patient_id: RecordId) -> Result<Option<ExternalRecord>> {
        let query = FetchQuery::new()
            .select(&fields::ALL)
            .filter(Condition::equal_to(fields::PATIENT_ID, patient_id))
            .order_by(ID_FIELD, SortDirection::Asc)
            .paging(1, 0);

        let records = self
            .store
            .fetch(collections::MEDICAL_RECORD, &query)
            .await?
            .into_records("fetch medical record")?;
        Ok(records.into_iter().next())
    }

    /// 获取患者病历，缺失或失败时返回空病历
    pub async fn get_by_patient_id(&self, patient_id: RecordId) -> MedicalRecord {
        self.latency.wait(Operation::ReadMedicalRecord).await;

        match self.find_existing(patient_id).await {
            Ok(Some(record)) => with_patient(to_view(&record), patient_id),
            Ok(None) => {
                debug!("No medical record for patient {}", patient_id);
                MedicalRecord::empty(patient_id)
            }
            Err(e) => {
                warn!("Error fetching medical record for patient {}: {}", patient_id, e);
                MedicalRecord::empty(patient_id)
            }
        }
    }

    /// 保存病历：已有记录则更新，否则新建
    pub async fn save(&self, patient_id: RecordId, draft: &MedicalRecordDraft) -> Result<MedicalRecord> {
        self.latency.wait(Operation::SaveMedicalRecord).await;

        let existing = logged(
            &format!("Error saving medical record for patient {}", patient_id),
            self.find_existing(patient_id).await,
        )?;

        let mut record = draft_to_external(patient_id, draft);
        let response = match existing.and_then(|r| r.id()) {
            Some(id) => {
                record.set_id(id);
                self.store
                    .update(collections::MEDICAL_RECORD, vec![record])
                    .await
            }
            None => {
                self.store
                    .create(collections::MEDICAL_RECORD, vec![record])
                    .await
            }
        };

        let saved = logged(
            &format!("Error saving medical record for patient {}", patient_id),
            response.and_then(|r| r.into_first_record("save medical record")),
        )?;

        info!("Saved medical record for patient {}", patient_id);
        Ok(with_patient(to_view(&saved), patient_id))
    }
}

/// 存储没有返回患者关联时补上
fn with_patient(mut record: MedicalRecord, patient_id: RecordId) -> MedicalRecord {
    if record.patient_id == 0 {
        record.patient_id = patient_id;
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use medihub_core::ClinicalNote;
    use medihub_store::MockStore;

    fn service() -> (MedicalRecordsService, Arc<MockStore>) {
        let store = Arc::new(MockStore::seeded());
        (MedicalRecordsService::new(store.clone(), Latency::none()), store)
    }

    fn note(text: &str) -> ClinicalNote {
        ClinicalNote {
            date: NaiveDate::from_ymd_opt(2024, 1, 17),
            author: "Dr. Lisa Park".to_string(),
            note: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_existing_record_is_returned() {
        let (service, _) = service();
        let record = service.get_by_patient_id(1).await;

        assert!(record.id.is_some());
        assert_eq!(record.patient_id, 1);
        assert!(!record.is_empty());
    }

    #[tokio::test]
    async fn test_missing_record_degrades_to_empty() {
        let (service, _) = service();
        let record = service.get_by_patient_id(5).await;

        assert_eq!(record, MedicalRecord::empty(5));
    }

    #[tokio::test]
    async fn test_failed_read_degrades_to_empty() {
        let (service, store) = service();
        store.set_offline(true);

        let record = service.get_by_patient_id(1).await;
        assert_eq!(record, MedicalRecord::empty(1));
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let (service, store) = service();
        let before = store.count(collections::MEDICAL_RECORD).await;

        let draft = MedicalRecordDraft {
            notes: vec![note("Admitted for appendectomy")],
            ..Default::default()
        };
        let created = service.save(5, &draft).await.unwrap();
        assert_eq!(created.patient_id, 5);
        assert_eq!(created.notes.len(), 1);
        assert_eq!(store.count(collections::MEDICAL_RECORD).await, before + 1);

        let mut revised = MedicalRecordDraft::from(created.clone());
        revised.notes.push(note("Recovering well"));
        let updated = service.save(5, &revised).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.notes.len(), 2);
        assert_eq!(store.count(collections::MEDICAL_RECORD).await, before + 1);
        assert_eq!(service.get_by_patient_id(5).await, updated);
    }

    #[tokio::test]
    async fn test_save_fails_when_offline() {
        let (service, store) = service();
        store.set_offline(true);

        let result = service.save(1, &MedicalRecordDraft::default()).await;
        assert!(result.is_err());
    }
}
