//! 患者服务
//!
//! 患者的增删改查。读取结果按ID倒序（新入院在前），新建时若未指定入院时间
//! 则填写当前时间，更新只写回补丁中给出的字段。

use crate::latency::{Latency, Operation};
use crate::logged;
use chrono::Utc;
use medihub_core::{Patient, PatientDraft, PatientPatch, RecordId, Result};
use medihub_records::patient::fields;
use medihub_records::{collections, to_external, to_view, to_views, ID_FIELD};
use medihub_store::{FetchQuery, RecordStore, SortDirection};
use std::sync::Arc;
use tracing::info;

/// 患者服务
#[derive(Clone)]
pub struct PatientsService {
    store: Arc<dyn RecordStore>,
    latency: Latency,
}

impl PatientsService {
    pub fn new(store: Arc<dyn RecordStore>, latency: Latency) -> Self {
        Self { store, latency }
    }

    /// 获取全部患者，新入院在前
    pub async fn get_all(&self) -> Result<Vec<Patient>> {
        self.latency.wait(Operation::ListPatients).await;

        let query = FetchQuery::new()
            .select(&fields::ALL)
            .order_by(ID_FIELD, SortDirection::Desc);

        let response = self.store.fetch(collections::PATIENT, &query).await;
        let records = logged(
            "Error fetching patients",
            response.and_then(|r| r.into_records("fetch patients")),
        )?;

        Ok(to_views(&records))
    }

    /// 按ID获取患者，不存在时返回 `NotFound`
    pub async fn get_by_id(&self, id: RecordId) -> Result<Patient> {
        self.latency.wait(Operation::GetPatient).await;

        let response = self.store.get_by_id(collections::PATIENT, id).await;
        let record = logged(
            &format!("Error fetching patient {}", id),
            response.and_then(|r| r.into_record("fetch patient", "Patient not found")),
        )?;

        Ok(to_view(&record))
    }

    /// 新建患者
    pub async fn create(&self, mut draft: PatientDraft) -> Result<Patient> {
        self.latency.wait(Operation::CreatePatient).await;

        if draft.admission_date.is_none() {
            draft.admission_date = Some(Utc::now());
        }

        let response = self
            .store
            .create(collections::PATIENT, vec![to_external(&draft)])
            .await;
        let record = logged(
            "Error creating patient",
            response.and_then(|r| r.into_first_record("create patient")),
        )?;

        let patient: Patient = to_view(&record);
        info!("Created patient {} ({})", patient.id, patient.name);
        Ok(patient)
    }

    /// 部分更新患者，未给出的字段保持原值
    pub async fn update(&self, id: RecordId, patch: &PatientPatch) -> Result<Patient> {
        self.latency.wait(Operation::UpdatePatient).await;

        let mut record = to_external(patch);
        record.set_id(id);

        let response = self.store.update(collections::PATIENT, vec![record]).await;
        let updated = logged(
            &format!("Error updating patient {}", id),
            response.and_then(|r| r.into_first_record("update patient")),
        )?;

        info!("Updated patient {}", id);
        Ok(to_view(&updated))
    }

    /// 删除患者
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.latency.wait(Operation::DeletePatient).await;

        let response = self.store.delete(collections::PATIENT, vec![id]).await;
        logged(
            &format!("Error deleting patient {}", id),
            response.and_then(|r| r.into_records("delete patient")),
        )?;

        info!("Deleted patient {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medihub_core::{MediHubError, PatientStatus};
    use medihub_store::MockStore;

    fn service() -> (PatientsService, Arc<MockStore>) {
        let store = Arc::new(MockStore::seeded());
        (PatientsService::new(store.clone(), Latency::none()), store)
    }

    fn draft(name: &str) -> PatientDraft {
        PatientDraft {
            name: name.to_string(),
            age: 52,
            gender: "Female".to_string(),
            assigned_doctor: "Dr. Emily Rodriguez".to_string(),
            status: Some(PatientStatus::Admitted),
            allergies: vec!["Latex".to_string(), "Aspirin".to_string()],
            room: "204".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_all_orders_newest_first() {
        let (service, _) = service();
        let patients = service.get_all().await.unwrap();

        assert_eq!(patients.len(), 12);
        assert!(patients.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (service, _) = service();
        let created = service.create(draft("Helen Park")).await.unwrap();

        assert_eq!(created.id, 13);
        assert!(created.admission_date.is_some());

        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.allergies, vec!["Latex", "Aspirin"]);
    }

    #[tokio::test]
    async fn test_create_keeps_given_admission_date() {
        let (service, _) = service();
        let admitted = Utc::now() - chrono::Duration::days(3);
        let created = service
            .create(PatientDraft {
                admission_date: Some(admitted),
                ..draft("Omar Haddad")
            })
            .await
            .unwrap();

        let stored = created.admission_date.unwrap();
        assert_eq!(stored.timestamp_millis(), admitted.timestamp_millis());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (service, _) = service();
        let before = service.get_by_id(1).await.unwrap();

        let patch = PatientPatch {
            room: Some("ICU-3".to_string()),
            status: Some(PatientStatus::Emergency),
            ..Default::default()
        };
        let updated = service.update(1, &patch).await.unwrap();

        assert_eq!(updated.room, "ICU-3");
        assert_eq!(updated.status, Some(PatientStatus::Emergency));
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.allergies, before.allergies);
        assert_eq!(service.get_by_id(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_patient() {
        let (service, _) = service();
        let err = service
            .update(999, &PatientPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (service, store) = service();
        service.delete(2).await.unwrap();

        assert_eq!(store.count(collections::PATIENT).await, 11);
        assert!(service.get_by_id(2).await.unwrap_err().is_not_found());
        assert!(service.delete(2).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_offline_store_is_transport_error() {
        let (service, store) = service();
        store.set_offline(true);

        let err = service.get_all().await.unwrap_err();
        assert!(matches!(err, MediHubError::Transport(_)));
    }
}
