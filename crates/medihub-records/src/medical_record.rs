//! 病历记录转换
//!
//! 病历的列表字段在存储中是 JSON 字符串。整个字段无法解析时退化为空值，
//! 列表中单个条目无法解析时只丢弃该条目，两种情况都记录警告。

use crate::record::ExternalRecord;
use crate::transform::{FromExternal, ToExternal};
use medihub_core::{MedicalRecord, MedicalRecordDraft, RecordId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// `medical_record_c` 字段名
pub mod fields {
    pub const PATIENT_ID: &str = "patient_id_c";
    pub const HISTORY: &str = "history_c";
    pub const CURRENT_TREATMENT: &str = "current_treatment_c";
    pub const MEDICATIONS: &str = "medications_c";
    pub const LAB_RESULTS: &str = "lab_results_c";
    pub const NOTES: &str = "notes_c";

    pub const ALL: [&str; 6] = [
        HISTORY,
        CURRENT_TREATMENT,
        MEDICATIONS,
        LAB_RESULTS,
        NOTES,
        PATIENT_ID,
    ];
}

impl FromExternal for MedicalRecord {
    fn from_external(record: &ExternalRecord) -> Self {
        MedicalRecord {
            id: record.id(),
            patient_id: record.lookup_id(fields::PATIENT_ID).unwrap_or(0),
            history: decode_list(record, fields::HISTORY),
            current_treatment: decode_json(record, fields::CURRENT_TREATMENT),
            medications: decode_list(record, fields::MEDICATIONS),
            lab_results: decode_list(record, fields::LAB_RESULTS),
            notes: decode_list(record, fields::NOTES),
        }
    }
}

impl ToExternal for MedicalRecord {
    fn to_external(&self) -> ExternalRecord {
        let mut record = draft_to_external(
            self.patient_id,
            &MedicalRecordDraft::from(self.clone()),
        );
        if let Some(id) = self.id {
            record.set_id(id);
        }
        record
    }
}

/// 病历保存数据 -> 外部记录
///
/// 空列表写 null，与读取时的"缺失即空"对称。
pub fn draft_to_external(patient_id: RecordId, draft: &MedicalRecordDraft) -> ExternalRecord {
    let mut record = ExternalRecord::new();
    record.set(fields::HISTORY, encode_list(&draft.history));
    record.set(
        fields::CURRENT_TREATMENT,
        draft.current_treatment.as_ref().and_then(|t| encode_json(t)),
    );
    record.set(fields::MEDICATIONS, encode_list(&draft.medications));
    record.set(fields::LAB_RESULTS, encode_list(&draft.lab_results));
    record.set(fields::NOTES, encode_list(&draft.notes));
    record.set(fields::PATIENT_ID, patient_id);
    record
}

/// 读取 JSON 字段，也接受存储直接返回的 JSON 值
fn json_value(record: &ExternalRecord, field: &str) -> Option<Value> {
    match record.get(field)? {
        Value::Null => None,
        Value::String(raw) if raw.trim().is_empty() => None,
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    "Malformed medical record field {} on record {:?}: {}",
                    field,
                    record.id(),
                    e
                );
                None
            }
        },
        other => Some(other.clone()),
    }
}

fn decode_json<T: DeserializeOwned>(record: &ExternalRecord, field: &str) -> Option<T> {
    let value = json_value(record, field)?;
    match serde_json::from_value::<T>(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(
                "Malformed medical record field {} on record {:?}: {}",
                field,
                record.id(),
                e
            );
            None
        }
    }
}

/// 逐条解析列表字段，丢弃无法解析的条目
fn decode_list<T: DeserializeOwned>(record: &ExternalRecord, field: &str) -> Vec<T> {
    let items = match json_value(record, field) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(
                "Medical record field {} on record {:?} is not a list: {}",
                field,
                record.id(),
                other
            );
            return Vec::new();
        }
        None => return Vec::new(),
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(
                    "Dropping malformed entry {} of {} on record {:?}: {}",
                    index,
                    field,
                    record.id(),
                    e
                );
                None
            }
        })
        .collect()
}

fn encode_list<T: Serialize>(items: &[T]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        encode_json(items)
    }
}

fn encode_json<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            warn!("Failed to encode medical record field: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::to_view;
    use chrono::NaiveDate;
    use medihub_core::{LabStatus, Medication};
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_decode_json_fields() {
        let record = ExternalRecord::try_from(json!({
            "Id": 2,
            "patient_id_c": {"Id": 1},
            "history_c": "[{\"date\":\"2023-06-15\",\"condition\":\"Hypertension\",\"treatment\":\"Lisinopril\",\"doctor\":\"Dr. Chen\"}]",
            "current_treatment_c": "{\"condition\":\"Chest pain\",\"plan\":\"Observation\",\"startDate\":\"2024-01-15\",\"expectedDuration\":\"5 days\"}",
            "lab_results_c": "[{\"date\":\"2024-01-15\",\"test\":\"Troponin\",\"results\":\"0.02\",\"status\":\"Borderline\"}]",
            "notes_c": ""
        }))
        .unwrap();

        let medical: MedicalRecord = to_view(&record);
        assert_eq!(medical.id, Some(2));
        assert_eq!(medical.patient_id, 1);
        assert_eq!(medical.history.len(), 1);
        assert_eq!(medical.history[0].condition, "Hypertension");
        assert_eq!(
            medical.current_treatment.as_ref().and_then(|t| t.start_date),
            Some(date("2024-01-15"))
        );
        assert_eq!(
            medical.lab_results[0].status,
            LabStatus::Other("Borderline".to_string())
        );
        assert!(medical.notes.is_empty());
        assert!(medical.medications.is_empty());
    }

    #[test]
    fn test_malformed_json_degrades_to_empty() {
        let record = ExternalRecord::try_from(json!({
            "patient_id_c": 5,
            "history_c": "[{not json",
            "current_treatment_c": "42"
        }))
        .unwrap();

        let medical: MedicalRecord = to_view(&record);
        assert!(medical.history.is_empty());
        assert!(medical.current_treatment.is_none());
        assert_eq!(medical.patient_id, 5);
    }

    #[test]
    fn test_draft_round_trip() {
        let draft = MedicalRecordDraft {
            medications: vec![Medication {
                name: "Metformin".to_string(),
                dosage: "500mg".to_string(),
                frequency: "Twice daily".to_string(),
                prescribed_by: "Dr. Lisa Park".to_string(),
                start_date: Some(date("2023-11-01")),
            }],
            ..Default::default()
        };

        let record = draft_to_external(8, &draft);
        assert!(record.string(fields::MEDICATIONS).contains("\"prescribedBy\""));
        assert!(!record.contains(fields::HISTORY));
        assert_eq!(record.lookup_id(fields::PATIENT_ID), Some(8));

        let back: MedicalRecord = to_view(&record);
        assert_eq!(back.patient_id, 8);
        assert_eq!(MedicalRecordDraft::from(back), draft);
    }

    #[test]
    fn test_incomplete_entries_are_kept() {
        let record = ExternalRecord::try_from(json!({
            "Id": 4,
            "patient_id_c": 3,
            "history_c": "[{\"date\":\"2019-03-10\",\"condition\":\"Hypertension\",\"treatment\":\"Lisinopril\",\"doctor\":\"Dr. Chen\"},{\"date\":\"2021-08-22\",\"condition\":\"Appendicitis\",\"treatment\":null}]",
            "notes_c": "[{\"date\":\"2024-01-15T10:30:00.000Z\",\"author\":\"Dr. Chen\",\"note\":\"Stable overnight\"}]"
        }))
        .unwrap();

        let medical: MedicalRecord = to_view(&record);
        assert_eq!(medical.history.len(), 2);
        assert_eq!(medical.history[1].condition, "Appendicitis");
        assert_eq!(medical.history[1].doctor, "");
        assert_eq!(medical.history[1].treatment, "");
        assert_eq!(medical.notes.len(), 1);
        assert_eq!(medical.notes[0].date, Some(date("2024-01-15")));

        // 读取后再保存不能丢掉已有条目
        let saved = draft_to_external(3, &MedicalRecordDraft::from(medical));
        let back: MedicalRecord = to_view(&saved);
        assert_eq!(back.history.len(), 2);
        assert_eq!(back.history[0].doctor, "Dr. Chen");
        assert_eq!(back.notes[0].note, "Stable overnight");
    }

    #[test]
    fn test_bad_entry_is_dropped_alone() {
        let record = ExternalRecord::try_from(json!({
            "patient_id_c": 3,
            "medications_c": "[{\"name\":\"Aspirin\",\"dosage\":\"81mg\"},\"oops\",{\"name\":\"Metformin\"}]"
        }))
        .unwrap();

        let medical: MedicalRecord = to_view(&record);
        let names: Vec<&str> = medical.medications.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Aspirin", "Metformin"]);
        assert!(medical.medications[0].start_date.is_none());
    }

    #[test]
    fn test_unknown_lab_status_round_trips() {
        let record = ExternalRecord::try_from(json!({
            "patient_id_c": 2,
            "lab_results_c": "[{\"date\":\"2024-01-15\",\"test\":\"Troponin\",\"results\":\"0.02\",\"status\":\"Borderline\"},{\"test\":\"CBC\"}]"
        }))
        .unwrap();

        let medical: MedicalRecord = to_view(&record);
        assert_eq!(medical.lab_results[1].status, LabStatus::Pending);

        let saved = draft_to_external(2, &MedicalRecordDraft::from(medical));
        let encoded = saved.string(fields::LAB_RESULTS);
        assert!(encoded.contains("\"status\":\"Borderline\""));
        assert!(encoded.contains("\"status\":\"Pending\""));
    }
}
