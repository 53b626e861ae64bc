//! 活动记录转换

use crate::record::ExternalRecord;
use crate::transform::{FromExternal, ToExternal};
use medihub_core::{utils, Activity, ActivityDraft, ActivityType};

/// `activity_c` 字段名
pub mod fields {
    pub const TYPE: &str = "type_c";
    pub const PATIENT_NAME: &str = "patient_name_c";
    pub const PATIENT_ID: &str = "patient_id_c";
    pub const DESCRIPTION: &str = "description_c";
    pub const TIMESTAMP: &str = "timestamp_c";
    pub const DOCTOR: &str = "doctor_c";

    pub const ALL: [&str; 6] = [TYPE, PATIENT_NAME, DESCRIPTION, TIMESTAMP, DOCTOR, PATIENT_ID];
}

impl FromExternal for Activity {
    fn from_external(record: &ExternalRecord) -> Self {
        Activity {
            id: record.id().unwrap_or(0),
            activity_type: ActivityType::from(record.string(fields::TYPE).as_str()),
            patient_name: record.string(fields::PATIENT_NAME),
            patient_id: record.lookup_id(fields::PATIENT_ID),
            description: record.string(fields::DESCRIPTION),
            timestamp: record.timestamp(fields::TIMESTAMP),
            doctor: record.string(fields::DOCTOR),
        }
    }
}

impl ToExternal for Activity {
    fn to_external(&self) -> ExternalRecord {
        let mut record = ActivityDraft {
            activity_type: self.activity_type.clone(),
            patient_name: self.patient_name.clone(),
            patient_id: self.patient_id,
            description: self.description.clone(),
            timestamp: self.timestamp,
            doctor: self.doctor.clone(),
        }
        .to_external();
        if self.id > 0 {
            record.set_id(self.id);
        }
        record
    }
}

impl ToExternal for ActivityDraft {
    fn to_external(&self) -> ExternalRecord {
        let mut record = ExternalRecord::new();
        record.set(fields::TYPE, self.activity_type.as_str());
        record.set(fields::PATIENT_NAME, self.patient_name.as_str());
        record.set(fields::DESCRIPTION, self.description.as_str());
        record.set_opt(
            fields::TIMESTAMP,
            self.timestamp.as_ref().map(utils::format_timestamp),
        );
        record.set(fields::DOCTOR, self.doctor.as_str());
        // 关联字段缺失时显式写 null
        record.set(fields::PATIENT_ID, self.patient_id);
        record
    }
}
