//! 患者记录转换

use crate::record::ExternalRecord;
use crate::transform::{FromExternal, ToExternal};
use medihub_core::{
    utils, EmergencyContact, MedicalStatus, Patient, PatientDraft, PatientPatch, PatientStatus,
};

/// `patient_c` 字段名
pub mod fields {
    pub const NAME: &str = "name_c";
    pub const AGE: &str = "age_c";
    pub const GENDER: &str = "gender_c";
    pub const PHONE: &str = "phone_c";
    pub const EMAIL: &str = "email_c";
    pub const ADDRESS: &str = "address_c";
    pub const ADMISSION_DATE: &str = "admission_date_c";
    pub const ASSIGNED_DOCTOR: &str = "assigned_doctor_c";
    pub const STATUS: &str = "status_c";
    pub const MEDICAL_STATUS: &str = "medical_status_c";
    pub const EMERGENCY_CONTACT_NAME: &str = "emergency_contact_name_c";
    pub const EMERGENCY_CONTACT_RELATIONSHIP: &str = "emergency_contact_relationship_c";
    pub const EMERGENCY_CONTACT_PHONE: &str = "emergency_contact_phone_c";
    pub const INSURANCE: &str = "insurance_c";
    pub const BLOOD_TYPE: &str = "blood_type_c";
    pub const ALLERGIES: &str = "allergies_c";
    pub const ROOM: &str = "room_c";

    /// 查询时请求的全部字段
    pub const ALL: [&str; 17] = [
        NAME,
        AGE,
        GENDER,
        PHONE,
        EMAIL,
        ADDRESS,
        ADMISSION_DATE,
        ASSIGNED_DOCTOR,
        STATUS,
        MEDICAL_STATUS,
        EMERGENCY_CONTACT_NAME,
        EMERGENCY_CONTACT_RELATIONSHIP,
        EMERGENCY_CONTACT_PHONE,
        INSURANCE,
        BLOOD_TYPE,
        ALLERGIES,
        ROOM,
    ];
}

impl FromExternal for Patient {
    fn from_external(record: &ExternalRecord) -> Self {
        let status = record.opt_string(fields::STATUS);
        let medical_status = record.opt_string(fields::MEDICAL_STATUS);

        Patient {
            id: record.id().unwrap_or(0),
            name: record.string(fields::NAME),
            age: record.count(fields::AGE),
            gender: record.string(fields::GENDER),
            phone: record.string(fields::PHONE),
            email: record.string(fields::EMAIL),
            address: record.string(fields::ADDRESS),
            admission_date: record.timestamp(fields::ADMISSION_DATE),
            assigned_doctor: record.string(fields::ASSIGNED_DOCTOR),
            status: status.as_deref().and_then(PatientStatus::parse),
            medical_status: medical_status.as_deref().and_then(MedicalStatus::parse),
            emergency_contact: EmergencyContact {
                name: record.string(fields::EMERGENCY_CONTACT_NAME),
                relationship: record.string(fields::EMERGENCY_CONTACT_RELATIONSHIP),
                phone: record.string(fields::EMERGENCY_CONTACT_PHONE),
            },
            insurance: record.string(fields::INSURANCE),
            blood_type: record.string(fields::BLOOD_TYPE),
            allergies: record.list(fields::ALLERGIES),
            room: record.string(fields::ROOM),
        }
    }
}

impl ToExternal for Patient {
    fn to_external(&self) -> ExternalRecord {
        let mut record = PatientDraft {
            name: self.name.clone(),
            age: self.age,
            gender: self.gender.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            admission_date: self.admission_date,
            assigned_doctor: self.assigned_doctor.clone(),
            status: self.status,
            medical_status: self.medical_status,
            emergency_contact: self.emergency_contact.clone(),
            insurance: self.insurance.clone(),
            blood_type: self.blood_type.clone(),
            allergies: self.allergies.clone(),
            room: self.room.clone(),
        }
        .to_external();
        if self.id > 0 {
            record.set_id(self.id);
        }
        record
    }
}

impl ToExternal for PatientDraft {
    fn to_external(&self) -> ExternalRecord {
        let mut record = ExternalRecord::new();
        record.set(fields::NAME, self.name.as_str());
        record.set(fields::AGE, self.age);
        record.set(fields::GENDER, self.gender.as_str());
        record.set(fields::PHONE, self.phone.as_str());
        record.set(fields::EMAIL, self.email.as_str());
        record.set(fields::ADDRESS, self.address.as_str());
        record.set_opt(
            fields::ADMISSION_DATE,
            self.admission_date.as_ref().map(utils::format_timestamp),
        );
        record.set(fields::ASSIGNED_DOCTOR, self.assigned_doctor.as_str());
        record.set_opt(fields::STATUS, self.status.map(|s| s.as_str()));
        record.set_opt(fields::MEDICAL_STATUS, self.medical_status.map(|s| s.as_str()));
        set_contact(&mut record, &self.emergency_contact);
        record.set(fields::INSURANCE, self.insurance.as_str());
        record.set(fields::BLOOD_TYPE, self.blood_type.as_str());
        record.set(fields::ALLERGIES, utils::join_list(&self.allergies));
        record.set(fields::ROOM, self.room.as_str());
        record
    }
}

impl ToExternal for PatientPatch {
    /// 只输出补丁中提供的字段
    fn to_external(&self) -> ExternalRecord {
        let mut record = ExternalRecord::new();
        record.set_opt(fields::NAME, self.name.as_deref());
        record.set_opt(fields::AGE, self.age);
        record.set_opt(fields::GENDER, self.gender.as_deref());
        record.set_opt(fields::PHONE, self.phone.as_deref());
        record.set_opt(fields::EMAIL, self.email.as_deref());
        record.set_opt(fields::ADDRESS, self.address.as_deref());
        record.set_opt(
            fields::ADMISSION_DATE,
            self.admission_date.as_ref().map(utils::format_timestamp),
        );
        record.set_opt(fields::ASSIGNED_DOCTOR, self.assigned_doctor.as_deref());
        record.set_opt(fields::STATUS, self.status.map(|s| s.as_str()));
        record.set_opt(fields::MEDICAL_STATUS, self.medical_status.map(|s| s.as_str()));
        if let Some(contact) = &self.emergency_contact {
            set_contact(&mut record, contact);
        }
        record.set_opt(fields::INSURANCE, self.insurance.as_deref());
        record.set_opt(fields::BLOOD_TYPE, self.blood_type.as_deref());
        record.set_opt(
            fields::ALLERGIES,
            self.allergies.as_deref().map(utils::join_list),
        );
        record.set_opt(fields::ROOM, self.room.as_deref());
        record
    }
}

fn set_contact(record: &mut ExternalRecord, contact: &EmergencyContact) {
    record.set(fields::EMERGENCY_CONTACT_NAME, contact.name.as_str());
    record.set(
        fields::EMERGENCY_CONTACT_RELATIONSHIP,
        contact.relationship.as_str(),
    );
    record.set(fields::EMERGENCY_CONTACT_PHONE, contact.phone.as_str());
}
