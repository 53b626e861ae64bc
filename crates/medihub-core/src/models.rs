//! 核心数据模型定义
//!
//! 页面使用的视图模型，字段名已经从外部记录存储的 `*_c` 形式转换过来。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 记录标识，由存储分配
pub type RecordId = i64;

/// 患者
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: RecordId,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub admission_date: Option<DateTime<Utc>>,
    pub assigned_doctor: String,
    pub status: Option<PatientStatus>,
    pub medical_status: Option<MedicalStatus>,
    pub emergency_contact: EmergencyContact,
    pub insurance: String,
    pub blood_type: String,
    pub allergies: Vec<String>, // 存储时以逗号分隔
    pub room: String,
}

/// 紧急联系人
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

/// 住院状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientStatus {
    Admitted,   // 住院中
    Discharged, // 已出院
    Emergency,  // 急诊
    Outpatient, // 门诊
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admitted => "Admitted",
            Self::Discharged => "Discharged",
            Self::Emergency => "Emergency",
            Self::Outpatient => "Outpatient",
        }
    }

    /// 不区分大小写解析，未知值返回 `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admitted" => Some(Self::Admitted),
            "discharged" => Some(Self::Discharged),
            "emergency" => Some(Self::Emergency),
            "outpatient" => Some(Self::Outpatient),
            _ => None,
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 病情状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicalStatus {
    Stable,
    Monitoring,
    Critical,
}

impl MedicalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Monitoring => "Monitoring",
            Self::Critical => "Critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stable" => Some(Self::Stable),
            "monitoring" => Some(Self::Monitoring),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for MedicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 新患者入院数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientDraft {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub admission_date: Option<DateTime<Utc>>, // 为空时由服务填写当前时间
    pub assigned_doctor: String,
    pub status: Option<PatientStatus>,
    pub medical_status: Option<MedicalStatus>,
    pub emergency_contact: EmergencyContact,
    pub insurance: String,
    pub blood_type: String,
    pub allergies: Vec<String>,
    pub room: String,
}

/// 患者部分更新
///
/// 只有 `Some` 字段会被写回，其余字段保持不变（浅合并）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub admission_date: Option<DateTime<Utc>>,
    pub assigned_doctor: Option<String>,
    pub status: Option<PatientStatus>,
    pub medical_status: Option<MedicalStatus>,
    pub emergency_contact: Option<EmergencyContact>,
    pub insurance: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub room: Option<String>,
}

impl PatientPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 将补丁合并到已有患者上
    pub fn apply_to(&self, patient: &mut Patient) {
        if let Some(name) = &self.name {
            patient.name = name.clone();
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(gender) = &self.gender {
            patient.gender = gender.clone();
        }
        if let Some(phone) = &self.phone {
            patient.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            patient.email = email.clone();
        }
        if let Some(address) = &self.address {
            patient.address = address.clone();
        }
        if let Some(admission_date) = self.admission_date {
            patient.admission_date = Some(admission_date);
        }
        if let Some(doctor) = &self.assigned_doctor {
            patient.assigned_doctor = doctor.clone();
        }
        if let Some(status) = self.status {
            patient.status = Some(status);
        }
        if let Some(medical_status) = self.medical_status {
            patient.medical_status = Some(medical_status);
        }
        if let Some(contact) = &self.emergency_contact {
            patient.emergency_contact = contact.clone();
        }
        if let Some(insurance) = &self.insurance {
            patient.insurance = insurance.clone();
        }
        if let Some(blood_type) = &self.blood_type {
            patient.blood_type = blood_type.clone();
        }
        if let Some(allergies) = &self.allergies {
            patient.allergies = allergies.clone();
        }
        if let Some(room) = &self.room {
            patient.room = room.clone();
        }
    }

    /// 合并另一个补丁，后者的字段优先
    pub fn merge(&mut self, other: PatientPatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            name, age, gender, phone, email, address, admission_date, assigned_doctor, status,
            medical_status, emergency_contact, insurance, blood_type, allergies, room
        );
    }
}

/// 病历，与患者一对一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Option<RecordId>, // 尚未持久化的空病历没有ID
    pub patient_id: RecordId,
    pub history: Vec<HistoryEntry>,
    pub current_treatment: Option<Treatment>,
    pub medications: Vec<Medication>,
    pub lab_results: Vec<LabResult>,
    pub notes: Vec<ClinicalNote>,
}

impl MedicalRecord {
    /// 患者没有病历时使用的空结构
    pub fn empty(patient_id: RecordId) -> Self {
        Self {
            id: None,
            patient_id,
            history: Vec::new(),
            current_treatment: None,
            medications: Vec::new(),
            lab_results: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
            && self.current_treatment.is_none()
            && self.medications.is_empty()
            && self.lab_results.is_empty()
            && self.notes.is_empty()
    }
}

/// 既往病史条目
///
/// 病历条目来自存储里的 JSON 字符串，缺失或为 null 的字段取默认值，
/// 日期接受 `YYYY-MM-DD` 和 RFC 3339 两种写法。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::string")]
    pub condition: String,
    #[serde(deserialize_with = "lenient::string")]
    pub treatment: String,
    #[serde(deserialize_with = "lenient::string")]
    pub doctor: String,
}

/// 当前治疗方案
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Treatment {
    #[serde(deserialize_with = "lenient::string")]
    pub condition: String,
    #[serde(deserialize_with = "lenient::string")]
    pub plan: String,
    #[serde(deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::string")]
    pub expected_duration: String,
}

/// 用药
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Medication {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub dosage: String,
    #[serde(deserialize_with = "lenient::string")]
    pub frequency: String,
    #[serde(deserialize_with = "lenient::string")]
    pub prescribed_by: String,
    #[serde(deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// 化验结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabResult {
    #[serde(deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::string")]
    pub test: String,
    #[serde(deserialize_with = "lenient::string")]
    pub results: String,
    pub status: LabStatus,
}

/// 化验状态，未知状态保留原文
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum LabStatus {
    Normal,
    Abnormal,
    #[default]
    Pending,
    Other(String),
}

impl LabStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "Normal",
            Self::Abnormal => "Abnormal",
            Self::Pending => "Pending",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for LabStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Self::Normal,
            "abnormal" => Self::Abnormal,
            "pending" | "" => Self::Pending,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<Option<String>> for LabStatus {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::from).unwrap_or_default()
    }
}

impl From<LabStatus> for String {
    fn from(status: LabStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for LabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 医生记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClinicalNote {
    #[serde(deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::string")]
    pub author: String,
    #[serde(deserialize_with = "lenient::string")]
    pub note: String,
}

/// 病历条目的宽松反序列化
mod lenient {
    use crate::utils::parse_timestamp;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// 日期或时间戳字符串；无法识别时为 None
    pub fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(raw) => parse_timestamp(&raw).map(|ts| ts.date_naive()),
            _ => None,
        })
    }

    /// null 视为空串，数字和布尔按文本保留
    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}

/// 病历保存数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecordDraft {
    pub history: Vec<HistoryEntry>,
    pub current_treatment: Option<Treatment>,
    pub medications: Vec<Medication>,
    pub lab_results: Vec<LabResult>,
    pub notes: Vec<ClinicalNote>,
}

impl From<MedicalRecord> for MedicalRecordDraft {
    fn from(record: MedicalRecord) -> Self {
        Self {
            history: record.history,
            current_treatment: record.current_treatment,
            medications: record.medications,
            lab_results: record.lab_results,
            notes: record.notes,
        }
    }
}

/// 活动事件，只追加不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: RecordId,
    pub activity_type: ActivityType,
    pub patient_name: String,
    pub patient_id: Option<RecordId>,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub doctor: String,
}

/// 活动类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Admission,
    Discharge,
    Appointment,
    Treatment,
    Medication,
    Emergency,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admission => "admission",
            Self::Discharge => "discharge",
            Self::Appointment => "appointment",
            Self::Treatment => "treatment",
            Self::Medication => "medication",
            Self::Emergency => "emergency",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for ActivityType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admission" => Self::Admission,
            "discharge" => Self::Discharge,
            "appointment" => Self::Appointment,
            "treatment" => Self::Treatment,
            "medication" => Self::Medication,
            "emergency" => Self::Emergency,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 新活动数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub activity_type: ActivityType,
    pub patient_name: String,
    pub patient_id: Option<RecordId>,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>, // 为空时由服务填写当前时间
    pub doctor: String,
}

/// 仪表盘指标快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_patients: u32,
    pub today_appointments: u32,
    pub available_beds: u32,
    pub pending_tasks: u32,
    pub total_staff: u32,
    pub emergency_cases: u32,
    pub discharged_today: u32,
    pub average_stay_days: f64,
    pub occupancy_rate: f64,       // 百分比
    pub patient_satisfaction: f64, // 满分5分
}
