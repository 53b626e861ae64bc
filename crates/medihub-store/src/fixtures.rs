//! 演示数据
//!
//! 模拟存储启动时载入的记录，字段使用外部存储的 `*_c` 形式。

use medihub_records::{collections, ExternalRecord};
use serde_json::{json, Value};

/// 全部集合的演示数据
pub fn seed() -> Vec<(&'static str, Vec<ExternalRecord>)> {
    vec![
        (collections::PATIENT, patients()),
        (collections::ACTIVITY, activities()),
        (collections::MEDICAL_RECORD, medical_records()),
        (collections::METRIC, metrics()),
    ]
}

fn record(value: Value) -> ExternalRecord {
    match value {
        Value::Object(map) => map.into(),
        _ => ExternalRecord::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn patient(
    id: i64,
    name: &str,
    age: u32,
    gender: &str,
    admitted: &str,
    doctor: &str,
    status: &str,
    medical_status: &str,
    contact: (&str, &str),
    insurance: &str,
    blood_type: &str,
    allergies: &str,
    room: &str,
) -> ExternalRecord {
    let slug = name.to_lowercase().replace(' ', ".");
    record(json!({
        "Id": id,
        "name_c": name,
        "age_c": age,
        "gender_c": gender,
        "phone_c": format!("(555) {:03}-{:04}", 100 + id, 1000 + id * 37),
        "email_c": format!("{}@email.com", slug),
        "address_c": format!("{} Main Street, Springfield", 100 + id * 11),
        "admission_date_c": admitted,
        "assigned_doctor_c": doctor,
        "status_c": status,
        "medical_status_c": medical_status,
        "emergency_contact_name_c": contact.0,
        "emergency_contact_relationship_c": contact.1,
        "emergency_contact_phone_c": format!("(555) {:03}-{:04}", 200 + id, 2000 + id * 41),
        "insurance_c": insurance,
        "blood_type_c": blood_type,
        "allergies_c": allergies,
        "room_c": room
    }))
}

fn patients() -> Vec<ExternalRecord> {
    vec![
        patient(1, "Sarah Johnson", 45, "Female", "2024-01-15T08:30:00.000Z", "Dr. Michael Chen", "Admitted", "Stable", ("Robert Johnson", "Husband"), "BlueCross BlueShield", "A+", "Penicillin, Peanuts", "301A"),
        patient(2, "James Wilson", 62, "Male", "2024-01-14T11:15:00.000Z", "Dr. Lisa Park", "Admitted", "Monitoring", ("Mary Wilson", "Wife"), "Medicare", "O-", "Sulfa drugs", "205B"),
        patient(3, "Emily Rodriguez", 28, "Female", "2024-01-13T14:20:00.000Z", "Dr. Amanda Foster", "Emergency", "Critical", ("Carlos Rodriguez", "Husband"), "UnitedHealth", "B+", "", "ER-2"),
        patient(4, "Robert Thompson", 71, "Male", "2024-01-10T09:45:00.000Z", "Dr. Michael Chen", "Discharged", "Stable", ("Linda Thompson", "Daughter"), "Medicare", "AB+", "Aspirin", ""),
        patient(5, "Maria Garcia", 34, "Female", "2024-01-16T07:05:00.000Z", "Dr. David Kim", "Admitted", "Stable", ("Jose Garcia", "Brother"), "Aetna", "O+", "Latex", "412C"),
        patient(6, "David Lee", 53, "Male", "2024-01-12T16:40:00.000Z", "Dr. Lisa Park", "Admitted", "Monitoring", ("Grace Lee", "Wife"), "Cigna", "A-", "", "308B"),
        patient(7, "Jennifer Brown", 41, "Female", "2024-01-11T10:00:00.000Z", "Dr. Amanda Foster", "Outpatient", "Stable", ("Mark Brown", "Husband"), "Humana", "B-", "Shellfish, Iodine", ""),
        patient(8, "William Davis", 67, "Male", "2024-01-16T13:25:00.000Z", "Dr. Rachel Adams", "Emergency", "Critical", ("Susan Davis", "Wife"), "Medicare", "O+", "Codeine", "ICU-4"),
        patient(9, "Linda Martinez", 58, "Female", "2024-01-09T15:50:00.000Z", "Dr. David Kim", "Discharged", "Stable", ("Paul Martinez", "Son"), "Kaiser Permanente", "A+", "", ""),
        patient(10, "Michael Anderson", 39, "Male", "2024-01-15T18:10:00.000Z", "Dr. Rachel Adams", "Admitted", "Monitoring", ("Karen Anderson", "Sister"), "BlueCross BlueShield", "AB-", "Penicillin", "217A"),
        patient(11, "Patricia Taylor", 76, "Female", "2024-01-08T12:30:00.000Z", "Dr. Michael Chen", "Admitted", "Critical", ("Steven Taylor", "Son"), "Medicare", "O-", "Morphine, Latex", "ICU-1"),
        patient(12, "Christopher White", 22, "Male", "2024-01-16T20:45:00.000Z", "Dr. Lisa Park", "Outpatient", "Stable", ("Nancy White", "Mother"), "Aetna", "B+", "", ""),
    ]
}

fn activity(
    id: i64,
    activity_type: &str,
    patient_id: i64,
    patient_name: &str,
    description: &str,
    timestamp: &str,
    doctor: &str,
) -> ExternalRecord {
    record(json!({
        "Id": id,
        "type_c": activity_type,
        "patient_name_c": patient_name,
        "patient_id_c": {"Id": patient_id, "Name": patient_name},
        "description_c": description,
        "timestamp_c": timestamp,
        "doctor_c": doctor
    }))
}

fn activities() -> Vec<ExternalRecord> {
    vec![
        activity(1, "admission", 9, "Linda Martinez", "admitted for knee replacement surgery", "2024-01-09T15:50:00.000Z", "Dr. David Kim"),
        activity(2, "discharge", 4, "Robert Thompson", "discharged after pneumonia recovery", "2024-01-12T10:30:00.000Z", "Dr. Michael Chen"),
        activity(3, "treatment", 6, "David Lee", "started cardiac rehabilitation program", "2024-01-13T09:00:00.000Z", "Dr. Lisa Park"),
        activity(4, "emergency", 3, "Emily Rodriguez", "brought in with acute abdominal pain", "2024-01-13T14:20:00.000Z", "Dr. Amanda Foster"),
        activity(5, "appointment", 7, "Jennifer Brown", "follow-up consultation scheduled", "2024-01-14T11:00:00.000Z", "Dr. Amanda Foster"),
        activity(6, "admission", 2, "James Wilson", "admitted for observation after fall", "2024-01-14T11:15:00.000Z", "Dr. Lisa Park"),
        activity(7, "medication", 1, "Sarah Johnson", "prescribed lisinopril 10mg daily", "2024-01-15T09:10:00.000Z", "Dr. Michael Chen"),
        activity(8, "admission", 10, "Michael Anderson", "admitted with severe migraine", "2024-01-15T18:10:00.000Z", "Dr. Rachel Adams"),
        activity(9, "admission", 5, "Maria Garcia", "admitted for scheduled appendectomy", "2024-01-16T07:05:00.000Z", "Dr. David Kim"),
        activity(10, "emergency", 8, "William Davis", "admitted to ICU with chest pain", "2024-01-16T13:25:00.000Z", "Dr. Rachel Adams"),
    ]
}

fn medical_records() -> Vec<ExternalRecord> {
    vec![
        record(json!({
            "Id": 1,
            "patient_id_c": {"Id": 1, "Name": "Sarah Johnson"},
            "history_c": json!([
                {"date": "2019-03-10", "condition": "Hypertension", "treatment": "Lifestyle changes and medication", "doctor": "Dr. Michael Chen"},
                {"date": "2021-08-22", "condition": "Appendicitis", "treatment": "Laparoscopic appendectomy", "doctor": "Dr. David Kim"}
            ]).to_string(),
            "current_treatment_c": json!(
                {"condition": "Hypertension management", "plan": "Daily blood pressure monitoring, low sodium diet", "startDate": "2024-01-15", "expectedDuration": "Ongoing"}
            ).to_string(),
            "medications_c": json!([
                {"name": "Lisinopril", "dosage": "10mg", "frequency": "Once daily", "prescribedBy": "Dr. Michael Chen", "startDate": "2024-01-15"},
                {"name": "Aspirin", "dosage": "81mg", "frequency": "Once daily", "prescribedBy": "Dr. Michael Chen", "startDate": "2023-06-01"}
            ]).to_string(),
            "lab_results_c": json!([
                {"date": "2024-01-15", "test": "Complete Blood Count", "results": "Within normal limits", "status": "Normal"},
                {"date": "2024-01-15", "test": "Lipid Panel", "results": "LDL 165 mg/dL", "status": "Abnormal"}
            ]).to_string(),
            "notes_c": json!([
                {"date": "2024-01-15", "author": "Dr. Michael Chen", "note": "Patient responding well to medication. Continue current plan."}
            ]).to_string()
        })),
        record(json!({
            "Id": 2,
            "patient_id_c": {"Id": 2, "Name": "James Wilson"},
            "history_c": json!([
                {"date": "2015-11-04", "condition": "Type 2 Diabetes", "treatment": "Metformin", "doctor": "Dr. Lisa Park"}
            ]).to_string(),
            "current_treatment_c": json!(
                {"condition": "Hip contusion", "plan": "Physical therapy and pain management", "startDate": "2024-01-14", "expectedDuration": "2 weeks"}
            ).to_string(),
            "medications_c": json!([
                {"name": "Metformin", "dosage": "500mg", "frequency": "Twice daily", "prescribedBy": "Dr. Lisa Park", "startDate": "2015-11-04"}
            ]).to_string(),
            "lab_results_c": json!([
                {"date": "2024-01-14", "test": "HbA1c", "results": "7.4%", "status": "Abnormal"},
                {"date": "2024-01-14", "test": "X-Ray Hip", "results": "Awaiting radiology review", "status": "Pending"}
            ]).to_string(),
            "notes_c": null
        })),
        record(json!({
            "Id": 3,
            "patient_id_c": {"Id": 3, "Name": "Emily Rodriguez"},
            "history_c": null,
            "current_treatment_c": json!(
                {"condition": "Acute abdominal pain", "plan": "CT scan, IV fluids, surgical consult", "startDate": "2024-01-13", "expectedDuration": "3-5 days"}
            ).to_string(),
            "medications_c": json!([
                {"name": "Morphine", "dosage": "4mg IV", "frequency": "Every 4 hours as needed", "prescribedBy": "Dr. Amanda Foster", "startDate": "2024-01-13"}
            ]).to_string(),
            "lab_results_c": null,
            "notes_c": json!([
                {"date": "2024-01-13", "author": "Dr. Amanda Foster", "note": "Surgical consult requested. Monitor vitals hourly."}
            ]).to_string()
        })),
        record(json!({
            "Id": 4,
            "patient_id_c": {"Id": 8, "Name": "William Davis"},
            "history_c": json!([
                {"date": "2020-02-17", "condition": "Coronary artery disease", "treatment": "Stent placement", "doctor": "Dr. Rachel Adams"}
            ]).to_string(),
            "current_treatment_c": json!(
                {"condition": "Unstable angina", "plan": "Cardiac monitoring, anticoagulation", "startDate": "2024-01-16", "expectedDuration": "1 week"}
            ).to_string(),
            "medications_c": null,
            "lab_results_c": json!([
                {"date": "2024-01-16", "test": "Troponin I", "results": "0.08 ng/mL", "status": "Abnormal"}
            ]).to_string(),
            "notes_c": null
        })),
    ]
}

fn metrics() -> Vec<ExternalRecord> {
    vec![record(json!({
        "Id": 1,
        "total_patients_c": 1247,
        "today_appointments_c": 38,
        "available_beds_c": 24,
        "pending_tasks_c": 15,
        "total_staff_c": 186,
        "emergency_cases_c": 7,
        "discharged_today_c": 12,
        "average_stay_days_c": 4.2,
        "occupancy_rate_c": 87,
        "patient_satisfaction_c": 4.6
    }))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use medihub_core::{MedicalRecord, Patient};
    use medihub_records::to_views;

    #[test]
    fn test_fixtures_transform_cleanly() {
        let patients: Vec<Patient> = to_views(&patients());
        assert_eq!(patients.len(), 12);
        assert!(patients.iter().all(|p| p.id > 0 && p.status.is_some()));

        let records: Vec<MedicalRecord> = to_views(&medical_records());
        assert!(records.iter().all(|r| r.patient_id > 0));
        assert_eq!(records[0].medications.len(), 2);
        assert!(records[0].current_treatment.is_some());
    }
}
