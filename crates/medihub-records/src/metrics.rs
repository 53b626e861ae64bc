//! 指标记录转换

use crate::record::ExternalRecord;
use crate::transform::{FromExternal, ToExternal};
use medihub_core::Metrics;

/// `metric_c` 字段名
pub mod fields {
    pub const TOTAL_PATIENTS: &str = "total_patients_c";
    pub const TODAY_APPOINTMENTS: &str = "today_appointments_c";
    pub const AVAILABLE_BEDS: &str = "available_beds_c";
    pub const PENDING_TASKS: &str = "pending_tasks_c";
    pub const TOTAL_STAFF: &str = "total_staff_c";
    pub const EMERGENCY_CASES: &str = "emergency_cases_c";
    pub const DISCHARGED_TODAY: &str = "discharged_today_c";
    pub const AVERAGE_STAY_DAYS: &str = "average_stay_days_c";
    pub const OCCUPANCY_RATE: &str = "occupancy_rate_c";
    pub const PATIENT_SATISFACTION: &str = "patient_satisfaction_c";

    pub const ALL: [&str; 10] = [
        TOTAL_PATIENTS,
        TODAY_APPOINTMENTS,
        AVAILABLE_BEDS,
        PENDING_TASKS,
        TOTAL_STAFF,
        EMERGENCY_CASES,
        DISCHARGED_TODAY,
        AVERAGE_STAY_DAYS,
        OCCUPANCY_RATE,
        PATIENT_SATISFACTION,
    ];
}

impl FromExternal for Metrics {
    fn from_external(record: &ExternalRecord) -> Self {
        Metrics {
            total_patients: record.count(fields::TOTAL_PATIENTS),
            today_appointments: record.count(fields::TODAY_APPOINTMENTS),
            available_beds: record.count(fields::AVAILABLE_BEDS),
            pending_tasks: record.count(fields::PENDING_TASKS),
            total_staff: record.count(fields::TOTAL_STAFF),
            emergency_cases: record.count(fields::EMERGENCY_CASES),
            discharged_today: record.count(fields::DISCHARGED_TODAY),
            average_stay_days: record.float(fields::AVERAGE_STAY_DAYS),
            occupancy_rate: record.float(fields::OCCUPANCY_RATE),
            patient_satisfaction: record.float(fields::PATIENT_SATISFACTION),
        }
    }
}

impl ToExternal for Metrics {
    fn to_external(&self) -> ExternalRecord {
        let mut record = ExternalRecord::new();
        record.set(fields::TOTAL_PATIENTS, self.total_patients);
        record.set(fields::TODAY_APPOINTMENTS, self.today_appointments);
        record.set(fields::AVAILABLE_BEDS, self.available_beds);
        record.set(fields::PENDING_TASKS, self.pending_tasks);
        record.set(fields::TOTAL_STAFF, self.total_staff);
        record.set(fields::EMERGENCY_CASES, self.emergency_cases);
        record.set(fields::DISCHARGED_TODAY, self.discharged_today);
        record.set(fields::AVERAGE_STAY_DAYS, self.average_stay_days);
        record.set(fields::OCCUPANCY_RATE, self.occupancy_rate);
        record.set(fields::PATIENT_SATISFACTION, self.patient_satisfaction);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::to_view;
    use serde_json::json;

    #[test]
    fn test_metrics_defaults_to_zero() {
        let record = ExternalRecord::try_from(json!({
            "Id": 1,
            "total_patients_c": 1247,
            "occupancy_rate_c": "87.5",
            "pending_tasks_c": null
        }))
        .unwrap();

        let metrics: Metrics = to_view(&record);
        assert_eq!(metrics.total_patients, 1247);
        assert_eq!(metrics.occupancy_rate, 87.5);
        assert_eq!(metrics.pending_tasks, 0);
        assert_eq!(metrics.patient_satisfaction, 0.0);
    }

    #[test]
    fn test_metrics_round_trip() {
        let metrics = Metrics {
            total_patients: 10,
            average_stay_days: 4.2,
            ..Default::default()
        };
        let back: Metrics = to_view(&metrics.to_external());
        assert_eq!(back, metrics);
    }
}
