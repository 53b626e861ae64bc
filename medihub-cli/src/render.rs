//! 文本渲染
//!
//! 把页面展示状态渲染成终端文本。

use chrono::{DateTime, NaiveDate, Utc};
use medihub_core::{Activity, MedicalRecord, Metrics, Patient};
use medihub_views::{
    DashboardView, DetailTab, DetailView, Notification, NotificationLevel, PatientStats,
    PatientsView,
};
use std::fmt::Write;

/// 入院日期，如 `Jan 15, 2024`
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// 相对时间，如 `3 hours ago`
pub fn time_ago(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "-".to_string();
    };
    let elapsed = now.signed_duration_since(timestamp);
    let (value, unit) = if elapsed.num_days() > 0 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() > 0 {
        (elapsed.num_minutes(), "minute")
    } else {
        return "just now".to_string();
    };
    let plural = if value == 1 { "" } else { "s" };
    format!("{} {}{} ago", value, unit, plural)
}

fn day(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn failed(title: &str, message: &str) -> String {
    format!("{}\n  Something went wrong: {}\n  Run the command again to retry.\n", title, message)
}

pub fn dashboard(view: &DashboardView, now: DateTime<Utc>) -> String {
    match view {
        DashboardView::Loading => "Loading dashboard...\n".to_string(),
        DashboardView::Failed { message } => failed("Dashboard", message),
        DashboardView::Ready(data) => {
            let mut out = String::new();
            let _ = writeln!(out, "Dashboard ({})", now.format("%A, %B %-d, %Y"));
            out.push_str(&metrics(&data.metrics));
            out.push('\n');
            out.push_str(&activities(&data.recent_activities, now));
            out
        }
    }
}

pub fn metrics(metrics: &Metrics) -> String {
    let rows = [
        ("Total Patients", metrics.total_patients.to_string()),
        ("Today's Appointments", metrics.today_appointments.to_string()),
        ("Available Beds", metrics.available_beds.to_string()),
        ("Pending Tasks", metrics.pending_tasks.to_string()),
        ("Total Staff", metrics.total_staff.to_string()),
        ("Emergency Cases", metrics.emergency_cases.to_string()),
        ("Discharged Today", metrics.discharged_today.to_string()),
        ("Average Stay", format!("{:.1} days", metrics.average_stay_days)),
        ("Occupancy Rate", format!("{:.0}%", metrics.occupancy_rate)),
        ("Patient Satisfaction", format!("{:.1}/5", metrics.patient_satisfaction)),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "  {:<22} {}", label, value);
    }
    out
}

pub fn activities(activities: &[Activity], now: DateTime<Utc>) -> String {
    let mut out = String::from("Recent Activity\n");
    if activities.is_empty() {
        out.push_str("  No recent activity\n");
        return out;
    }
    for activity in activities {
        let _ = writeln!(
            out,
            "  [{:<11}] {} {} ({}, {})",
            activity.activity_type,
            activity.patient_name,
            activity.description,
            or_dash(&activity.doctor),
            time_ago(activity.timestamp, now)
        );
    }
    out
}

pub fn patients(view: &PatientsView) -> String {
    match view {
        PatientsView::Loading => "Loading patients...\n".to_string(),
        PatientsView::Failed { message } => failed("Patients", message),
        PatientsView::Empty { search, .. } if search.is_empty() => {
            "No patients found\n  Admit a patient to get started.\n".to_string()
        }
        PatientsView::Empty { search, stats } => format!(
            "{}No patients found\n  No patients match \"{}\". Try adjusting your search.\n",
            patient_stats(stats),
            search
        ),
        PatientsView::Ready {
            stats,
            rows,
            page,
            total_pages,
            total_matches,
            start,
            end,
        } => {
            let mut out = patient_stats(stats);
            let _ = writeln!(
                out,
                "{:>4}  {:<22} {:>4}  {:<20} {:<11} {:<11} {:<7} {}",
                "ID", "Name", "Age", "Doctor", "Status", "Condition", "Room", "Admitted"
            );
            for patient in rows {
                out.push_str(&patient_row(patient));
            }
            let _ = writeln!(
                out,
                "Showing {} to {} of {} results (page {} of {})",
                start, end, total_matches, page, total_pages
            );
            out
        }
    }
}

fn patient_stats(stats: &PatientStats) -> String {
    format!(
        "Total Patients: {}  Admitted: {}  Emergency: {}  Discharged: {}\n\n",
        stats.total, stats.admitted, stats.emergency, stats.discharged
    )
}

fn patient_row(patient: &Patient) -> String {
    format!(
        "{:>4}  {:<22} {:>4}  {:<20} {:<11} {:<11} {:<7} {}\n",
        patient.id,
        patient.name,
        patient.age,
        or_dash(&patient.assigned_doctor),
        patient.status.map(|s| s.as_str()).unwrap_or("-"),
        patient.medical_status.map(|s| s.as_str()).unwrap_or("-"),
        or_dash(&patient.room),
        format_date(patient.admission_date)
    )
}

pub fn patient_detail(view: &DetailView) -> String {
    match view {
        DetailView::Loading => "Loading patient...\n".to_string(),
        DetailView::Failed { message } => failed("Patient", message),
        DetailView::Ready {
            patient,
            medical_record,
            tab,
            editing,
        } => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{} (#{}){}",
                patient.name,
                patient.id,
                if *editing { " [editing]" } else { "" }
            );
            let tabs: Vec<String> = DetailTab::ALL
                .iter()
                .map(|t| {
                    if t == tab {
                        format!("[{}]", t.label())
                    } else {
                        t.label().to_string()
                    }
                })
                .collect();
            let _ = writeln!(out, "{}\n", tabs.join(" | "));
            out.push_str(&detail_tab(*tab, patient, medical_record));
            out
        }
    }
}

fn detail_tab(tab: DetailTab, patient: &Patient, record: &MedicalRecord) -> String {
    let mut out = String::new();
    match tab {
        DetailTab::Overview => {
            let contact = &patient.emergency_contact;
            let rows = [
                ("Age", patient.age.to_string()),
                ("Gender", or_dash(&patient.gender).to_string()),
                ("Phone", or_dash(&patient.phone).to_string()),
                ("Email", or_dash(&patient.email).to_string()),
                ("Address", or_dash(&patient.address).to_string()),
                ("Admitted", format_date(patient.admission_date)),
                ("Doctor", or_dash(&patient.assigned_doctor).to_string()),
                ("Status", patient.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())),
                (
                    "Condition",
                    patient
                        .medical_status
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                ("Room", or_dash(&patient.room).to_string()),
                ("Blood Type", or_dash(&patient.blood_type).to_string()),
                ("Insurance", or_dash(&patient.insurance).to_string()),
                (
                    "Allergies",
                    if patient.allergies.is_empty() {
                        "None known".to_string()
                    } else {
                        patient.allergies.join(", ")
                    },
                ),
                (
                    "Emergency Contact",
                    format!(
                        "{} ({}) {}",
                        or_dash(&contact.name),
                        or_dash(&contact.relationship),
                        or_dash(&contact.phone)
                    ),
                ),
            ];
            for (label, value) in rows {
                let _ = writeln!(out, "  {:<18} {}", label, value);
            }
        }
        DetailTab::MedicalHistory => {
            if record.history.is_empty() {
                out.push_str("  No medical history recorded\n");
            }
            for entry in &record.history {
                let _ = writeln!(
                    out,
                    "  {}  {}: {} ({})",
                    day(entry.date),
                    or_dash(&entry.condition),
                    or_dash(&entry.treatment),
                    or_dash(&entry.doctor)
                );
            }
        }
        DetailTab::CurrentTreatment => match &record.current_treatment {
            Some(treatment) => {
                let _ = writeln!(out, "  Condition          {}", treatment.condition);
                let _ = writeln!(out, "  Plan               {}", treatment.plan);
                let _ = writeln!(out, "  Started            {}", day(treatment.start_date));
                let _ = writeln!(out, "  Expected Duration  {}", treatment.expected_duration);
            }
            None => out.push_str("  No active treatment\n"),
        },
        DetailTab::Medications => {
            if record.medications.is_empty() {
                out.push_str("  No medications prescribed\n");
            }
            for med in &record.medications {
                let _ = writeln!(
                    out,
                    "  {} {}, {} (prescribed by {} on {})",
                    med.name,
                    med.dosage,
                    med.frequency,
                    or_dash(&med.prescribed_by),
                    day(med.start_date)
                );
            }
        }
        DetailTab::LabResults => {
            if record.lab_results.is_empty() {
                out.push_str("  No lab results available\n");
            }
            for lab in &record.lab_results {
                let _ = writeln!(
                    out,
                    "  {}  {}: {} [{}]",
                    day(lab.date),
                    lab.test,
                    lab.results,
                    lab.status
                );
            }
        }
        DetailTab::Notes => {
            if record.notes.is_empty() {
                out.push_str("  No clinical notes\n");
            }
            for note in &record.notes {
                let _ = writeln!(out, "  {}  {}: {}", day(note.date), or_dash(&note.author), note.note);
            }
        }
    }
    out
}

pub fn notifications(notifications: &[Notification]) -> String {
    let mut out = String::new();
    for n in notifications {
        let level = match n.level {
            NotificationLevel::Success => "success",
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        let _ = writeln!(out, "[{}] {}", level, n.message);
    }
    out
}
