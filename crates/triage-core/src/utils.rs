//! 通用工具函数

use crate::models::{Bed, BedStatus, Patient, PatientStatus, Priority};
use chrono::{DateTime, TimeZone};
use uuid::Uuid;

/// 生成患者ID，形如 `P-1A2B3C4D`
pub fn generate_patient_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("P-{}", simple[..8].to_ascii_uppercase())
}

/// 验证患者ID格式
pub fn is_valid_patient_id(id: &str) -> bool {
    !id.trim().is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// 将到达时间格式化为展示字符串，例如 `10:30 AM`
pub fn format_arrival_time<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%I:%M %p").to_string()
}

/// 默认演示数据：五名患者
pub fn sample_roster() -> Vec<Patient> {
    let entry = |id: &str,
                 name: &str,
                 wait_time: u32,
                 priority: Priority,
                 department: &str,
                 arrival_time: &str,
                 status: PatientStatus| Patient {
        id: id.to_string(),
        name: name.to_string(),
        wait_time,
        priority,
        department: department.to_string(),
        arrival_time: arrival_time.to_string(),
        status,
    };

    vec![
        entry("P-12345", "John Doe", 45, Priority::Medium, "Emergency", "10:30 AM", PatientStatus::Waiting),
        entry("P-12346", "Jane Smith", 30, Priority::High, "Cardiology", "10:45 AM", PatientStatus::Waiting),
        entry("P-12347", "Robert Johnson", 15, Priority::Critical, "Emergency", "11:00 AM", PatientStatus::InProgress),
        entry("P-12348", "Emily Davis", 60, Priority::Low, "General Medicine", "10:15 AM", PatientStatus::Waiting),
        entry("P-12349", "Michael Wilson", 25, Priority::Medium, "Neurology", "10:50 AM", PatientStatus::Waiting),
    ]
}

/// 默认演示床位
pub fn sample_beds() -> Vec<Bed> {
    let bed = |id: &str, status: BedStatus, department: &str| Bed {
        id: id.to_string(),
        status,
        department: department.to_string(),
        patient_id: None,
        patient_name: None,
        admission_time: None,
    };
    let occupied = |id: &str, department: &str, patient_id: &str, name: &str, admitted: &str| Bed {
        patient_id: Some(patient_id.to_string()),
        patient_name: Some(name.to_string()),
        admission_time: Some(admitted.to_string()),
        ..bed(id, BedStatus::Occupied, department)
    };

    vec![
        bed("B-1001", BedStatus::Available, "Emergency"),
        occupied("B-1002", "Emergency", "P-12347", "Robert Johnson", "11:00 AM"),
        bed("B-1003", BedStatus::Maintenance, "ICU"),
        occupied("B-1004", "ICU", "P-10001", "Maria Garcia", "08:30 AM"),
        bed("B-1005", BedStatus::Available, "General Ward"),
        bed("B-1006", BedStatus::Cleaning, "Pediatric"),
        bed("B-1007", BedStatus::Reserved, "Maternity"),
        bed("B-1008", BedStatus::Available, "Surgery"),
    ]
}
