use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::grades::round1;
use crate::models::AttendanceRecord;

#[derive(Debug, Error, PartialEq)]
#[error("unknown attendance status: {0:?}")]
pub struct ParseStatusError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excused,
}

impl AttendanceStatus {
    /// Single-letter code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "A",
            AttendanceStatus::Absent => "F",
            AttendanceStatus::Excused => "J",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "present" => Ok(AttendanceStatus::Present),
            "f" | "absent" => Ok(AttendanceStatus::Absent),
            "j" | "excused" => Ok(AttendanceStatus::Excused),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Excused => "excused",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub excused: usize,
    pub attendance_percentage: f64,
    pub absence_percentage: f64,
    pub excused_percentage: f64,
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 / total as f64 * 100.0)
    }
}

pub fn attendance_stats<I>(statuses: I) -> AttendanceStats
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let mut stats = AttendanceStats::default();

    for status in statuses {
        stats.total += 1;
        match status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Excused => stats.excused += 1,
        }
    }

    stats.attendance_percentage = percentage(stats.present, stats.total);
    stats.absence_percentage = percentage(stats.absent, stats.total);
    stats.excused_percentage = percentage(stats.excused, stats.total);
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAttendance {
    pub period_label: String,
    pub stats: AttendanceStats,
}

/// Splits records by period label, keeping the order periods first appear in.
pub fn attendance_by_period(records: &[AttendanceRecord]) -> Vec<PeriodAttendance> {
    let mut labels: Vec<&str> = Vec::new();
    for record in records {
        if !labels.contains(&record.period_label.as_str()) {
            labels.push(&record.period_label);
        }
    }

    labels
        .into_iter()
        .map(|label| PeriodAttendance {
            period_label: label.to_string(),
            stats: attendance_stats(
                records
                    .iter()
                    .filter(|record| record.period_label == label)
                    .map(|record| record.status),
            ),
        })
        .collect()
}
