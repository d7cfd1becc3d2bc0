use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::attendance::AttendanceStatus;
use crate::behavior::{BehaviorCategory, BehaviorKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicYear {
    pub id: Uuid,
    pub label: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicPeriod {
    pub id: Uuid,
    pub academic_year_id: Uuid,
    pub name: String,
    pub ordinal: i16,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
}

impl AcademicPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// A grade already normalised to the canonical 0-100 scale.
#[derive(Debug, Clone, Serialize)]
pub struct GradeRecord {
    pub student_id: Uuid,
    pub period_id: Uuid,
    pub period_label: String,
    pub subject: String,
    pub score: f64,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub student_id: Uuid,
    pub period_id: Uuid,
    pub period_label: String,
    pub attended_on: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorRecord {
    pub student_id: Uuid,
    pub period_id: Uuid,
    pub period_label: String,
    pub kind: BehaviorKind,
    pub category: BehaviorCategory,
    pub description: String,
    pub observed_on: NaiveDate,
}
