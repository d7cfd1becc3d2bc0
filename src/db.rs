use std::path::Path;

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::AttendanceStatus;
use crate::behavior::{BehaviorCategory, BehaviorKind};
use crate::grades::GradeScale;
use crate::models::{
    AcademicPeriod, AcademicYear, AttendanceRecord, BehaviorRecord, GradeRecord, Student,
};
use crate::period::{overlapping_periods, PeriodStore};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const PERIOD_COLUMNS: &str =
    "id, academic_year_id, name, ordinal, start_date, end_date, active";

fn period_from_row(row: &PgRow) -> AcademicPeriod {
    AcademicPeriod {
        id: row.get("id"),
        academic_year_id: row.get("academic_year_id"),
        name: row.get("name"),
        ordinal: row.get("ordinal"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        active: row.get("active"),
    }
}

fn year_from_row(row: &PgRow) -> AcademicYear {
    AcademicYear {
        id: row.get("id"),
        label: row.get("label"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        active: row.get("active"),
    }
}

fn date(y: i32, m: u32, d: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).context("invalid date")
}

async fn upsert_year(
    pool: &PgPool,
    label: i32,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<Uuid> {
    // A new year only becomes active when no other year is.
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO school_insights.academic_years AS y (id, label, start_date, end_date, active)
        VALUES ($1, $2, $3, $4, NOT EXISTS (
            SELECT 1 FROM school_insights.academic_years WHERE active
        ))
        ON CONFLICT (label) DO UPDATE
        SET start_date = COALESCE(EXCLUDED.start_date, y.start_date),
            end_date = COALESCE(EXCLUDED.end_date, y.end_date)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(label)
    .bind(start_date)
    .bind(end_date)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

async fn upsert_period(
    pool: &PgPool,
    year_id: Uuid,
    name: &str,
    ordinal: i16,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO school_insights.academic_periods
        (id, academic_year_id, name, ordinal, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (academic_year_id, name) DO UPDATE
        SET ordinal = EXCLUDED.ordinal,
            start_date = EXCLUDED.start_date,
            end_date = EXCLUDED.end_date
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(year_id)
    .bind(name)
    .bind(ordinal)
    .bind(start_date)
    .bind(end_date)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

async fn upsert_student(pool: &PgPool, full_name: &str, email: &str) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO school_insights.students (id, full_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(full_name)
    .bind(email)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

async fn period_id_for(pool: &PgPool, year_label: i32, period_name: &str) -> anyhow::Result<Uuid> {
    let row = sqlx::query(
        r#"
        SELECT p.id
        FROM school_insights.academic_periods p
        JOIN school_insights.academic_years y ON y.id = p.academic_year_id
        WHERE y.label = $1 AND p.name = $2
        "#,
    )
    .bind(year_label)
    .bind(period_name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(row.get("id")),
        None => bail!("no period named {period_name:?} in academic year {year_label}"),
    }
}

async fn insert_grade(
    pool: &PgPool,
    student_id: Uuid,
    period_id: Uuid,
    subject: &str,
    score: f64,
    remarks: Option<&str>,
    source_key: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO school_insights.grade_records
        (id, student_id, period_id, subject, score, remarks, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(period_id)
    .bind(subject)
    .bind(score)
    .bind(remarks)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn upsert_attendance(
    pool: &PgPool,
    student_id: Uuid,
    period_id: Uuid,
    attended_on: NaiveDate,
    status: AttendanceStatus,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO school_insights.attendance_records
        (id, student_id, period_id, attended_on, status)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (student_id, attended_on) DO UPDATE
        SET status = EXCLUDED.status, period_id = EXCLUDED.period_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(period_id)
    .bind(attended_on)
    .bind(status.code())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

#[allow(clippy::too_many_arguments)]
async fn insert_behavior(
    pool: &PgPool,
    student_id: Uuid,
    period_id: Uuid,
    kind: BehaviorKind,
    category: BehaviorCategory,
    description: &str,
    observed_on: NaiveDate,
    source_key: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO school_insights.behavior_records
        (id, student_id, period_id, kind, category, description, observed_on, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(period_id)
    .bind(kind.as_str())
    .bind(category.as_str())
    .bind(description)
    .bind(observed_on)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let year_id = upsert_year(
        pool,
        2026,
        Some(date(2026, 1, 26)?),
        Some(date(2026, 11, 27)?),
    )
    .await?;

    let periods = vec![
        ("First", 1, date(2026, 1, 26)?, date(2026, 4, 3)?),
        ("Second", 2, date(2026, 4, 13)?, date(2026, 6, 19)?),
        ("Third", 3, date(2026, 7, 6)?, date(2026, 9, 11)?),
        ("Fourth", 4, date(2026, 9, 21)?, date(2026, 11, 27)?),
    ];
    for (name, ordinal, start, end) in periods {
        upsert_period(pool, year_id, name, ordinal, start, end).await?;
    }

    let students = vec![
        ("Valentina Ríos", "valentina.rios@colegio.edu.co"),
        ("Mateo Cárdenas", "mateo.cardenas@colegio.edu.co"),
        ("Sara Ospina", "sara.ospina@colegio.edu.co"),
    ];
    for (name, email) in students {
        upsert_student(pool, name, email).await?;
    }

    let grades = vec![
        ("seed-g-001", "valentina.rios@colegio.edu.co", "First", "Mathematics", 92.0, None),
        ("seed-g-002", "valentina.rios@colegio.edu.co", "First", "Spanish", 88.0, None),
        ("seed-g-003", "valentina.rios@colegio.edu.co", "Second", "Mathematics", 95.0, None),
        ("seed-g-004", "valentina.rios@colegio.edu.co", "Second", "Science", 81.0, None),
        (
            "seed-g-005",
            "mateo.cardenas@colegio.edu.co",
            "First",
            "Mathematics",
            54.0,
            Some("Missed two quizzes"),
        ),
        ("seed-g-006", "mateo.cardenas@colegio.edu.co", "First", "Spanish", 67.0, None),
        ("seed-g-007", "mateo.cardenas@colegio.edu.co", "Second", "Mathematics", 61.0, None),
        (
            "seed-g-008",
            "mateo.cardenas@colegio.edu.co",
            "Second",
            "Science",
            48.0,
            Some("Lab report incomplete"),
        ),
        ("seed-g-009", "sara.ospina@colegio.edu.co", "First", "Mathematics", 76.0, None),
        ("seed-g-010", "sara.ospina@colegio.edu.co", "Second", "Spanish", 83.0, None),
    ];
    for (source_key, email, period, subject, score, remarks) in grades {
        let student_id = student_id_for(pool, email).await?;
        let period_id = period_id_for(pool, 2026, period).await?;
        insert_grade(pool, student_id, period_id, subject, score, remarks, source_key).await?;
    }

    let attendance = vec![
        ("valentina.rios@colegio.edu.co", "First", date(2026, 2, 2)?, AttendanceStatus::Present),
        ("valentina.rios@colegio.edu.co", "First", date(2026, 2, 3)?, AttendanceStatus::Present),
        ("valentina.rios@colegio.edu.co", "Second", date(2026, 4, 14)?, AttendanceStatus::Excused),
        ("mateo.cardenas@colegio.edu.co", "First", date(2026, 2, 2)?, AttendanceStatus::Absent),
        ("mateo.cardenas@colegio.edu.co", "First", date(2026, 2, 3)?, AttendanceStatus::Present),
        ("mateo.cardenas@colegio.edu.co", "Second", date(2026, 4, 14)?, AttendanceStatus::Absent),
        ("sara.ospina@colegio.edu.co", "First", date(2026, 2, 2)?, AttendanceStatus::Present),
    ];
    for (email, period, attended_on, status) in attendance {
        let student_id = student_id_for(pool, email).await?;
        let period_id = period_id_for(pool, 2026, period).await?;
        upsert_attendance(pool, student_id, period_id, attended_on, status).await?;
    }

    let behavior = vec![
        (
            "seed-b-001",
            "valentina.rios@colegio.edu.co",
            "First",
            BehaviorKind::Positive,
            BehaviorCategory::Solidarity,
            "Tutored classmates before the exam",
            date(2026, 3, 10)?,
        ),
        (
            "seed-b-002",
            "mateo.cardenas@colegio.edu.co",
            "First",
            BehaviorKind::Negative,
            BehaviorCategory::Discipline,
            "Disrupted class repeatedly",
            date(2026, 2, 20)?,
        ),
        (
            "seed-b-003",
            "mateo.cardenas@colegio.edu.co",
            "Second",
            BehaviorKind::Negative,
            BehaviorCategory::Responsibility,
            "Homework not delivered",
            date(2026, 4, 22)?,
        ),
        (
            "seed-b-004",
            "mateo.cardenas@colegio.edu.co",
            "Second",
            BehaviorKind::Positive,
            BehaviorCategory::Respect,
            "Apologised and mediated a conflict",
            date(2026, 5, 6)?,
        ),
    ];
    for (source_key, email, period, kind, category, description, observed_on) in behavior {
        let student_id = student_id_for(pool, email).await?;
        let period_id = period_id_for(pool, 2026, period).await?;
        insert_behavior(
            pool,
            student_id,
            period_id,
            kind,
            category,
            description,
            observed_on,
            source_key,
        )
        .await?;
    }

    info!("seed data ready");
    Ok(())
}

async fn student_id_for(pool: &PgPool, email: &str) -> anyhow::Result<Uuid> {
    fetch_student(pool, email)
        .await?
        .map(|student| student.id)
        .with_context(|| format!("no student with email {email}"))
}

pub async fn import_periods(pool: &PgPool, csv_path: &Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        year: i32,
        name: String,
        ordinal: i16,
        start_date: NaiveDate,
        end_date: NaiveDate,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut imported = 0usize;
    let mut touched_years = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid period row {}", index + 1))?;
        if row.start_date > row.end_date {
            warn!(
                year = row.year,
                period = %row.name,
                "period starts after it ends; it can never be in progress"
            );
        }
        let year_id = upsert_year(pool, row.year, None, None).await?;
        upsert_period(pool, year_id, &row.name, row.ordinal, row.start_date, row.end_date).await?;
        if !touched_years.contains(&row.year) {
            touched_years.push(row.year);
        }
        imported += 1;
    }

    for label in touched_years {
        if let Some(year) = fetch_year(pool, label).await? {
            let periods = fetch_periods(pool, &year).await?;
            for (a, b) in overlapping_periods(&periods) {
                warn!(year = label, first = %a.name, second = %b.name, "periods overlap");
            }
        }
    }

    Ok(imported)
}

pub async fn import_grades(
    pool: &PgPool,
    csv_path: &Path,
    scale: GradeScale,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        year: i32,
        period: String,
        subject: String,
        score: f64,
        remarks: Option<String>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid grade row {}", index + 1))?;
        let score = scale
            .normalize(row.score)
            .with_context(|| format!("grade row {} ({})", index + 1, row.email))?;

        let student_id = upsert_student(pool, &row.full_name, &row.email).await?;
        let period_id = period_id_for(pool, row.year, &row.period).await?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if insert_grade(
            pool,
            student_id,
            period_id,
            &row.subject,
            score,
            row.remarks.as_deref().filter(|r| !r.is_empty()),
            &source_key,
        )
        .await?
        {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_attendance(pool: &PgPool, csv_path: &Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        year: i32,
        period: String,
        date: NaiveDate,
        status: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut written = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid attendance row {}", index + 1))?;
        let status: AttendanceStatus = row
            .status
            .parse()
            .with_context(|| format!("attendance row {}", index + 1))?;

        let student_id = upsert_student(pool, &row.full_name, &row.email).await?;
        let period_id = period_id_for(pool, row.year, &row.period).await?;
        if upsert_attendance(pool, student_id, period_id, row.date, status).await? > 0 {
            written += 1;
        }
    }

    Ok(written)
}

pub async fn import_behavior(pool: &PgPool, csv_path: &Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        year: i32,
        period: String,
        kind: String,
        category: String,
        description: String,
        date: NaiveDate,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid behavior row {}", index + 1))?;
        let kind: BehaviorKind = row
            .kind
            .parse()
            .with_context(|| format!("behavior row {}", index + 1))?;
        let category: BehaviorCategory = row
            .category
            .parse()
            .with_context(|| format!("behavior row {}", index + 1))?;

        let student_id = upsert_student(pool, &row.full_name, &row.email).await?;
        let period_id = period_id_for(pool, row.year, &row.period).await?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if insert_behavior(
            pool,
            student_id,
            period_id,
            kind,
            category,
            &row.description,
            row.date,
            &source_key,
        )
        .await?
        {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn fetch_year(pool: &PgPool, label: i32) -> anyhow::Result<Option<AcademicYear>> {
    let row = sqlx::query(
        "SELECT id, label, start_date, end_date, active \
         FROM school_insights.academic_years WHERE label = $1",
    )
    .bind(label)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(year_from_row))
}

/// The active year with the highest label. Callers fetch this once and pass
/// it down; nothing below `main` looks it up on its own.
pub async fn fetch_active_year(pool: &PgPool) -> anyhow::Result<Option<AcademicYear>> {
    let row = sqlx::query(
        "SELECT id, label, start_date, end_date, active \
         FROM school_insights.academic_years WHERE active \
         ORDER BY label DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(year_from_row))
}

pub async fn fetch_periods(
    pool: &PgPool,
    year: &AcademicYear,
) -> anyhow::Result<Vec<AcademicPeriod>> {
    let rows = sqlx::query(&format!(
        "SELECT {PERIOD_COLUMNS} FROM school_insights.academic_periods \
         WHERE academic_year_id = $1 ORDER BY start_date, ordinal"
    ))
    .bind(year.id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(period_from_row).collect())
}

pub async fn fetch_student(pool: &PgPool, email: &str) -> anyhow::Result<Option<Student>> {
    let row =
        sqlx::query("SELECT id, full_name, email FROM school_insights.students WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|row| Student {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
    }))
}

pub async fn fetch_grades(
    pool: &PgPool,
    student_id: Uuid,
    year: &AcademicYear,
    period_id: Option<Uuid>,
) -> anyhow::Result<Vec<GradeRecord>> {
    let mut query = String::from(
        "SELECT g.student_id, g.period_id, p.name AS period_label, g.subject, g.score, g.remarks \
         FROM school_insights.grade_records g \
         JOIN school_insights.academic_periods p ON p.id = g.period_id \
         WHERE g.student_id = $1 AND p.academic_year_id = $2",
    );
    if period_id.is_some() {
        query.push_str(" AND g.period_id = $3");
    }
    query.push_str(" ORDER BY p.start_date, p.ordinal, g.subject");

    let mut rows = sqlx::query(&query).bind(student_id).bind(year.id);
    if let Some(value) = period_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut grades = Vec::with_capacity(records.len());

    for row in records {
        grades.push(GradeRecord {
            student_id: row.get("student_id"),
            period_id: row.get("period_id"),
            period_label: row.get("period_label"),
            subject: row.get("subject"),
            score: row.get("score"),
            remarks: row.get("remarks"),
        });
    }

    Ok(grades)
}

pub async fn fetch_attendance(
    pool: &PgPool,
    student_id: Uuid,
    year: &AcademicYear,
    period_id: Option<Uuid>,
) -> anyhow::Result<Vec<AttendanceRecord>> {
    let mut query = String::from(
        "SELECT a.student_id, a.period_id, p.name AS period_label, a.attended_on, a.status \
         FROM school_insights.attendance_records a \
         JOIN school_insights.academic_periods p ON p.id = a.period_id \
         WHERE a.student_id = $1 AND p.academic_year_id = $2",
    );
    if period_id.is_some() {
        query.push_str(" AND a.period_id = $3");
    }
    query.push_str(" ORDER BY p.start_date, p.ordinal, a.attended_on");

    let mut rows = sqlx::query(&query).bind(student_id).bind(year.id);
    if let Some(value) = period_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut attendance = Vec::with_capacity(records.len());

    for row in records {
        let code: String = row.get("status");
        attendance.push(AttendanceRecord {
            student_id: row.get("student_id"),
            period_id: row.get("period_id"),
            period_label: row.get("period_label"),
            attended_on: row.get("attended_on"),
            status: code.parse::<AttendanceStatus>()?,
        });
    }

    Ok(attendance)
}

pub async fn fetch_behavior(
    pool: &PgPool,
    student_id: Uuid,
    year: &AcademicYear,
    period_id: Option<Uuid>,
) -> anyhow::Result<Vec<BehaviorRecord>> {
    let mut query = String::from(
        "SELECT b.student_id, b.period_id, p.name AS period_label, b.kind, b.category, \
         b.description, b.observed_on \
         FROM school_insights.behavior_records b \
         JOIN school_insights.academic_periods p ON p.id = b.period_id \
         WHERE b.student_id = $1 AND p.academic_year_id = $2",
    );
    if period_id.is_some() {
        query.push_str(" AND b.period_id = $3");
    }
    query.push_str(" ORDER BY b.observed_on DESC");

    let mut rows = sqlx::query(&query).bind(student_id).bind(year.id);
    if let Some(value) = period_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut behavior = Vec::with_capacity(records.len());

    for row in records {
        let kind: String = row.get("kind");
        let category: String = row.get("category");
        behavior.push(BehaviorRecord {
            student_id: row.get("student_id"),
            period_id: row.get("period_id"),
            period_label: row.get("period_label"),
            kind: kind.parse::<BehaviorKind>()?,
            category: category.parse::<BehaviorCategory>()?,
            description: row.get("description"),
            observed_on: row.get("observed_on"),
        });
    }

    Ok(behavior)
}

/// `PeriodStore` backed by `school_insights.academic_periods`, one query per lookup.
///
/// Ties fall back to `created_at, id`, which is insertion order for rows
/// written outside a shared transaction.
#[derive(Clone)]
pub struct PgPeriodStore {
    pool: PgPool,
}

impl PgPeriodStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn first(
        &self,
        filter: &str,
        order: &str,
        year: &AcademicYear,
        date: Option<NaiveDate>,
    ) -> anyhow::Result<Option<AcademicPeriod>> {
        let sql = format!(
            "SELECT {PERIOD_COLUMNS} FROM school_insights.academic_periods \
             WHERE academic_year_id = $1{filter} ORDER BY {order} LIMIT 1"
        );
        let mut query = sqlx::query(&sql).bind(year.id);
        if let Some(date) = date {
            query = query.bind(date);
        }

        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(period_from_row))
    }
}

#[async_trait]
impl PeriodStore for PgPeriodStore {
    async fn find_active(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>> {
        self.first(
            " AND start_date <= $2 AND end_date >= $2",
            "start_date, created_at, id",
            year,
            Some(date),
        )
        .await
    }

    async fn find_latest_ended_before(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>> {
        self.first(
            " AND end_date < $2",
            "end_date DESC, created_at, id",
            year,
            Some(date),
        )
        .await
    }

    async fn find_earliest_starting_after(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>> {
        self.first(
            " AND start_date > $2",
            "start_date, created_at, id",
            year,
            Some(date),
        )
        .await
    }

    async fn find_any(&self, year: &AcademicYear) -> anyhow::Result<Option<AcademicPeriod>> {
        self.first("", "created_at, id", year, None).await
    }
}
