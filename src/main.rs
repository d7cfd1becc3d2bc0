use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

mod attendance;
mod behavior;
mod config;
mod db;
mod grades;
mod logging;
mod models;
mod period;
mod report;

use config::{GradingArgs, GradingPolicy};
use models::{AcademicYear, Student};
use period::{overlapping_periods, resolve_period, PeriodCatalog, ResolvedPeriod};

#[derive(Parser)]
#[command(name = "period-insights")]
#[command(
    about = "Academic period resolution with grade, attendance and behavior summaries",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ImportKind {
    Periods,
    Grades,
    Attendance,
    Behavior,
}

#[derive(Args)]
struct Scope {
    /// Academic year label, defaults to the active year
    #[arg(long)]
    year: Option<i32>,
    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl Scope {
    fn reference_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a sample school year
    Seed,
    /// Import periods, grades, attendance or behavior from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: ImportKind,
        #[arg(long)]
        csv: PathBuf,
        /// Scale the grade file was recorded on
        #[arg(long, value_enum, default_value_t = grades::GradeScale::Hundred)]
        scale: grades::GradeScale,
    },
    /// Show which academic period applies on a date
    Period {
        #[command(flatten)]
        scope: Scope,
        /// Resolve against a calendar CSV instead of the database
        #[arg(long)]
        calendar: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Summarize a student's grades
    Grades {
        #[arg(long)]
        email: String,
        #[command(flatten)]
        scope: Scope,
        /// Include every period of the year instead of the resolved one
        #[arg(long)]
        all_periods: bool,
        #[command(flatten)]
        grading: GradingArgs,
        #[arg(long)]
        json: bool,
    },
    /// Summarize a student's attendance
    Attendance {
        #[arg(long)]
        email: String,
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        all_periods: bool,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report for a student
    Report {
        #[arg(long)]
        email: String,
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        all_periods: bool,
        #[command(flatten)]
        grading: GradingArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_year(pool: &PgPool, label: Option<i32>) -> anyhow::Result<Option<AcademicYear>> {
    match label {
        Some(label) => db::fetch_year(pool, label).await,
        None => db::fetch_active_year(pool).await,
    }
}

struct StudentScope {
    student: Student,
    year: AcademicYear,
    reference_date: NaiveDate,
    resolved: Option<ResolvedPeriod>,
}

impl StudentScope {
    /// Period filter for record fetches; `None` means the whole year.
    fn period_filter(&self, all_periods: bool) -> Option<Uuid> {
        if all_periods {
            None
        } else {
            self.resolved.as_ref().map(|resolved| resolved.period.id)
        }
    }

    fn describe(&self, all_periods: bool) -> String {
        match (&self.resolved, all_periods) {
            (_, true) => format!("academic year {}", self.year.label),
            (Some(resolved), false) => format!(
                "academic year {}, {} period ({})",
                self.year.label,
                resolved.period.name,
                resolved.resolution.describe()
            ),
            (None, false) => format!("academic year {}, no period configured", self.year.label),
        }
    }
}

async fn load_student_scope(
    pool: &PgPool,
    email: &str,
    scope: &Scope,
) -> anyhow::Result<StudentScope> {
    let Some(student) = db::fetch_student(pool, email).await? else {
        bail!("no student with email {email}");
    };
    let Some(year) = load_year(pool, scope.year).await? else {
        match scope.year {
            Some(label) => bail!("academic year {label} does not exist"),
            None => bail!("no active academic year; pass --year"),
        }
    };

    let reference_date = scope.reference_date();
    let store = db::PgPeriodStore::new(pool.clone());
    let resolved = resolve_period(&store, Some(&year), reference_date).await?;

    Ok(StudentScope {
        student,
        year,
        reference_date,
        resolved,
    })
}

fn print_resolution(
    year: &AcademicYear,
    reference_date: NaiveDate,
    resolved: Option<&ResolvedPeriod>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    match resolved {
        Some(resolved) => println!(
            "{}: {} period of {} ({} to {}), {}",
            reference_date,
            resolved.period.name,
            year.label,
            resolved.period.start_date,
            resolved.period.end_date,
            resolved.resolution.describe()
        ),
        None => println!("No academic period configured for {}.", year.label),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { kind, csv, scale } => {
            let pool = connect().await?;
            let (written, what) = match kind {
                ImportKind::Periods => (db::import_periods(&pool, &csv).await?, "periods"),
                ImportKind::Grades => (db::import_grades(&pool, &csv, scale).await?, "grades"),
                ImportKind::Attendance => {
                    (db::import_attendance(&pool, &csv).await?, "attendance records")
                }
                ImportKind::Behavior => {
                    (db::import_behavior(&pool, &csv).await?, "behavior observations")
                }
            };
            info!(file = %csv.display(), written, "import finished");
            println!("Imported {written} {what} from {}.", csv.display());
        }
        Commands::Period {
            scope,
            calendar,
            json,
        } => {
            let reference_date = scope.reference_date();

            if let Some(path) = calendar {
                let year = AcademicYear {
                    id: Uuid::new_v4(),
                    label: scope.year.unwrap_or_else(|| reference_date.year()),
                    start_date: None,
                    end_date: None,
                    active: true,
                };
                let catalog = PeriodCatalog::from_csv(&path, &year)?;
                for (a, b) in overlapping_periods(catalog.periods()) {
                    warn!(first = %a.name, second = %b.name, "periods overlap");
                }
                let resolved = resolve_period(&catalog, Some(&year), reference_date).await?;
                return print_resolution(&year, reference_date, resolved.as_ref(), json);
            }

            let pool = connect().await?;
            let Some(year) = load_year(&pool, scope.year).await? else {
                println!("No academic year found.");
                return Ok(());
            };
            let periods = db::fetch_periods(&pool, &year).await?;
            for (a, b) in overlapping_periods(&periods) {
                warn!(year = year.label, first = %a.name, second = %b.name, "periods overlap");
            }

            let store = db::PgPeriodStore::new(pool.clone());
            let resolved = resolve_period(&store, Some(&year), reference_date).await?;
            print_resolution(&year, reference_date, resolved.as_ref(), json)?;
        }
        Commands::Grades {
            email,
            scope,
            all_periods,
            grading,
            json,
        } => {
            let policy = GradingPolicy::try_from(grading)?;
            let pool = connect().await?;
            let ctx = load_student_scope(&pool, &email, &scope).await?;
            let records = db::fetch_grades(
                &pool,
                ctx.student.id,
                &ctx.year,
                ctx.period_filter(all_periods),
            )
            .await?;
            let summary = grades::aggregate_records(&records, &policy);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!(
                "Grades for {} ({}), {}:",
                ctx.student.full_name,
                ctx.student.email,
                ctx.describe(all_periods)
            );
            if summary.count == 0 {
                println!("No grades recorded for this window.");
                return Ok(());
            }
            for period in summary.periods.iter() {
                println!(
                    "- {}: average {:.1} across {} grades",
                    period.period_label, period.mean, period.count
                );
            }
            println!(
                "Overall average {:.1} ({}), highest {:.1}, lowest {:.1}; {} of {} below {:.1}",
                summary.overall_mean,
                policy.classify(summary.overall_mean),
                summary.max,
                summary.min,
                summary.below_threshold,
                summary.count,
                summary.pass_threshold
            );
        }
        Commands::Attendance {
            email,
            scope,
            all_periods,
            json,
        } => {
            let pool = connect().await?;
            let ctx = load_student_scope(&pool, &email, &scope).await?;
            let records = db::fetch_attendance(
                &pool,
                ctx.student.id,
                &ctx.year,
                ctx.period_filter(all_periods),
            )
            .await?;
            let stats = attendance::attendance_stats(records.iter().map(|record| record.status));
            let by_period = attendance::attendance_by_period(&records);

            if json {
                let body = serde_json::json!({ "overall": stats, "periods": by_period });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            println!(
                "Attendance for {} ({}), {}:",
                ctx.student.full_name,
                ctx.student.email,
                ctx.describe(all_periods)
            );
            println!(
                "{:.1}% attendance over {} days ({} present, {} absent, {} excused)",
                stats.attendance_percentage, stats.total, stats.present, stats.absent, stats.excused
            );
            for period in by_period.iter() {
                println!(
                    "- {}: {:.1}% over {} days",
                    period.period_label, period.stats.attendance_percentage, period.stats.total
                );
            }
        }
        Commands::Report {
            email,
            scope,
            all_periods,
            grading,
            out,
        } => {
            let policy = GradingPolicy::try_from(grading)?;
            let pool = connect().await?;
            let ctx = load_student_scope(&pool, &email, &scope).await?;
            let period_id = ctx.period_filter(all_periods);

            let grades = db::fetch_grades(&pool, ctx.student.id, &ctx.year, period_id).await?;
            let attendance =
                db::fetch_attendance(&pool, ctx.student.id, &ctx.year, period_id).await?;
            let behavior = db::fetch_behavior(&pool, ctx.student.id, &ctx.year, period_id).await?;

            let report = report::build_report(&report::ReportContext {
                student: &ctx.student,
                year: &ctx.year,
                reference_date: ctx.reference_date,
                resolved: ctx.resolved.as_ref(),
                grades: &grades,
                attendance: &attendance,
                behavior: &behavior,
                policy: &policy,
            });
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
