use std::fmt::Write;

use chrono::NaiveDate;

use crate::attendance::{attendance_by_period, attendance_stats};
use crate::behavior::behavior_stats;
use crate::config::GradingPolicy;
use crate::grades::{aggregate_records, summarize_subjects, PerformanceLevel};
use crate::models::{AcademicYear, AttendanceRecord, BehaviorRecord, GradeRecord, Student};
use crate::period::ResolvedPeriod;

pub struct ReportContext<'a> {
    pub student: &'a Student,
    pub year: &'a AcademicYear,
    pub reference_date: NaiveDate,
    pub resolved: Option<&'a ResolvedPeriod>,
    pub grades: &'a [GradeRecord],
    pub attendance: &'a [AttendanceRecord],
    pub behavior: &'a [BehaviorRecord],
    pub policy: &'a GradingPolicy,
}

pub fn recommendation(level: PerformanceLevel, needs_attention: bool) -> String {
    let mut text = match level {
        PerformanceLevel::Superior => {
            "Outstanding academic performance across the evaluated subjects."
        }
        PerformanceLevel::High => "Good academic performance; keep the current study habits.",
        PerformanceLevel::Basic => {
            "Acceptable performance; reinforce the weaker subjects to move up a level."
        }
        PerformanceLevel::Low => {
            "Low performance; an improvement plan with close follow-up is recommended."
        }
    }
    .to_string();

    if needs_attention {
        text.push_str(" Classroom behavior and attitude also need to improve.");
    }
    text
}

pub fn build_report(ctx: &ReportContext<'_>) -> String {
    let grades = aggregate_records(ctx.grades, ctx.policy);
    let subjects = summarize_subjects(ctx.grades, ctx.policy);
    let attendance = attendance_stats(ctx.attendance.iter().map(|record| record.status));
    let attendance_periods = attendance_by_period(ctx.attendance);
    let behavior = behavior_stats(ctx.behavior);

    let mut output = String::new();

    let _ = writeln!(output, "# Academic Report: {}", ctx.student.full_name);
    let _ = writeln!(
        output,
        "Academic year {} ({}), as of {}",
        ctx.year.label, ctx.student.email, ctx.reference_date
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Academic Period");
    match ctx.resolved {
        Some(resolved) => {
            let _ = writeln!(
                output,
                "{} period, {} to {} ({})",
                resolved.period.name,
                resolved.period.start_date,
                resolved.period.end_date,
                resolved.resolution.describe()
            );
        }
        None => {
            let _ = writeln!(output, "No academic period configured for this year.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grades");

    if grades.count == 0 {
        let _ = writeln!(output, "No grades recorded for this window.");
    } else {
        for period in grades.periods.iter() {
            let _ = writeln!(
                output,
                "- {}: average {:.1} across {} grades",
                period.period_label, period.mean, period.count
            );
        }
        let _ = writeln!(
            output,
            "- Overall: average {:.1} ({}), highest {:.1}, lowest {:.1}",
            grades.overall_mean,
            ctx.policy.classify(grades.overall_mean),
            grades.max,
            grades.min
        );
        let _ = writeln!(
            output,
            "- {} of {} grades below the pass mark of {:.1}",
            grades.below_threshold, grades.count, grades.pass_threshold
        );

        let _ = writeln!(output);
        let _ = writeln!(output, "| Subject | Grades | Average | Level |");
        let _ = writeln!(output, "|---|---|---|---|");
        for subject in subjects.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {:.1} | {} |",
                subject.subject, subject.count, subject.mean, subject.level
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Attendance");

    if attendance.total == 0 {
        let _ = writeln!(output, "No attendance recorded for this window.");
    } else {
        let _ = writeln!(
            output,
            "{:.1}% attendance over {} days ({} present, {} absent, {} excused)",
            attendance.attendance_percentage,
            attendance.total,
            attendance.present,
            attendance.absent,
            attendance.excused
        );
        if attendance_periods.len() > 1 {
            for period in attendance_periods.iter() {
                let _ = writeln!(
                    output,
                    "- {}: {:.1}% over {} days",
                    period.period_label, period.stats.attendance_percentage, period.stats.total
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Behavior");

    if behavior.total == 0 {
        let _ = writeln!(output, "No behavior observations for this window.");
    } else {
        let _ = writeln!(
            output,
            "{} observations: {} positive, {} negative",
            behavior.total, behavior.positive, behavior.negative
        );
        for count in behavior.by_category.iter() {
            if count.positive + count.negative > 0 {
                let _ = writeln!(
                    output,
                    "- {}: {} positive, {} negative",
                    count.category, count.positive, count.negative
                );
            }
        }

        let mut recent: Vec<&BehaviorRecord> = ctx.behavior.iter().collect();
        recent.sort_by(|a, b| b.observed_on.cmp(&a.observed_on));
        for record in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}, {}): {}",
                record.observed_on,
                record.kind.as_str(),
                record.category,
                record.description
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendation");

    if grades.count == 0 {
        let _ = writeln!(output, "No grades recorded yet; no recommendation available.");
    } else {
        let level = ctx.policy.classify(grades.overall_mean);
        let _ = writeln!(output, "{}", recommendation(level, behavior.needs_attention));
    }

    output
}
