use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use crate::config::GradingPolicy;
use crate::models::GradeRecord;

/// Upper bound of the canonical grading scale.
pub const CANONICAL_MAX: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("score is not a finite number")]
    NotFinite,
    #[error("score {value} is outside the {scale} scale")]
    OutOfRange { value: f64, scale: GradeScale },
}

/// Scale a score was recorded on. Everything is stored on the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeScale {
    /// 0 to 100
    Hundred,
    /// 0.0 to 5.0
    Five,
}

impl GradeScale {
    pub fn max(self) -> f64 {
        match self {
            GradeScale::Hundred => 100.0,
            GradeScale::Five => 5.0,
        }
    }

    /// Validates `value` against this scale and converts it to 0-100.
    pub fn normalize(self, value: f64) -> Result<f64, ScoreError> {
        if !value.is_finite() {
            return Err(ScoreError::NotFinite);
        }
        if value < 0.0 || value > self.max() {
            return Err(ScoreError::OutOfRange { value, scale: self });
        }
        Ok(value * (CANONICAL_MAX / self.max()))
    }
}

impl fmt::Display for GradeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeScale::Hundred => write!(f, "0-100"),
            GradeScale::Five => write!(f, "0-5"),
        }
    }
}

/// Rounds to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceLevel {
    Superior,
    High,
    Basic,
    Low,
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerformanceLevel::Superior => "Superior",
            PerformanceLevel::High => "High",
            PerformanceLevel::Basic => "Basic",
            PerformanceLevel::Low => "Low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAverage {
    pub period_label: String,
    pub count: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    pub periods: Vec<PeriodAverage>,
    pub count: usize,
    pub overall_mean: f64,
    pub max: f64,
    pub min: f64,
    pub below_threshold: usize,
    pub pass_threshold: f64,
}

/// Aggregates `(period_label, score)` pairs.
///
/// The overall mean is taken over every score, not over the period means,
/// so periods with more grades weigh more. Periods keep first-seen order.
pub fn aggregate<'a, I>(scores: I, policy: &GradingPolicy) -> GradeSummary
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut order: Vec<&'a str> = Vec::new();
    let mut per_period: HashMap<&'a str, (usize, f64)> = HashMap::new();
    let mut count = 0usize;
    let mut total = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    let mut below_threshold = 0usize;

    for (label, score) in scores {
        let entry = per_period.entry(label).or_insert_with(|| {
            order.push(label);
            (0, 0.0)
        });
        entry.0 += 1;
        entry.1 += score;

        count += 1;
        total += score;
        max = max.max(score);
        min = min.min(score);
        if score < policy.pass_threshold {
            below_threshold += 1;
        }
    }

    let periods = order
        .into_iter()
        .map(|label| {
            let (n, sum) = per_period[label];
            PeriodAverage {
                period_label: label.to_string(),
                count: n,
                mean: round1(sum / n as f64),
            }
        })
        .collect();

    if count == 0 {
        return GradeSummary {
            periods,
            count: 0,
            overall_mean: 0.0,
            max: 0.0,
            min: 0.0,
            below_threshold: 0,
            pass_threshold: policy.pass_threshold,
        };
    }

    GradeSummary {
        periods,
        count,
        overall_mean: round1(total / count as f64),
        max,
        min,
        below_threshold,
        pass_threshold: policy.pass_threshold,
    }
}

pub fn aggregate_records(records: &[GradeRecord], policy: &GradingPolicy) -> GradeSummary {
    aggregate(
        records
            .iter()
            .map(|record| (record.period_label.as_str(), record.score)),
        policy,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub count: usize,
    pub mean: f64,
    pub level: PerformanceLevel,
}

/// Per-subject means, sorted by subject name.
pub fn summarize_subjects(records: &[GradeRecord], policy: &GradingPolicy) -> Vec<SubjectAverage> {
    let mut map: HashMap<&str, (usize, f64)> = HashMap::new();

    for record in records {
        let entry = map.entry(record.subject.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.score;
    }

    let mut subjects: Vec<SubjectAverage> = map
        .into_iter()
        .map(|(subject, (count, total))| {
            let mean = round1(total / count as f64);
            SubjectAverage {
                subject: subject.to_string(),
                count,
                mean,
                level: policy.classify(mean),
            }
        })
        .collect();

    subjects.sort_by(|a, b| a.subject.cmp(&b.subject));
    subjects
}
