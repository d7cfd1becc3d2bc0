use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::grades::round1;
use crate::models::BehaviorRecord;

#[derive(Debug, Error, PartialEq)]
pub enum ParseBehaviorError {
    #[error("unknown behavior kind: {0:?}")]
    Kind(String),
    #[error("unknown behavior category: {0:?}")]
    Category(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    Positive,
    Negative,
}

impl BehaviorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorKind::Positive => "positive",
            BehaviorKind::Negative => "negative",
        }
    }
}

impl FromStr for BehaviorKind {
    type Err = ParseBehaviorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(BehaviorKind::Positive),
            "negative" => Ok(BehaviorKind::Negative),
            _ => Err(ParseBehaviorError::Kind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorCategory {
    Respect,
    Responsibility,
    Discipline,
    Solidarity,
    Academic,
}

impl BehaviorCategory {
    pub const ALL: [BehaviorCategory; 5] = [
        BehaviorCategory::Respect,
        BehaviorCategory::Responsibility,
        BehaviorCategory::Discipline,
        BehaviorCategory::Solidarity,
        BehaviorCategory::Academic,
    ];

    /// Position in `ALL`, which follows declaration order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorCategory::Respect => "respect",
            BehaviorCategory::Responsibility => "responsibility",
            BehaviorCategory::Discipline => "discipline",
            BehaviorCategory::Solidarity => "solidarity",
            BehaviorCategory::Academic => "academic",
        }
    }
}

impl FromStr for BehaviorCategory {
    type Err = ParseBehaviorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        BehaviorCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| ParseBehaviorError::Category(s.to_string()))
    }
}

impl fmt::Display for BehaviorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: BehaviorCategory,
    pub positive: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorStats {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub positive_percentage: f64,
    /// One entry per category, in `BehaviorCategory::ALL` order.
    pub by_category: Vec<CategoryCount>,
    pub needs_attention: bool,
}

pub fn behavior_stats(records: &[BehaviorRecord]) -> BehaviorStats {
    let mut by_category: Vec<CategoryCount> = BehaviorCategory::ALL
        .into_iter()
        .map(|category| CategoryCount {
            category,
            positive: 0,
            negative: 0,
        })
        .collect();
    let mut positive = 0usize;
    let mut negative = 0usize;

    for record in records {
        let slot = &mut by_category[record.category.index()];
        match record.kind {
            BehaviorKind::Positive => {
                positive += 1;
                slot.positive += 1;
            }
            BehaviorKind::Negative => {
                negative += 1;
                slot.negative += 1;
            }
        }
    }

    let total = positive + negative;
    BehaviorStats {
        total,
        positive,
        negative,
        positive_percentage: if total == 0 {
            0.0
        } else {
            round1(positive as f64 / total as f64 * 100.0)
        },
        by_category,
        needs_attention: negative > positive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record(kind: BehaviorKind, category: BehaviorCategory) -> BehaviorRecord {
        BehaviorRecord {
            student_id: Uuid::new_v4(),
            period_id: Uuid::new_v4(),
            period_label: "First".to_string(),
            kind,
            category,
            description: "observation".to_string(),
            observed_on: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        }
    }

    #[test]
    fn empty_log_has_every_category_and_no_flag() {
        let stats = behavior_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.positive_percentage, 0.0);
        assert_eq!(stats.by_category.len(), 5);
        assert!(!stats.needs_attention);
    }

    #[test]
    fn counts_split_by_kind_and_category() {
        let records = vec![
            record(BehaviorKind::Positive, BehaviorCategory::Respect),
            record(BehaviorKind::Negative, BehaviorCategory::Discipline),
            record(BehaviorKind::Negative, BehaviorCategory::Discipline),
            record(BehaviorKind::Positive, BehaviorCategory::Academic),
        ];

        let stats = behavior_stats(&records);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.positive, 2);
        assert_eq!(stats.negative, 2);
        assert_eq!(stats.positive_percentage, 50.0);
        assert!(!stats.needs_attention);
        let discipline = &stats.by_category[2];
        assert_eq!(discipline.category, BehaviorCategory::Discipline);
        assert_eq!(discipline.negative, 2);
        assert_eq!(discipline.positive, 0);
    }

    #[test]
    fn every_category_lands_in_its_own_slot() {
        let records: Vec<BehaviorRecord> = BehaviorCategory::ALL
            .into_iter()
            .map(|category| record(BehaviorKind::Positive, category))
            .collect();

        let stats = behavior_stats(&records);

        for (position, count) in stats.by_category.iter().enumerate() {
            assert_eq!(count.category, BehaviorCategory::ALL[position]);
            assert_eq!(count.category.index(), position);
            assert_eq!(count.positive, 1);
        }
    }

    #[test]
    fn more_negative_than_positive_needs_attention() {
        let records = vec![
            record(BehaviorKind::Negative, BehaviorCategory::Respect),
            record(BehaviorKind::Negative, BehaviorCategory::Solidarity),
            record(BehaviorKind::Positive, BehaviorCategory::Academic),
        ];
        assert!(behavior_stats(&records).needs_attention);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("Positive".parse::<BehaviorKind>(), Ok(BehaviorKind::Positive));
        assert_eq!(
            "DISCIPLINE".parse::<BehaviorCategory>(),
            Ok(BehaviorCategory::Discipline)
        );
        assert_eq!(
            "punctuality".parse::<BehaviorCategory>(),
            Err(ParseBehaviorError::Category("punctuality".to_string()))
        );
    }
}
