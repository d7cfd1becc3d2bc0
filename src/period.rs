use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AcademicPeriod, AcademicYear};

/// Point lookups over the periods of one academic year.
///
/// Each lookup returns at most one period. Implementations must agree on
/// tie-breaking so that resolution does not depend on the backing store.
#[async_trait]
pub trait PeriodStore: Send + Sync {
    /// Period containing `date`; earliest `start_date` first when periods overlap.
    async fn find_active(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>>;

    /// Period with the latest `end_date` strictly before `date`.
    async fn find_latest_ended_before(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>>;

    /// Period with the earliest `start_date` strictly after `date`.
    async fn find_earliest_starting_after(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>>;

    /// First period of the year in insertion order.
    async fn find_any(&self, year: &AcademicYear) -> anyhow::Result<Option<AcademicPeriod>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Active,
    LastEnded,
    Upcoming,
    Fallback,
}

impl Resolution {
    pub fn describe(self) -> &'static str {
        match self {
            Resolution::Active => "in progress",
            Resolution::LastEnded => "most recently ended",
            Resolution::Upcoming => "next upcoming",
            Resolution::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPeriod {
    pub period: AcademicPeriod,
    pub resolution: Resolution,
}

/// Picks the period a dashboard should show for `reference_date`.
///
/// Tiers run in order and stop at the first hit: the period in progress, the
/// most recently ended one, the next upcoming one, then any period of the
/// year. `Ok(None)` means the year has no periods (or no year was given).
pub async fn resolve_period<S>(
    store: &S,
    year: Option<&AcademicYear>,
    reference_date: NaiveDate,
) -> anyhow::Result<Option<ResolvedPeriod>>
where
    S: PeriodStore + ?Sized,
{
    let Some(year) = year else {
        return Ok(None);
    };

    let tiers = [
        Resolution::Active,
        Resolution::LastEnded,
        Resolution::Upcoming,
        Resolution::Fallback,
    ];

    for resolution in tiers {
        let found = match resolution {
            Resolution::Active => store.find_active(year, reference_date).await?,
            Resolution::LastEnded => store.find_latest_ended_before(year, reference_date).await?,
            Resolution::Upcoming => {
                store
                    .find_earliest_starting_after(year, reference_date)
                    .await?
            }
            Resolution::Fallback => store.find_any(year).await?,
        };

        if let Some(period) = found {
            debug!(
                year = year.label,
                period = %period.name,
                ?resolution,
                %reference_date,
                "resolved academic period"
            );
            return Ok(Some(ResolvedPeriod { period, resolution }));
        }
    }

    debug!(year = year.label, %reference_date, "academic year has no periods");
    Ok(None)
}

/// Pairs of periods whose date ranges share at least one day.
///
/// Periods of one year are meant to be disjoint but nothing in storage
/// enforces it, so imports and the `period` command report overlaps.
pub fn overlapping_periods(periods: &[AcademicPeriod]) -> Vec<(&AcademicPeriod, &AcademicPeriod)> {
    let mut pairs = Vec::new();
    for (i, a) in periods.iter().enumerate() {
        for b in &periods[i + 1..] {
            if a.academic_year_id == b.academic_year_id
                && a.start_date <= b.end_date
                && b.start_date <= a.end_date
            {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

/// In-memory period list, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PeriodCatalog {
    periods: Vec<AcademicPeriod>,
}

impl PeriodCatalog {
    pub fn new(periods: Vec<AcademicPeriod>) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> &[AcademicPeriod] {
        &self.periods
    }

    /// Loads a calendar CSV with columns `name,ordinal,start_date,end_date`.
    ///
    /// Every row is attached to `year`.
    pub fn from_csv(path: &Path, year: &AcademicYear) -> anyhow::Result<Self> {
        #[derive(serde::Deserialize)]
        struct CalendarRow {
            name: String,
            ordinal: i16,
            start_date: NaiveDate,
            end_date: NaiveDate,
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open calendar {}", path.display()))?;
        let mut periods = Vec::new();

        for result in reader.deserialize::<CalendarRow>() {
            let row = result.context("invalid calendar row")?;
            periods.push(AcademicPeriod {
                id: Uuid::new_v4(),
                academic_year_id: year.id,
                name: row.name,
                ordinal: row.ordinal,
                start_date: row.start_date,
                end_date: row.end_date,
                active: true,
            });
        }

        Ok(Self::new(periods))
    }

    fn of_year<'a>(&'a self, year: &'a AcademicYear) -> impl Iterator<Item = &'a AcademicPeriod> {
        self.periods
            .iter()
            .filter(move |period| period.academic_year_id == year.id)
    }
}

// `min_by_key`/`max_by_key` keep the first/last equal element respectively,
// so the reverse() below keeps insertion order as the tie-breaker for max.
#[async_trait]
impl PeriodStore for PeriodCatalog {
    async fn find_active(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>> {
        Ok(self
            .of_year(year)
            .filter(|period| period.contains(date))
            .min_by_key(|period| period.start_date)
            .cloned())
    }

    async fn find_latest_ended_before(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>> {
        let ended: Vec<&AcademicPeriod> = self
            .of_year(year)
            .filter(|period| period.end_date < date)
            .collect();
        Ok(ended
            .into_iter()
            .rev()
            .max_by_key(|period| period.end_date)
            .cloned())
    }

    async fn find_earliest_starting_after(
        &self,
        year: &AcademicYear,
        date: NaiveDate,
    ) -> anyhow::Result<Option<AcademicPeriod>> {
        Ok(self
            .of_year(year)
            .filter(|period| period.start_date > date)
            .min_by_key(|period| period.start_date)
            .cloned())
    }

    async fn find_any(&self, year: &AcademicYear) -> anyhow::Result<Option<AcademicPeriod>> {
        Ok(self.of_year(year).next().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn year_2026() -> AcademicYear {
        AcademicYear {
            id: Uuid::new_v4(),
            label: 2026,
            start_date: Some(date(2026, 1, 1)),
            end_date: Some(date(2026, 12, 31)),
            active: true,
        }
    }

    fn period(
        year: &AcademicYear,
        name: &str,
        ordinal: i16,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AcademicPeriod {
        AcademicPeriod {
            id: Uuid::new_v4(),
            academic_year_id: year.id,
            name: name.to_string(),
            ordinal,
            start_date: start,
            end_date: end,
            active: true,
        }
    }

    fn quarterly(year: &AcademicYear) -> PeriodCatalog {
        PeriodCatalog::new(vec![
            period(year, "First", 1, date(2026, 1, 1), date(2026, 3, 30)),
            period(year, "Second", 2, date(2026, 4, 1), date(2026, 6, 30)),
            period(year, "Third", 3, date(2026, 7, 1), date(2026, 9, 30)),
            period(year, "Fourth", 4, date(2026, 10, 1), date(2026, 12, 31)),
        ])
    }

    #[tokio::test]
    async fn date_inside_a_period_resolves_to_it() {
        crate::logging::init_test();
        let year = year_2026();
        let catalog = quarterly(&year);

        let resolved = resolve_period(&catalog, Some(&year), date(2026, 2, 15))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.period.name, "First");
        assert_eq!(resolved.resolution, Resolution::Active);
    }

    #[tokio::test]
    async fn gap_between_periods_resolves_to_last_ended() {
        let year = year_2026();
        let catalog = quarterly(&year);

        let resolved = resolve_period(&catalog, Some(&year), date(2026, 3, 31))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.period.name, "First");
        assert_eq!(resolved.resolution, Resolution::LastEnded);
    }

    #[tokio::test]
    async fn date_before_year_resolves_to_first_upcoming() {
        let year = year_2026();
        let catalog = quarterly(&year);

        let resolved = resolve_period(&catalog, Some(&year), date(2025, 12, 31))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.period.name, "First");
        assert_eq!(resolved.resolution, Resolution::Upcoming);
    }

    #[tokio::test]
    async fn date_after_year_resolves_to_final_period() {
        let year = year_2026();
        let catalog = quarterly(&year);

        let resolved = resolve_period(&catalog, Some(&year), date(2027, 2, 1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.period.name, "Fourth");
        assert_eq!(resolved.resolution, Resolution::LastEnded);
    }

    #[tokio::test]
    async fn year_without_periods_resolves_to_none() {
        let year = year_2026();
        let other_year = AcademicYear {
            id: Uuid::new_v4(),
            label: 2025,
            ..year_2026()
        };
        let catalog = quarterly(&other_year);

        let resolved = resolve_period(&catalog, Some(&year), date(2026, 2, 15))
            .await
            .unwrap();

        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn inverted_period_resolves_through_date_tiers() {
        let year = year_2026();
        let catalog = PeriodCatalog::new(vec![period(
            &year,
            "Broken",
            1,
            date(2026, 6, 30),
            date(2026, 1, 1),
        )]);

        let before = resolve_period(&catalog, Some(&year), date(2026, 3, 1))
            .await
            .unwrap()
            .unwrap();
        let ahead = resolve_period(&catalog, Some(&year), date(2025, 12, 1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(before.resolution, Resolution::LastEnded);
        assert_eq!(ahead.resolution, Resolution::Upcoming);
    }

    #[tokio::test]
    async fn overlapping_periods_prefer_earliest_start() {
        let year = year_2026();
        let catalog = PeriodCatalog::new(vec![
            period(&year, "Late", 2, date(2026, 2, 1), date(2026, 5, 31)),
            period(&year, "Early", 1, date(2026, 1, 1), date(2026, 3, 31)),
        ]);

        let resolved = resolve_period(&catalog, Some(&year), date(2026, 3, 1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.period.name, "Early");
    }

    #[tokio::test]
    async fn equal_end_dates_keep_insertion_order() {
        let year = year_2026();
        let catalog = PeriodCatalog::new(vec![
            period(&year, "A", 1, date(2026, 1, 1), date(2026, 3, 31)),
            period(&year, "B", 2, date(2026, 2, 1), date(2026, 3, 31)),
        ]);

        let resolved = resolve_period(&catalog, Some(&year), date(2026, 4, 15))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.period.name, "A");
    }

    struct CountingStore {
        inner: PeriodCatalog,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PeriodStore for CountingStore {
        async fn find_active(
            &self,
            year: &AcademicYear,
            date: NaiveDate,
        ) -> anyhow::Result<Option<AcademicPeriod>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_active(year, date).await
        }

        async fn find_latest_ended_before(
            &self,
            year: &AcademicYear,
            date: NaiveDate,
        ) -> anyhow::Result<Option<AcademicPeriod>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_latest_ended_before(year, date).await
        }

        async fn find_earliest_starting_after(
            &self,
            year: &AcademicYear,
            date: NaiveDate,
        ) -> anyhow::Result<Option<AcademicPeriod>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_earliest_starting_after(year, date).await
        }

        async fn find_any(&self, year: &AcademicYear) -> anyhow::Result<Option<AcademicPeriod>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_any(year).await
        }
    }

    /// Answers only the year-wide lookup, as a store with undated periods would.
    struct UndatedStore {
        period: AcademicPeriod,
    }

    #[async_trait]
    impl PeriodStore for UndatedStore {
        async fn find_active(
            &self,
            _year: &AcademicYear,
            _date: NaiveDate,
        ) -> anyhow::Result<Option<AcademicPeriod>> {
            Ok(None)
        }

        async fn find_latest_ended_before(
            &self,
            _year: &AcademicYear,
            _date: NaiveDate,
        ) -> anyhow::Result<Option<AcademicPeriod>> {
            Ok(None)
        }

        async fn find_earliest_starting_after(
            &self,
            _year: &AcademicYear,
            _date: NaiveDate,
        ) -> anyhow::Result<Option<AcademicPeriod>> {
            Ok(None)
        }

        async fn find_any(&self, _year: &AcademicYear) -> anyhow::Result<Option<AcademicPeriod>> {
            Ok(Some(self.period.clone()))
        }
    }

    #[tokio::test]
    async fn year_wide_lookup_is_the_last_resort() {
        let year = year_2026();
        let store = UndatedStore {
            period: period(&year, "First", 1, date(2026, 1, 19), date(2026, 3, 27)),
        };

        let resolved = resolve_period(&store, Some(&year), date(2026, 2, 15))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.period.name, "First");
        assert_eq!(resolved.resolution, Resolution::Fallback);
    }

    #[tokio::test]
    async fn missing_year_issues_no_lookups() {
        let year = year_2026();
        let store = CountingStore {
            inner: quarterly(&year),
            calls: AtomicUsize::new(0),
        };

        let resolved = resolve_period(&store, None, date(2026, 2, 15)).await.unwrap();

        assert!(resolved.is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolution_stops_at_first_matching_tier() {
        let year = year_2026();
        let store = CountingStore {
            inner: quarterly(&year),
            calls: AtomicUsize::new(0),
        };

        resolve_period(&store, Some(&year), date(2026, 3, 31)).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn repeated_resolution_is_stable() {
        let year = year_2026();
        let catalog = quarterly(&year);

        let first = resolve_period(&catalog, Some(&year), date(2026, 8, 1)).await.unwrap();
        let second = resolve_period(&catalog, Some(&year), date(2026, 8, 1)).await.unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn overlaps_are_reported_once_per_pair() {
        let year = year_2026();
        let catalog = quarterly(&year);
        assert!(overlapping_periods(catalog.periods()).is_empty());

        let periods = vec![
            period(&year, "First", 1, date(2026, 1, 1), date(2026, 3, 31)),
            period(&year, "Second", 2, date(2026, 3, 31), date(2026, 6, 30)),
            period(&year, "Third", 3, date(2026, 7, 1), date(2026, 9, 30)),
        ];
        let pairs = overlapping_periods(&periods);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.name, "First");
        assert_eq!(pairs[0].1.name, "Second");
    }

    #[test]
    fn calendar_csv_loads_in_file_order() {
        let year = year_2026();
        let path = std::env::temp_dir().join(format!("calendar-{}.csv", Uuid::new_v4()));
        std::fs::write(
            &path,
            "name,ordinal,start_date,end_date\n\
             First,1,2026-01-01,2026-03-30\n\
             Second,2,2026-04-01,2026-06-30\n",
        )
        .unwrap();

        let catalog = PeriodCatalog::from_csv(&path, &year).unwrap();
        std::fs::remove_file(&path).unwrap();

        let names: Vec<&str> = catalog.periods().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert!(catalog.periods().iter().all(|p| p.academic_year_id == year.id));
    }
}
