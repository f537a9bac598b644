//! Turns the entry log into day-level reports. Both operations are pure functions of the
//! entries they are given, rerunning them over unchanged data yields identical values.

pub mod writer;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::{
    daemon::storage::{category::Category, entities::EntryEntity},
    utils::percentage::{count_percentage, Percentage},
};

/// Signals "insufficient data" to the rendering side. Deliberately not a crash and not a zeroed
/// report, the caller decides how to phrase it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("no entries recorded for {0}")]
    NoData(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub count: usize,
    pub percentage: Percentage,
}

/// How one day splits across the category set, in category presentation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub shares: Vec<CategoryShare>,
    pub total_minutes: u64,
}

/// Counts occurrences per category among the entries of one calendar day. Days without entries
/// produce [ReportError::NoData] instead of a division by zero.
pub fn daily_report(date: NaiveDate, entries: &[EntryEntity]) -> Result<DailyReport, ReportError> {
    if entries.is_empty() {
        return Err(ReportError::NoData(date));
    }

    let total = entries.len();
    let shares = Category::ALL
        .iter()
        .map(|&category| {
            let count = entries
                .iter()
                .filter(|entry| entry.category == category)
                .count();
            CategoryShare {
                category,
                count,
                percentage: count_percentage(count, total),
            }
        })
        .collect();

    Ok(DailyReport {
        date,
        shares,
        total_minutes: entries
            .iter()
            .map(|entry| entry.duration_minutes as u64)
            .sum(),
    })
}

/// Relative change of the productive score between two days. A zero baseline makes a percentage
/// change meaningless, so it's flagged instead of being coerced to a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Delta {
    Percent(f64),
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub date_a: NaiveDate,
    pub date_b: NaiveDate,
    pub productive_a: usize,
    pub productive_b: usize,
    pub delta: Delta,
}

/// Number of entries filed under a productive category.
pub fn productive_score(entries: &[EntryEntity]) -> usize {
    entries
        .iter()
        .filter(|entry| entry.category.is_productive())
        .count()
}

/// Compares the productive scores of two days, `a` relative to baseline `b`. Either day being
/// empty is [ReportError::NoData]; a zero baseline yields [Delta::Undefined].
pub fn compare(
    (date_a, entries_a): (NaiveDate, &[EntryEntity]),
    (date_b, entries_b): (NaiveDate, &[EntryEntity]),
) -> Result<Comparison, ReportError> {
    if entries_a.is_empty() {
        return Err(ReportError::NoData(date_a));
    }
    if entries_b.is_empty() {
        return Err(ReportError::NoData(date_b));
    }

    let productive_a = productive_score(entries_a);
    let productive_b = productive_score(entries_b);
    let delta = if productive_b == 0 {
        Delta::Undefined
    } else {
        Delta::Percent(
            (productive_a as f64 - productive_b as f64) / productive_b as f64 * 100.,
        )
    };

    Ok(Comparison {
        date_a,
        date_b,
        productive_a,
        productive_b,
        delta,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::daemon::storage::{category::Category, entities::EntryEntity};

    use super::{compare, daily_report, Delta, ReportError};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn entries(categories: &[Category]) -> Vec<EntryEntity> {
        categories
            .iter()
            .enumerate()
            .map(|(index, &category)| {
                let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
                    + chrono::Duration::minutes(15 * index as i64);
                EntryEntity::new(timestamp, category, String::new())
            })
            .collect()
    }

    #[test]
    fn test_daily_report_percentages() {
        let day = entries(&[
            Category::Working,
            Category::Working,
            Category::Chilling,
            Category::Gaming,
        ]);
        let report = daily_report(date(), &day).unwrap();

        let share = |category| {
            report
                .shares
                .iter()
                .find(|s| s.category == category)
                .unwrap()
        };
        assert_eq!(*share(Category::Working).percentage, 50.);
        assert_eq!(*share(Category::Chilling).percentage, 25.);
        assert_eq!(*share(Category::Gaming).percentage, 25.);
        assert_eq!(*share(Category::Business).percentage, 0.);
        assert_eq!(report.total_minutes, 60);
    }

    #[test]
    fn test_daily_report_is_idempotent() {
        let day = entries(&[Category::Working, Category::Academics]);
        assert_eq!(
            daily_report(date(), &day).unwrap(),
            daily_report(date(), &day).unwrap()
        );
    }

    #[test]
    fn test_empty_day_is_no_data() {
        assert_eq!(
            daily_report(date(), &[]).unwrap_err(),
            ReportError::NoData(date())
        );
    }

    #[test]
    fn test_compare_with_baseline() {
        let today = entries(&[Category::Working, Category::Academics, Category::Business]);
        let yesterday = entries(&[Category::Working, Category::Working, Category::Gaming]);

        let comparison = compare(
            (date(), &today),
            (date().pred_opt().unwrap(), &yesterday),
        )
        .unwrap();

        assert_eq!(comparison.productive_a, 3);
        assert_eq!(comparison.productive_b, 2);
        assert_eq!(comparison.delta, Delta::Percent(50.));
    }

    #[test]
    fn test_zero_baseline_is_undefined_not_zero() {
        let today = entries(&[Category::Working, Category::Working, Category::Working]);
        let yesterday = entries(&[Category::Chilling, Category::Gaming]);

        let comparison = compare(
            (date(), &today),
            (date().pred_opt().unwrap(), &yesterday),
        )
        .unwrap();

        assert_eq!(comparison.productive_b, 0);
        assert_eq!(comparison.delta, Delta::Undefined);
    }

    #[test]
    fn test_compare_without_entries_is_no_data() {
        let today = entries(&[Category::Working]);
        let empty_date = date().pred_opt().unwrap();

        assert_eq!(
            compare((date(), &today), (empty_date, &[])).unwrap_err(),
            ReportError::NoData(empty_date)
        );
    }
}
