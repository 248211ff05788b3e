//! Signup chart bucketing for the admin overview.
//!
//! Derived, transient data: the series is recomputed from scratch whenever
//! the user list or the selected granularity changes. Bucket counts are
//! fixed per granularity (7 daily, 4 weekly, 6 monthly) regardless of input,
//! and a timestamp that falls exactly on a bucket boundary belongs to the
//! later bucket.

use chrono::{DateTime, Datelike, Days, Duration, Months, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of buckets per granularity.
pub const DAILY_BUCKETS: usize = 7;
pub const WEEKLY_BUCKETS: usize = 4;
pub const MONTHLY_BUCKETS: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct UnknownGranularity(String);

impl fmt::Display for UnknownGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown granularity: {}", self.0)
    }
}

/// Time range selector for the signup chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// Number of buckets this granularity always produces.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        match self {
            Granularity::Daily => DAILY_BUCKETS,
            Granularity::Weekly => WEEKLY_BUCKETS,
            Granularity::Monthly => MONTHLY_BUCKETS,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(UnknownGranularity(other.to_string())),
        }
    }
}

/// One point of the rendered series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBucket {
    pub label: String,
    pub count: u32,
}

/// Buckets signup timestamps for chart rendering, oldest bucket first.
///
/// Timestamps that fall outside every bucket are ignored.
#[must_use]
pub fn signup_series(
    signups: &[DateTime<Utc>],
    granularity: Granularity,
    now: DateTime<Utc>,
) -> Vec<ChartBucket> {
    match granularity {
        Granularity::Daily => daily_series(signups, now),
        Granularity::Weekly => weekly_series(signups, now),
        Granularity::Monthly => monthly_series(signups, now),
    }
}

/// Seven calendar-day buckets ending today, labeled by weekday abbreviation.
/// A day bucket covers `[midnight, next midnight)`, so a signup exactly at
/// midnight counts toward the day that starts there.
fn daily_series(signups: &[DateTime<Utc>], now: DateTime<Utc>) -> Vec<ChartBucket> {
    let today = now.date_naive();
    (0..DAILY_BUCKETS as u64)
        .rev()
        .map(|back| {
            let day = today - Days::new(back);
            let count = signups
                .iter()
                .filter(|t| t.date_naive() == day)
                .count()
                .try_into()
                .unwrap_or(u32::MAX);
            ChartBucket {
                label: day.format("%a").to_string(),
                count,
            }
        })
        .collect()
}

/// Four trailing 7-day windows ending at `now - 7*i` days. Windows are
/// half-open `[start, end)`, which pins a boundary timestamp to the newer
/// window; the exact instant `now` itself is outside the series.
fn weekly_series(signups: &[DateTime<Utc>], now: DateTime<Utc>) -> Vec<ChartBucket> {
    (0..WEEKLY_BUCKETS as i64)
        .rev()
        .map(|back| {
            let end = now - Duration::days(7 * back);
            let start = end - Duration::days(7);
            let count = signups
                .iter()
                .filter(|t| **t >= start && **t < end)
                .count()
                .try_into()
                .unwrap_or(u32::MAX);
            ChartBucket {
                label: format!("Week {}", WEEKLY_BUCKETS as i64 - back),
                count,
            }
        })
        .collect()
}

/// Six trailing calendar months keyed by `(year, month)`, labeled by month
/// abbreviation.
fn monthly_series(signups: &[DateTime<Utc>], now: DateTime<Utc>) -> Vec<ChartBucket> {
    (0..MONTHLY_BUCKETS as u32)
        .rev()
        .map(|back| {
            let month_start = now
                .date_naive()
                .checked_sub_months(Months::new(back))
                .unwrap_or_else(|| now.date_naive());
            let key = (month_start.year(), month_start.month());
            let count = signups
                .iter()
                .filter(|t| (t.year(), t.month()) == key)
                .count()
                .try_into()
                .unwrap_or(u32::MAX);
            ChartBucket {
                label: month_start.format("%b").to_string(),
                count,
            }
        })
        .collect()
}
