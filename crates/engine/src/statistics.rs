//! Income/expense series for charts.
//!
//! Transactions are bucketed by calendar period in the caller's timezone. The
//! series is dense: every period of the range is present, with zero totals
//! when nothing happened.
//!
//! - `Week`: the last 7 days, one bucket per day.
//! - `Month`: the last 12 months, one bucket per month.
//! - `Year`: one bucket per year, from the year of the oldest transaction to
//!   the current one.

use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine, Transaction, TransactionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Week,
    Month,
    Year,
}

impl FromStr for Granularity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            other => Err(EngineError::Validation(format!(
                "invalid granularity: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBucket {
    pub label: String,
    /// First local day of the period.
    pub start: NaiveDate,
    pub income: Money,
    pub expense: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub granularity: Granularity,
    pub buckets: Vec<StatBucket>,
    /// Transactions the buckets were computed from, newest first.
    pub transactions: Vec<Transaction>,
}

fn out_of_range() -> EngineError {
    EngineError::Validation("date out of range".to_string())
}

fn first_of_month(date: NaiveDate) -> ResultEngine<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).ok_or_else(out_of_range)
}

fn first_of_year(year: i32) -> ResultEngine<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(out_of_range)
}

fn next_start(granularity: Granularity, start: NaiveDate) -> ResultEngine<NaiveDate> {
    match granularity {
        Granularity::Week => start.checked_add_days(Days::new(1)),
        Granularity::Month => start.checked_add_months(Months::new(1)),
        Granularity::Year => start.checked_add_months(Months::new(12)),
    }
    .ok_or_else(out_of_range)
}

fn label(granularity: Granularity, start: NaiveDate) -> String {
    match granularity {
        Granularity::Week => start.format("%a").to_string(),
        Granularity::Month => start.format("%b %y").to_string(),
        Granularity::Year => start.format("%Y").to_string(),
    }
}

/// Start dates of every bucket plus the exclusive end of the last one.
///
/// `earliest` only matters for [`Granularity::Year`].
pub fn bucket_bounds(
    granularity: Granularity,
    today: NaiveDate,
    earliest: Option<NaiveDate>,
) -> ResultEngine<(Vec<NaiveDate>, NaiveDate)> {
    let starts = match granularity {
        Granularity::Week => (0..7u64)
            .rev()
            .map(|back| today.checked_sub_days(Days::new(back)).ok_or_else(out_of_range))
            .collect::<ResultEngine<Vec<_>>>()?,
        Granularity::Month => {
            let current = first_of_month(today)?;
            (0..12u32)
                .rev()
                .map(|back| {
                    current
                        .checked_sub_months(Months::new(back))
                        .ok_or_else(out_of_range)
                })
                .collect::<ResultEngine<Vec<_>>>()?
        }
        Granularity::Year => {
            let current = today.year();
            let first = earliest.map_or(current, |d| d.year()).min(current);
            (first..=current)
                .map(first_of_year)
                .collect::<ResultEngine<Vec<_>>>()?
        }
    };

    let last = *starts.last().ok_or_else(out_of_range)?;
    Ok((starts, next_start(granularity, last)?))
}

/// UTC instant of local midnight on `date`.
///
/// When midnight does not exist locally (a DST jump), the first instant of
/// the day an hour later is used.
pub fn local_midnight_utc<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight: NaiveDateTime = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
        .map_or_else(|| Utc.from_utc_datetime(&midnight), |dt| dt.with_timezone(&Utc))
}

/// Buckets `transactions` into a dense series ending at `today` (local date).
///
/// Transactions outside the range are ignored.
pub fn aggregate<Tz: TimeZone>(
    granularity: Granularity,
    transactions: &[Transaction],
    tz: &Tz,
    today: NaiveDate,
) -> ResultEngine<Vec<StatBucket>> {
    let local_day = |tx: &Transaction| tx.date.with_timezone(tz).date_naive();
    let earliest = transactions.iter().map(local_day).min();
    let (starts, end) = bucket_bounds(granularity, today, earliest)?;

    let mut buckets: Vec<StatBucket> = starts
        .iter()
        .map(|start| StatBucket {
            label: label(granularity, *start),
            start: *start,
            income: Money::ZERO,
            expense: Money::ZERO,
        })
        .collect();

    for tx in transactions {
        let day = local_day(tx);
        if day >= end {
            continue;
        }
        let Some(index) = starts.partition_point(|start| *start <= day).checked_sub(1) else {
            continue;
        };
        let bucket = &mut buckets[index];
        let total = match tx.kind {
            TransactionKind::Income => &mut bucket.income,
            TransactionKind::Expense => &mut bucket.expense,
        };
        *total = total
            .checked_add(tx.amount)
            .ok_or_else(|| EngineError::Validation("amount too large".to_string()))?;
    }

    Ok(buckets)
}
