//! Ordered bucket encodings: inactivity-day ranges, payment-term classes
//! and the month-to-quarter grouping.

use super::schema::{IOI_3M_CAT, IOI_36M_CAT, QUARTER};
use crate::error::{FeatureError, Result};
use polars::prelude::*;

/// Left-open, right-closed interval `(lower, upper]` with its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    pub lower: i64,
    pub upper: i64,
    pub label: &'static str,
}

const fn bin(lower: i64, upper: i64, label: &'static str) -> Bin {
    Bin {
        lower,
        upper,
        label,
    }
}

pub const IOI_36M_BINS: [Bin; 4] = [
    bin(0, 20, "<=20"),
    bin(20, 38, "21-38"),
    bin(38, 70, "39-70"),
    bin(70, 9999, ">70"),
];

pub const IOI_3M_BINS: [Bin; 4] = [
    bin(0, 10, "<=10"),
    bin(10, 15, "11-15"),
    bin(15, 20, "16-20"),
    bin(20, 999, ">20"),
];

/// Label of the bin containing `value`, or `None` outside every bin
/// (including the left edge of the first one).
pub fn bucket(value: i64, bins: &[Bin]) -> Option<&'static str> {
    bins.iter()
        .find(|b| value > b.lower && value <= b.upper)
        .map(|b| b.label)
}

/// Upper bounds (inclusive) for the payment-term classes.
const TERM_CLASSES: [(f64, &str); 3] = [(30.0, "curto"), (90.0, "medio"), (180.0, "longo")];

/// Classifies the longest payment term in days.
pub fn classify_term(max_days: Option<f64>) -> &'static str {
    match max_days {
        Some(days) if !days.is_nan() => TERM_CLASSES
            .iter()
            .find(|(upper, _)| days <= *upper)
            .map_or("muito_longo", |&(_, class)| class),
        _ => "missing",
    }
}

/// Months 1-4, 5-6, 7-9 and 10-12 map to "1".."4". The uneven split is
/// what the scoring models expect, not calendar quarters.
pub fn group_month(month: i64) -> &'static str {
    match month {
        ..=4 => "1",
        5..=6 => "2",
        7..=9 => "3",
        _ => "4",
    }
}

fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df
        .column(name)
        .map_err(|_| FeatureError::MissingColumn(name.to_owned()))?;
    Ok(column.as_materialized_series().i64()?.into_iter().collect())
}

/// Adds `ioi_36m_cat` and `ioi_3_cat` from the normalized day counts.
///
/// # Errors
///
/// Fails if the day counts are absent or not yet cast to `Int64`.
pub fn add_ioi_buckets(df: &mut DataFrame) -> Result<()> {
    for (source, target, bins) in [
        ("ioi_36months", IOI_36M_CAT, &IOI_36M_BINS),
        ("ioi_3months", IOI_3M_CAT, &IOI_3M_BINS),
    ] {
        let labels: Vec<Option<&str>> = int_values(df, source)?
            .into_iter()
            .map(|v| v.and_then(|v| bucket(v, bins)))
            .collect();
        df.with_column(Series::new(target.into(), labels))?;
    }
    Ok(())
}

/// Adds `trimestre` from the normalized month.
///
/// # Errors
///
/// Fails if `month` is absent or not yet cast to `Int64`.
pub fn add_quarters(df: &mut DataFrame) -> Result<()> {
    let months = int_values(df, "month")?;

    let out_of_range = months
        .iter()
        .flatten()
        .filter(|m| !(1..=12).contains(*m))
        .count();
    if out_of_range > 0 {
        tracing::warn!(out_of_range, "Months outside 1-12 grouped by nearest edge");
    }

    let quarters: Vec<Option<&str>> = months.into_iter().map(|m| m.map(group_month)).collect();
    df.with_column(Series::new(QUARTER.into(), quarters))?;
    Ok(())
}
