//! Metrics parsed from free-text payment terms such as
//! `"30/60/90 dd boleto"` or `"boleto a vista"`.

use super::binning::classify_term;
use super::schema::{INSTALLMENTS, MAX_TERM, MEAN_TERM, MISSING, TERM_CLASS};
use crate::error::{FeatureError, Result};
use polars::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

const CASH_PAYMENT: &str = "boleto a vista";

static NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(boleto|dd|x|\(|\))").expect("noise pattern is valid"));

/// ASCII digits only; other Unicode decimal digits are not day counts.
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// Installment count, mean term and longest term (days) of a payment plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentTerms {
    pub installments: f64,
    pub mean_days: f64,
    pub max_days: f64,
}

impl PaymentTerms {
    pub const CASH: Self = Self {
        installments: 1.0,
        mean_days: 0.0,
        max_days: 0.0,
    };

    pub const UNPARSED: Self = Self {
        installments: 0.0,
        mean_days: 0.0,
        max_days: 0.0,
    };
}

/// Parses a payment-term descriptor.
///
/// Returns `None` for the `"missing"` sentinel, [`PaymentTerms::CASH`] for
/// upfront payment and [`PaymentTerms::UNPARSED`] when no day counts are
/// present. Matching ignores case.
pub fn extract_payment_terms(text: &str) -> Option<PaymentTerms> {
    let lower = text.to_lowercase();
    if lower == MISSING {
        return None;
    }
    if lower == CASH_PAYMENT {
        return Some(PaymentTerms::CASH);
    }

    let cleaned = NOISE.replace_all(&lower, "");
    let days: Vec<f64> = DIGITS
        .find_iter(&cleaned)
        .map(|m| ascii_number(m.as_str()))
        .collect();

    if days.is_empty() {
        return Some(PaymentTerms::UNPARSED);
    }

    let count = days.len() as f64;
    Some(PaymentTerms {
        installments: count,
        mean_days: days.iter().sum::<f64>() / count,
        max_days: days.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Value of a run of ASCII digits. Runs too long for `u64` still yield an
/// `f64` approximation.
fn ascii_number(digits: &str) -> f64 {
    digits
        .bytes()
        .fold(0.0, |acc, b| acc * 10.0 + f64::from(b - b'0'))
}

/// Adds `n_parcelas`, `prazo_medio`, `prazo_maximo` and
/// `classificacao_prazo` from `forma_pagamento`. Nulls count as missing.
///
/// # Errors
///
/// Fails if `forma_pagamento` is absent or not a string column.
pub fn add_payment_terms(df: &mut DataFrame) -> Result<()> {
    let column = df
        .column("forma_pagamento")
        .map_err(|_| FeatureError::MissingColumn("forma_pagamento".to_owned()))?;

    let terms: Vec<Option<PaymentTerms>> = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.and_then(extract_payment_terms))
        .collect();

    let installments: Vec<Option<f64>> = terms.iter().map(|t| t.map(|t| t.installments)).collect();
    let mean_days: Vec<Option<f64>> = terms.iter().map(|t| t.map(|t| t.mean_days)).collect();
    let max_days: Vec<Option<f64>> = terms.iter().map(|t| t.map(|t| t.max_days)).collect();
    let classes: Vec<&str> = max_days.iter().map(|d| classify_term(*d)).collect();

    df.with_column(Series::new(INSTALLMENTS.into(), installments))?;
    df.with_column(Series::new(MEAN_TERM.into(), mean_days))?;
    df.with_column(Series::new(MAX_TERM.into(), max_days))?;
    df.with_column(Series::new(TERM_CLASS.into(), classes))?;
    Ok(())
}
