//! The credit-risk feature-engineering stage.
//!
//! [`FeatureEngineering`] turns a raw record table into the model feature
//! table in one fixed sequence:
//!
//! 1. Validate the input columns and dtypes ([`schema::validate`])
//! 2. Cast day counts, counts and date parts to integers
//! 3. Indicator flags, `log1p_` amounts, the inactivity ratio, missing
//!    flags and settlement proportions (polars expressions)
//! 4. Inactivity buckets, society groups, payment-term metrics, activity
//!    groups and quarters (row-wise rule tables)
//! 5. Drop the superseded raw columns and order the output
//!
//! The stage is stateless: [`Transformer::fit`] does nothing. It is also
//! one-shot, since the output lacks the raw columns a second pass needs.
//!
//! ```no_run
//! use credit_features::features::{FeatureEngineering, Transformer as _};
//! use polars::prelude::*;
//!
//! # fn run(raw: DataFrame) -> credit_features::error::Result<()> {
//! let mut stage = FeatureEngineering::default();
//! let features = stage.fit_transform(&raw)?;
//! println!("{} feature columns", features.width());
//! # Ok(())
//! # }
//! ```

pub mod binning;
pub mod categories;
pub mod numeric;
pub mod payment;
pub mod schema;


use crate::config::FeatureConfig;
use crate::error::{FeatureError, Result};
use polars::prelude::*;
use std::time::{Duration, Instant};

/// Fit/transform contract shared by pipeline stages.
pub trait Transformer {
    /// Learns state from `df`.
    ///
    /// # Errors
    ///
    /// Implementations that learn state may reject unusable input.
    fn fit(&mut self, df: &DataFrame) -> Result<&mut Self>;

    /// Applies the stage to a copy of `df`.
    ///
    /// # Errors
    ///
    /// Returns the first column, dtype or value problem encountered.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;

    /// [`Self::fit`] followed by [`Self::transform`].
    ///
    /// # Errors
    ///
    /// Propagates errors from either step.
    fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame>
    where
        Self: Sized,
    {
        self.fit(df)?.transform(df)
    }
}

/// Summary of one transform call.
#[derive(Debug, Clone)]
pub struct TransformReport {
    pub rows: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// Non-null society types without a group.
    pub unmapped_society_types: usize,
    pub duration: Duration,
}

impl TransformReport {
    pub fn summary(&self) -> String {
        format!(
            "Feature engineering completed: {} rows, {} → {} columns, {} unmapped society types, {:.3}s",
            self.rows,
            self.columns_before,
            self.columns_after,
            self.unmapped_society_types,
            self.duration.as_secs_f64()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureEngineering {
    config: FeatureConfig,
}

impl FeatureEngineering {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Output column names for an input with `input_columns`, without
    /// running the transform.
    pub fn output_columns<S: AsRef<str>>(&self, input_columns: &[S]) -> Vec<String> {
        schema::output_columns(input_columns)
    }

    /// Runs the transform and reports what it did.
    ///
    /// # Errors
    ///
    /// - [`FeatureError::MissingColumn`] if a required column is absent,
    ///   which includes feeding the stage its own output
    /// - [`FeatureError::InvalidType`] if a column has an unusable dtype
    /// - [`FeatureError::NonFiniteValue`] if an integer column holds a
    ///   null, NaN or infinite value
    /// - [`FeatureError::NullValue`] if `atividade_principal` holds a null
    pub fn transform_with_report(&self, df: &DataFrame) -> Result<(DataFrame, TransformReport)> {
        let start = Instant::now();
        let columns_before = df.width();
        tracing::info!(rows = df.height(), columns = columns_before, "Feature engineering started");

        schema::validate(df)?;

        let mut out = df.clone();
        numeric::normalize_types(&mut out)?;
        tracing::debug!("Integer columns normalized");

        let mut out = out.lazy().with_columns(numeric::derived_exprs()).collect()?;
        tracing::debug!("Expression features added");

        binning::add_ioi_buckets(&mut out)?;
        let unmapped_society_types = categories::add_society_groups(
            &mut out,
            self.config.unmapped_society_group.as_deref(),
        )?;
        payment::add_payment_terms(&mut out)?;
        categories::add_activity_groups(&mut out)?;
        binning::add_quarters(&mut out)?;
        tracing::debug!("Row-wise features added");

        let out = prune(&out, &self.output_columns(&df.get_column_names()))?;

        let report = TransformReport {
            rows: out.height(),
            columns_before,
            columns_after: out.width(),
            unmapped_society_types,
            duration: start.elapsed(),
        };
        tracing::info!("{}", report.summary());

        Ok((out, report))
    }
}

impl Transformer for FeatureEngineering {
    fn fit(&mut self, _df: &DataFrame) -> Result<&mut Self> {
        Ok(self)
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.transform_with_report(df).map(|(out, _)| out)
    }
}

/// Drops the superseded raw columns and lays the rest out in `order`.
fn prune(df: &DataFrame, order: &[String]) -> Result<DataFrame> {
    for name in schema::DROPPED_COLUMNS {
        if df.column(name).is_err() {
            return Err(FeatureError::MissingColumn(name.to_owned()));
        }
    }
    Ok(df.select(order.iter().map(String::as_str))?)
}
