//! # Credit Features - Feature Engineering for Credit-Risk Scoring
//!
//! Turns a raw applicant table (payment behaviour, legal records, amounts
//! and registration details) into the feature table the scoring models
//! consume. All work is done on Polars `DataFrame`s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use credit_features::features::{FeatureEngineering, Transformer as _};
//! use polars::prelude::*;
//!
//! # fn example(raw: DataFrame) -> anyhow::Result<()> {
//! let (features, report) = FeatureEngineering::default().transform_with_report(&raw)?;
//! println!("{}", report.summary());
//! println!("{} feature columns", features.width());
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`features`]: The feature-engineering stage and its rule tables
//!   - [`features::schema`]: Input and output column contracts
//!   - [`features::payment`]: Payment-term parsing
//!   - [`features::categories`]: Society and activity groupings
//! - [`pipeline`]: Serializable pipeline stages
//! - [`config`]: JSON configuration
//! - [`logging`]: Tracing subscriber setup
//! - [`error`]: Error types and handling utilities

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod pipeline;
