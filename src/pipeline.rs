//! Serializable pipeline stages built on the feature transform.
//!
//! A scoring pipeline is stored as JSON: an ordered list of
//! [`TransformSpec`]s, each naming a stage type and its parameters. The
//! feature stage registers as `"feature_engineering"` with its
//! [`FeatureConfig`] under the `"config"` parameter.
//!
//! ```no_run
//! use credit_features::pipeline::TransformPipeline;
//! use polars::prelude::*;
//!
//! # fn run(raw: DataFrame) -> anyhow::Result<()> {
//! let pipeline = TransformPipeline::from_json(
//!     r#"{ "transforms": [ { "transform_type": "feature_engineering", "parameters": {} } ] }"#,
//! )?;
//! let features = pipeline.apply(raw.lazy())?.collect()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context as _, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::FeatureConfig;
use crate::features::{FeatureEngineering, Transformer as _};

pub const FEATURE_ENGINEERING: &str = "feature_engineering";

/// Trait for all pipeline stages.
/// Each stage must be:
/// - Serializable (to/from JSON)
/// - Parameterized (all params in `HashMap`)
/// - Deterministic (same input + params = same output)
pub trait Transform: Send + Sync {
    /// Apply this stage to a `LazyFrame`
    fn apply(&self, lf: LazyFrame) -> Result<LazyFrame>;

    /// Get the name of this stage
    fn name(&self) -> &str;

    /// Serialize parameters to JSON-compatible map
    fn parameters(&self) -> HashMap<String, serde_json::Value>;

    /// Create a summary of what this stage does
    fn description(&self) -> String;

    /// Serialize the stage as a [`TransformSpec`] JSON document
    fn to_json(&self) -> Result<String> {
        let spec = TransformSpec {
            transform_type: self.name().to_owned(),
            parameters: self.parameters(),
        };
        serde_json::to_string_pretty(&spec).context("Failed to serialize transform")
    }
}

/// A pipeline of stages applied sequentially
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformPipeline {
    transforms: Vec<TransformSpec>,
}

/// Serializable specification of a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSpec {
    pub transform_type: String,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl TransformPipeline {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(transforms: Vec<TransformSpec>) -> Self {
        Self { transforms }
    }

    pub fn add(&mut self, spec: TransformSpec) {
        self.transforms.push(spec);
    }

    /// Apply all stages in sequence
    ///
    /// # Errors
    ///
    /// Fails on an unknown stage type, bad parameters or a failing stage.
    pub fn apply(&self, lf: LazyFrame) -> Result<LazyFrame> {
        let mut result = lf;

        for (idx, spec) in self.transforms.iter().enumerate() {
            let transform = instantiate_transform(spec).with_context(|| {
                format!(
                    "Failed to instantiate transform {}: {}",
                    idx, spec.transform_type
                )
            })?;

            tracing::debug!(idx, stage = transform.name(), "{}", transform.description());
            result = transform.apply(result).with_context(|| {
                format!("Failed to apply transform {}: {}", idx, spec.transform_type)
            })?;
        }

        Ok(result)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize pipeline")
    }

    /// # Errors
    ///
    /// Returns an error when the JSON does not describe a pipeline.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize pipeline")
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformSpec> {
        self.transforms.iter()
    }
}

/// Instantiate a concrete stage from a spec
fn instantiate_transform(spec: &TransformSpec) -> Result<Box<dyn Transform>> {
    match spec.transform_type.as_str() {
        FEATURE_ENGINEERING => Ok(Box::new(FeatureEngineeringTransform::from_parameters(
            &spec.parameters,
        )?)),
        _ => Err(anyhow::anyhow!(
            "Unknown transform type: {}",
            spec.transform_type
        )),
    }
}

/// Pipeline stage wrapping [`FeatureEngineering`]
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineeringTransform {
    stage: FeatureEngineering,
}

impl FeatureEngineeringTransform {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            stage: FeatureEngineering::new(config),
        }
    }

    /// Builds the stage from spec parameters; a missing `"config"` means
    /// the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when `"config"` is not a valid [`FeatureConfig`].
    pub fn from_parameters(params: &HashMap<String, serde_json::Value>) -> Result<Self> {
        let config = match params.get("config") {
            Some(value) => serde_json::from_value(value.clone())
                .context("Failed to deserialize feature config")?,
            None => FeatureConfig::default(),
        };
        Ok(Self::new(config))
    }

    pub fn to_spec(&self) -> TransformSpec {
        TransformSpec {
            transform_type: self.name().to_owned(),
            parameters: self.parameters(),
        }
    }
}

impl Transform for FeatureEngineeringTransform {
    fn apply(&self, lf: LazyFrame) -> Result<LazyFrame> {
        let df = lf.collect().context("Failed to collect stage input")?;
        let features = self.stage.transform(&df)?;
        Ok(features.lazy())
    }

    fn name(&self) -> &'static str {
        FEATURE_ENGINEERING
    }

    fn parameters(&self) -> HashMap<String, serde_json::Value> {
        let mut params = HashMap::new();
        params.insert(
            "config".to_owned(),
            serde_json::to_value(self.stage.config()).unwrap_or(serde_json::Value::Null),
        );
        params
    }

    fn description(&self) -> String {
        match &self.stage.config().unmapped_society_group {
            Some(group) => format!("Derive credit features (unmapped society types -> {group})"),
            None => "Derive credit features".to_owned(),
        }
    }
}
