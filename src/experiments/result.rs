//! Result model produced by experiments.
//!
//! An [`ExperimentResult`] is a value object: a model name, the metric it was
//! scored with, and the raw samples. It is validated once at construction and
//! never mutated afterwards, so the report formatter can average it without
//! further checks.

use std::fmt;
use std::str::FromStr;

use crate::error::{HarnessError, HarnessResult};

/// Scoring methods an experiment can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    CosineSimilarity = 0,
    Bleu4 = 1,
    Meteor = 2,
    Rouge3 = 3,
}

impl MetricKind {
    /// All metrics, in declaration order.
    pub const ALL: [MetricKind; 4] = [
        MetricKind::CosineSimilarity,
        MetricKind::Bleu4,
        MetricKind::Meteor,
        MetricKind::Rouge3,
    ];

    /// Name used in reports and by Lua scripts.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::CosineSimilarity => "COSINE_SIMILARITY",
            MetricKind::Bleu4 => "BLEU_4",
            MetricKind::Meteor => "METEOR",
            MetricKind::Rouge3 => "ROUGE_3",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| HarnessError::UnknownMetric(s.to_string()))
    }
}

/// Scores of one model on one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentResult {
    model_name: String,
    metric: MetricKind,
    data_points: Vec<f64>,
}

impl ExperimentResult {
    /// Create a result.
    ///
    /// Fails if `model_name` is blank, if `data_points` is empty (the mean
    /// would be undefined), or if any sample is NaN or infinite.
    pub fn new(
        model_name: impl Into<String>,
        metric: MetricKind,
        data_points: Vec<f64>,
    ) -> HarnessResult<Self> {
        let model_name = model_name.into();

        if model_name.trim().is_empty() {
            return Err(HarnessError::InvalidResult(
                "model_name must not be empty".to_string(),
            ));
        }

        if data_points.is_empty() {
            return Err(HarnessError::EmptyDataPoints { model_name, metric });
        }

        if let Some(index) = data_points.iter().position(|v| !v.is_finite()) {
            return Err(HarnessError::NonFiniteDataPoint { model_name, index });
        }

        Ok(Self {
            model_name,
            metric,
            data_points,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn metric(&self) -> MetricKind {
        self.metric
    }

    pub fn data_points(&self) -> &[f64] {
        &self.data_points
    }
}

/// What a single experiment call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentOutcome {
    Single(ExperimentResult),
    Batch(Vec<ExperimentResult>),
}

impl ExperimentOutcome {
    /// Flatten into results, keeping the order of a batch.
    pub fn into_results(self) -> Vec<ExperimentResult> {
        match self {
            ExperimentOutcome::Single(result) => vec![result],
            ExperimentOutcome::Batch(results) => results,
        }
    }
}

impl From<ExperimentResult> for ExperimentOutcome {
    fn from(result: ExperimentResult) -> Self {
        ExperimentOutcome::Single(result)
    }
}

impl From<Vec<ExperimentResult>> for ExperimentOutcome {
    fn from(results: Vec<ExperimentResult>) -> Self {
        ExperimentOutcome::Batch(results)
    }
}
