use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::sliders::SliderSet;
use crate::scoring::{MetricDescriptor, ScoringCategory, WeightScope};

/// User-supplied weight overrides for one scoring call.
///
/// A `None` (JSON `null`) or absent entry falls back to the schema default.
/// An explicit `0.0` is honoured and excludes the category or metric.
///
/// In [`WeightScope::Metric`] the provided weights are scaled by their total,
/// so integer percentages can be passed as-is.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CustomWeights {
    #[serde(default)]
    pub scope: WeightScope,
    #[serde(default)]
    pub weights: BTreeMap<String, Option<f64>>,
}

impl CustomWeights {
    /// Empty overrides for scoring categories.
    pub fn categories() -> Self {
        Self {
            scope: WeightScope::Category,
            weights: BTreeMap::new(),
        }
    }

    /// Empty overrides for individual metrics.
    pub fn metrics() -> Self {
        Self {
            scope: WeightScope::Metric,
            weights: BTreeMap::new(),
        }
    }

    pub fn with(mut self, id: &str, weight: f64) -> Self {
        self.weights.insert(id.to_string(), Some(weight));
        self
    }

    pub fn set(&mut self, id: &str, weight: Option<f64>) {
        self.weights.insert(id.to_string(), weight);
    }

    /// Override for `id`, if one is set and not null.
    pub fn get(&self, id: &str) -> Option<f64> {
        self.weights.get(id).copied().flatten()
    }

    /// Sum of all non-null overrides.
    pub fn total(&self) -> f64 {
        self.weights.values().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.values().all(Option::is_none)
    }

    /// Effective weight for a scoring category.
    pub fn category_weight(&self, category: &ScoringCategory) -> f64 {
        match self.scope {
            WeightScope::Category => self.get(&category.id).unwrap_or(category.weight),
            WeightScope::Metric => category.weight,
        }
    }

    /// Effective weight for a metric within its category.
    pub fn metric_weight(&self, metric: &MetricDescriptor) -> f64 {
        match self.scope {
            WeightScope::Category => metric.weight,
            WeightScope::Metric => match self.get(&metric.id) {
                Some(weight) => {
                    let total = self.total();
                    if total > 0.0 {
                        weight / total
                    } else {
                        weight
                    }
                }
                None => metric.weight,
            },
        }
    }

    /// Convert slider percentages into scoring weights.
    ///
    /// Category sliders become fractions (`percent / 100`), metric sliders keep
    /// their raw percentages and are scaled by their total at scoring time.
    pub fn from_sliders(sliders: &SliderSet, scope: WeightScope) -> Self {
        let weights = sliders
            .iter()
            .map(|slider| {
                let weight = match scope {
                    WeightScope::Category => f64::from(slider.value) / 100.0,
                    WeightScope::Metric => f64::from(slider.value),
                };
                (slider.id.clone(), Some(weight))
            })
            .collect();
        Self { scope, weights }
    }
}
