use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::rank::sort_by_score_desc;
use crate::weights::CustomWeights;

/// One row of a precomputed rankings file.
///
/// `breakdown` holds finished 0-10 category sub-scores, so re-weighting only
/// needs a weighted sum and never touches raw metrics.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PrecomputedEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub rank: Option<usize>,
    #[serde(default)]
    pub breakdown: BTreeMap<String, Option<f64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PrecomputedEntry {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            overall_score: 0.0,
            rank: None,
            breakdown: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    pub fn with_subscore(mut self, category_id: &str, score: f64) -> Self {
        self.breakdown.insert(category_id.to_string(), Some(score));
        self
    }

    /// Sub-score for a category; missing or null counts as 0.
    pub fn subscore(&self, category_id: &str) -> f64 {
        self.breakdown
            .get(category_id)
            .copied()
            .flatten()
            .unwrap_or(0.0)
    }
}

/// Re-weight precomputed rankings and re-sort them.
///
/// The new overall score is `sum(subscore[c] * weight[c])` over the provided
/// weights. Returns copies with `overall_score` replaced and ranks reassigned
/// from 1; ties keep input order.
pub fn recalculate_rankings(
    entries: &[PrecomputedEntry],
    weights: &CustomWeights,
) -> Vec<PrecomputedEntry> {
    let mut recalculated: Vec<PrecomputedEntry> = entries
        .iter()
        .map(|entry| {
            let overall_score = weights
                .weights
                .iter()
                .filter_map(|(id, weight)| weight.map(|w| entry.subscore(id) * w))
                .sum();
            PrecomputedEntry {
                overall_score,
                ..entry.clone()
            }
        })
        .collect();

    sort_by_score_desc(&mut recalculated, |e| e.overall_score);

    for (index, entry) in recalculated.iter_mut().enumerate() {
        entry.rank = Some(index + 1);
    }
    recalculated
}
