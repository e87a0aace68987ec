use serde::Serialize;
use tracing::{debug, warn};

use super::entity::Entity;
use super::error::{ScoringError, SchemaError};
use super::normalize::normalize;
use super::rank::{rank_scored, RankedEntity};
use super::schema::{Domain, MetricDescriptor, Schema, ScoringCategory};
use super::validation::{schema_warnings, validate_schema};
use crate::weights::CustomWeights;

/// Public scores are on a 0-10 scale; categories score on 0-1 internally.
pub const SCORE_SCALE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub id: String,
    pub name: String,
    /// `None` when the entity has no value for this metric
    pub raw_value: Option<f64>,
    pub normalized: Option<f64>,
    /// Normalized value on the 0-10 display scale
    pub score: Option<f64>,
    pub weight: f64,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub id: String,
    pub name: String,
    pub score: f64,
    pub weight: f64,
    pub weighted_score: f64,
    pub metrics: Vec<MetricScore>,
    /// Ids of metrics skipped because the entity had no value
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub overall: f64,
    pub categories: Vec<CategoryScore>,
}

impl ScoreBreakdown {
    /// True when at least one metric was skipped for missing data.
    pub fn incomplete(&self) -> bool {
        self.categories.iter().any(|c| !c.missing.is_empty())
    }

    pub fn category(&self, id: &str) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// Weighted scoring over a fixed, validated schema.
///
/// The engine holds no per-call state: every method takes its inputs by
/// reference and returns fresh values, so one engine can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    schema: Schema,
}

impl ScoringEngine {
    /// Validate `schema` and build an engine over it.
    pub fn new(schema: Schema) -> Result<Self, SchemaError> {
        validate_schema(&schema).map_err(SchemaError::Invalid)?;
        for warning in schema_warnings(&schema) {
            warn!("{}", warning);
        }
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn domain(&self, domain_id: &str) -> Result<&Domain, ScoringError> {
        self.schema
            .domain(domain_id)
            .ok_or_else(|| ScoringError::SchemaLookup {
                domain: domain_id.to_string(),
            })
    }

    /// Score one entity against a domain.
    ///
    /// Each category's weight comes from `weights` when it provides one and
    /// from the schema otherwise. `overall` is the weighted sum scaled to 0-10.
    pub fn score_entity(
        &self,
        entity: &Entity,
        domain_id: &str,
        weights: Option<&CustomWeights>,
    ) -> Result<ScoreBreakdown, ScoringError> {
        let domain = self.domain(domain_id)?;
        Ok(score_domain(entity, domain, weights))
    }

    /// Score every entity and sort them by descending score.
    ///
    /// Entities with equal scores keep their input order. Inputs are cloned,
    /// never modified.
    pub fn rank(
        &self,
        entities: &[Entity],
        domain_id: &str,
        weights: Option<&CustomWeights>,
    ) -> Result<Vec<RankedEntity>, ScoringError> {
        let domain = self.domain(domain_id)?;
        debug!(domain = domain_id, entities = entities.len(), "ranking");

        let scored = entities
            .iter()
            .map(|entity| (entity.clone(), score_domain(entity, domain, weights)))
            .collect();
        Ok(rank_scored(scored))
    }

    /// Like [`rank`](Self::rank), truncated to the first `n` entries.
    pub fn top_n(
        &self,
        entities: &[Entity],
        domain_id: &str,
        n: usize,
        weights: Option<&CustomWeights>,
    ) -> Result<Vec<RankedEntity>, ScoringError> {
        let mut ranked = self.rank(entities, domain_id, weights)?;
        ranked.truncate(n);
        Ok(ranked)
    }
}

fn score_domain(entity: &Entity, domain: &Domain, weights: Option<&CustomWeights>) -> ScoreBreakdown {
    let mut total = 0.0;
    let mut categories = Vec::with_capacity(domain.scoring_categories.len());

    for category in &domain.scoring_categories {
        let weight = weights.map_or(category.weight, |w| w.category_weight(category));
        let result = category_breakdown(entity, category, weights, weight);
        total += result.weighted_score;
        categories.push(result);
    }

    ScoreBreakdown {
        overall: total * SCORE_SCALE,
        categories,
    }
}

fn category_breakdown(
    entity: &Entity,
    category: &ScoringCategory,
    weights: Option<&CustomWeights>,
    category_weight: f64,
) -> CategoryScore {
    let mut score = 0.0;
    let mut metrics = Vec::with_capacity(category.metrics.len());
    let mut missing = Vec::new();

    for metric in &category.metrics {
        let metric_weight = weights.map_or(metric.weight, |w| w.metric_weight(metric));
        let result = metric_breakdown(entity, metric, metric_weight);
        match result.normalized {
            Some(normalized) => score += normalized * metric_weight,
            None => missing.push(metric.id.clone()),
        }
        metrics.push(result);
    }

    CategoryScore {
        id: category.id.clone(),
        name: category.name.clone(),
        score,
        weight: category_weight,
        weighted_score: score * category_weight,
        metrics,
        missing,
    }
}

fn metric_breakdown(entity: &Entity, metric: &MetricDescriptor, weight: f64) -> MetricScore {
    let raw_value = entity.metric(&metric.id);
    if raw_value.is_none() {
        warn!(entity = %entity.id, metric = %metric.id, "missing metric value, skipping");
    }
    let normalized = raw_value.map(|raw| normalize(raw, metric));

    MetricScore {
        id: metric.id.clone(),
        name: metric.name.clone(),
        raw_value,
        normalized,
        score: normalized.map(|n| n * SCORE_SCALE),
        weight,
        unit: metric.unit.clone(),
    }
}

/// Weighted sum of an entity's normalized metrics for one category.
///
/// Metrics the entity has no value for are skipped (not counted as zero), so
/// the result is only comparable between entities with the same coverage.
pub fn score_category(entity: &Entity, category: &ScoringCategory) -> f64 {
    category_breakdown(entity, category, None, category.weight).score
}
