use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ranking schema.
///
/// Maps a ranking domain id (e.g. `localities`, `restaurants`) to the scoring
/// categories that make up its overall score. Accepts both the YAML config
/// layout (`domains:` / `scoring_categories:`) and the website's JSON layout
/// (`categories:` / `scoringCategories:`).
///
/// Example YAML:
/// ```yaml
/// domains:
///   localities:
///     name: Localities
///     scoring_categories:
///       - id: accessibility
///         name: Accessibility
///         weight: 1.0
///         metrics:
///           - { id: technopark_time, name: Technopark, min: 0, max: 60, invert_scale: true, weight: 1.0, unit: min }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Schema {
    #[serde(alias = "categories")]
    pub domains: BTreeMap<String, Domain>,
}

impl Schema {
    pub fn new(domains: BTreeMap<String, Domain>) -> Self {
        Self { domains }
    }

    pub fn domain(&self, id: &str) -> Option<&Domain> {
        self.domains.get(id)
    }

    pub fn domain_ids(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }
}

/// Whether user weights for a domain target its categories or its metrics.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightScope {
    /// Sliders re-weight scoring categories (locality customization).
    #[default]
    Category,
    /// Sliders re-weight individual metrics (restaurant/cafe/hotel customization).
    Metric,
}

/// One ranking domain: a display name and its ordered scoring categories.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Domain {
    #[serde(default)]
    pub name: Option<String>,

    /// What user-adjustable weights apply to for this domain
    #[serde(default, alias = "weightScope")]
    pub weight_scope: WeightScope,

    /// Name of a derived-metric formula registry to apply before scoring (e.g. "dining")
    #[serde(default)]
    pub formulas: Option<String>,

    #[serde(alias = "scoringCategories")]
    pub scoring_categories: Vec<ScoringCategory>,
}

impl Domain {
    pub fn category(&self, id: &str) -> Option<&ScoringCategory> {
        self.scoring_categories.iter().find(|c| c.id == id)
    }

    /// All metrics of the domain, in declared category then metric order.
    pub fn metrics(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.scoring_categories.iter().flat_map(|c| c.metrics.iter())
    }

    pub fn metric(&self, id: &str) -> Option<&MetricDescriptor> {
        self.metrics().find(|m| m.id == id)
    }
}

/// A named group of metrics contributing one sub-score (e.g. Accessibility).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoringCategory {
    pub id: String,
    pub name: String,

    /// Default share of the overall score
    pub weight: f64,

    pub metrics: Vec<MetricDescriptor>,
}

/// How to interpret one raw metric value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetricDescriptor {
    pub id: String,
    pub name: String,
    pub min: f64,
    pub max: f64,

    /// True when a smaller raw value is better (e.g. travel time)
    #[serde(default, alias = "invertScale")]
    pub invert_scale: bool,

    /// Relative contribution within the owning category
    pub weight: f64,

    /// Display only
    #[serde(default)]
    pub unit: Option<String>,
}

impl MetricDescriptor {
    pub fn new(id: &str, min: f64, max: f64, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            min,
            max,
            invert_scale: false,
            weight,
            unit: None,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert_scale = true;
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}
