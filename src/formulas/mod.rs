//! Derived metrics.
//!
//! Some datasets only carry source fields (rating, review count, price level)
//! while the schema scores derived metrics such as `sentiment` or `value`. A
//! [`FormulaRegistry`] maps each derived metric id to a pure function of the
//! entity and fills the values in before scoring.

pub mod dining;

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::scoring::{Domain, Entity};

/// Computes one metric value from an entity's raw data.
pub type Formula = fn(&Entity) -> Option<f64>;

#[derive(Debug, Error, PartialEq)]
pub enum FormulaError {
    /// The domain names a registry that does not exist.
    #[error("unknown formula registry '{name}'")]
    UnknownRegistry { name: String },

    /// Formulas were registered for metrics the domain never declares.
    #[error("formulas for undeclared metrics in '{domain}': {}", .metrics.join(", "))]
    UndeclaredMetric { domain: String, metrics: Vec<String> },
}

#[derive(Clone, Default)]
pub struct FormulaRegistry {
    formulas: BTreeMap<String, Formula>,
}

impl fmt::Debug for FormulaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.formulas.keys()).finish()
    }
}

impl FormulaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric_id: &str, formula: Formula) -> Self {
        self.formulas.insert(metric_id.to_string(), formula);
        self
    }

    /// Built-in registries by name.
    pub fn by_name(name: &str) -> Result<Self, FormulaError> {
        match name {
            "dining" => Ok(dining::dining()),
            "restaurants" => Ok(dining::restaurants()),
            _ => Err(FormulaError::UnknownRegistry {
                name: name.to_string(),
            }),
        }
    }

    /// Registry configured for a domain (empty when it names none), checked
    /// against the domain's declared metrics.
    pub fn for_domain(domain_id: &str, domain: &Domain) -> Result<Self, FormulaError> {
        let registry = match &domain.formulas {
            Some(name) => Self::by_name(name)?,
            None => Self::new(),
        };
        registry.validate_against(domain_id, domain)?;
        Ok(registry)
    }

    pub fn metric_ids(&self) -> impl Iterator<Item = &str> {
        self.formulas.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Every formula must produce a metric the domain declares.
    pub fn validate_against(&self, domain_id: &str, domain: &Domain) -> Result<(), FormulaError> {
        let undeclared: Vec<String> = self
            .metric_ids()
            .filter(|id| domain.metric(id).is_none())
            .map(str::to_string)
            .collect();
        if undeclared.is_empty() {
            Ok(())
        } else {
            Err(FormulaError::UndeclaredMetric {
                domain: domain_id.to_string(),
                metrics: undeclared,
            })
        }
    }

    /// Copy of `entity` with formula values filled in.
    ///
    /// Values already present in the data win over derived ones. A formula
    /// returning `None` leaves the metric missing.
    pub fn derive(&self, entity: &Entity) -> Entity {
        let mut derived = entity.clone();
        for (metric_id, formula) in &self.formulas {
            if entity.metric(metric_id).is_some() {
                continue;
            }
            if let Some(value) = formula(entity) {
                debug!(entity = %entity.id, metric = %metric_id, value, "derived metric");
                derived.set_metric(metric_id, value);
            }
        }
        derived
    }

    pub fn derive_all(&self, entities: &[Entity]) -> Vec<Entity> {
        entities.iter().map(|e| self.derive(e)).collect()
    }
}
