use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::formulas::FormulaRegistry;
use crate::scoring::{
    validate_schema, Domain, MetricDescriptor, Schema, ScoringCategory, WeightScope,
};
use crate::weights::{locality_presets, validate_presets, DomainPresets};

/// Configuration file contents.
///
/// Example YAML:
/// ```yaml
/// log_level: warn
/// default_domain: localities
/// top: 10
/// datasets:
///   localities: data/localities.json
/// domains:
///   localities:
///     scoring_categories: [...]
/// presets:
///   localities:
///     families: { accessibility: 20, amenities: 30, ... }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Log filter used when RUST_LOG is not set (default: "warn")
    #[serde(default)]
    pub log_level: Option<String>,

    /// Domain ranked when none is given on the command line
    #[serde(default)]
    pub default_domain: Option<String>,

    /// Default number of entries to list
    #[serde(default)]
    pub top: Option<usize>,

    /// Entity dataset per domain; relative paths resolve against the config file
    #[serde(default)]
    pub datasets: BTreeMap<String, PathBuf>,

    /// The ranking schema
    pub domains: BTreeMap<String, Domain>,

    /// Named slider presets per domain
    #[serde(default)]
    pub presets: BTreeMap<String, DomainPresets>,
}

impl Config {
    pub fn schema(&self) -> Schema {
        Schema::new(self.domains.clone())
    }

    /// Configured default domain, or the first domain in id order.
    pub fn default_domain(&self) -> Option<&str> {
        self.default_domain
            .as_deref()
            .or_else(|| self.domains.keys().next().map(String::as_str))
    }

    pub fn presets_for(&self, domain_id: &str) -> Option<&DomainPresets> {
        self.presets.get(domain_id)
    }

    /// Dataset path for a domain, resolved against `base_dir` when relative.
    pub fn dataset_path(&self, domain_id: &str, base_dir: &Path) -> Option<PathBuf> {
        self.datasets.get(domain_id).map(|path| {
            if path.is_relative() {
                base_dir.join(path)
            } else {
                path.clone()
            }
        })
    }

    /// Validate the whole configuration at startup.
    /// Returns all validation errors at once (not just the first).
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(schema_errors) = validate_schema(&self.schema()) {
            errors.extend(schema_errors);
        }

        if let Some(ref domain) = self.default_domain {
            if !self.domains.contains_key(domain) {
                errors.push(format!("default_domain: unknown domain '{}'", domain));
            }
        }

        for domain_id in self.datasets.keys() {
            if !self.domains.contains_key(domain_id) {
                errors.push(format!("datasets.{}: unknown domain", domain_id));
            }
        }

        for (domain_id, presets) in &self.presets {
            match self.domains.get(domain_id) {
                Some(domain) => errors.extend(validate_presets(domain_id, domain, presets)),
                None => errors.push(format!("presets.{}: unknown domain", domain_id)),
            }
        }

        for (domain_id, domain) in &self.domains {
            if let Err(e) = FormulaRegistry::for_domain(domain_id, domain) {
                errors.push(format!("domains.{}.formulas: {}", domain_id, e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut domains = BTreeMap::new();
        domains.insert("localities".to_string(), locality_domain());
        domains.insert("restaurants".to_string(), dining_domain("Restaurants", "restaurants", &["convenience", "vibe"]));
        domains.insert("cafes".to_string(), dining_domain("Cafes", "dining", &["convenience", "workspace"]));
        domains.insert("hotels".to_string(), dining_domain("Hotels", "dining", &["location", "luxury"]));

        let mut datasets = BTreeMap::new();
        for domain_id in domains.keys() {
            datasets.insert(domain_id.clone(), PathBuf::from(format!("data/{}.json", domain_id)));
        }

        let mut presets = BTreeMap::new();
        presets.insert("localities".to_string(), locality_presets());

        Self {
            log_level: Some("warn".to_string()),
            default_domain: Some("localities".to_string()),
            top: Some(10),
            datasets,
            domains,
            presets,
        }
    }
}

fn category(id: &str, name: &str, weight: f64, metrics: Vec<MetricDescriptor>) -> ScoringCategory {
    ScoringCategory {
        id: id.to_string(),
        name: name.to_string(),
        weight,
        metrics,
    }
}

fn travel_time(id: &str, name: &str, weight: f64) -> MetricDescriptor {
    MetricDescriptor::new(id, 0.0, 60.0, weight)
        .named(name)
        .inverted()
        .with_unit("min")
}

fn count(id: &str, name: &str, max: f64, weight: f64) -> MetricDescriptor {
    MetricDescriptor::new(id, 0.0, max, weight).named(name)
}

fn rating10(id: &str, name: &str, weight: f64) -> MetricDescriptor {
    MetricDescriptor::new(id, 0.0, 10.0, weight).named(name).with_unit("/10")
}

/// Six-category locality schema.
fn locality_domain() -> Domain {
    Domain {
        name: Some("Localities".to_string()),
        weight_scope: WeightScope::Category,
        formulas: None,
        scoring_categories: vec![
            category(
                "accessibility",
                "Accessibility",
                0.20,
                vec![
                    travel_time("technopark_time", "Technopark", 0.30),
                    travel_time("city_centre_time", "City Centre", 0.25),
                    travel_time("secretariat_time", "Secretariat", 0.15),
                    travel_time("airport_time", "Airport", 0.15),
                    travel_time("ksrtc_stand_time", "KSRTC Bus Stand", 0.15),
                ],
            ),
            category(
                "amenities",
                "Amenities",
                0.25,
                vec![
                    count("hospital_count", "Hospitals", 20.0, 0.25),
                    count("school_count", "Schools", 20.0, 0.20),
                    count("supermarket_count", "Supermarkets & pharmacies", 40.0, 0.20),
                    count("bank_count", "Banks & ATMs", 40.0, 0.15),
                    count("lifestyle_count", "Restaurants, cafes & gyms", 60.0, 0.20),
                ],
            ),
            category(
                "safety",
                "Safety",
                0.15,
                vec![
                    count("police_count", "Police stations", 20.0, 0.70),
                    count("fire_station_count", "Fire stations", 5.0, 0.30),
                ],
            ),
            category(
                "environment",
                "Environment",
                0.15,
                vec![
                    count("park_count", "Parks", 20.0, 0.40),
                    rating10("noise_score", "Quietness", 0.30),
                    rating10("flood_safety_score", "Flood safety", 0.30),
                ],
            ),
            category(
                "economy",
                "Economy",
                0.15,
                vec![
                    rating10("job_proximity_score", "Job proximity", 0.50),
                    count("commercial_count", "Commercial activity", 40.0, 0.30),
                    count("real_estate_agency_count", "Developers", 20.0, 0.20),
                ],
            ),
            category(
                "prestige",
                "Prestige",
                0.10,
                vec![MetricDescriptor::new("land_price", 0.0, 30.0, 1.0)
                    .named("Land price")
                    .with_unit("lakh/cent")],
            ),
        ],
    }
}

/// Restaurants, cafes and hotels: one category, user weights per metric.
fn dining_domain(name: &str, formulas: &str, specific: &[&str]) -> Domain {
    let mut metrics = vec![
        MetricDescriptor::new("sentiment", 0.0, 35.0, 0.20).named("Sentiment Score"),
        MetricDescriptor::new("popularity", 0.0, 25.0, 0.20).named("Popularity"),
        MetricDescriptor::new("rating", 1.0, 5.0, 0.15).named("Rating").with_unit("stars"),
        MetricDescriptor::new("value", 0.0, 10.0, 0.15).named("Value"),
    ];
    for id in specific {
        metrics.push(rating10(id, &title_case(id), 0.15));
    }

    Domain {
        name: Some(name.to_string()),
        weight_scope: WeightScope::Metric,
        formulas: Some(formulas.to_string()),
        scoring_categories: vec![category("overall", "Overall", 1.0, metrics)],
    }
}

fn title_case(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::schema_warnings;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok(), "{:?}", config.validate());
        assert!(schema_warnings(&config.schema()).is_empty());
        assert_eq!(config.default_domain(), Some("localities"));
    }

    #[test]
    fn test_default_locality_weights() {
        let config = Config::default();
        let localities = &config.domains["localities"];
        let weights: Vec<_> = localities.scoring_categories.iter().map(|c| (c.id.as_str(), c.weight)).collect();
        assert_eq!(
            weights,
            vec![
                ("accessibility", 0.20),
                ("amenities", 0.25),
                ("safety", 0.15),
                ("environment", 0.15),
                ("economy", 0.15),
                ("prestige", 0.10),
            ]
        );
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_minimal_config_parse() {
        let yaml = r#"
domains:
  localities:
    scoring_categories:
      - id: access
        name: Accessibility
        weight: 1
        metrics:
          - { id: time, name: Time, min: 0, max: 60, invert_scale: true, weight: 1 }
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert!(config.log_level.is_none());
        assert!(config.datasets.is_empty());
        assert_eq!(config.default_domain(), Some("localities"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "domains: {}\nqueries: []\n";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_validate_collects_cross_references() {
        let mut config = Config::default();
        config.default_domain = Some("bakeries".to_string());
        config.datasets.insert("bakeries".to_string(), PathBuf::from("b.json"));
        config.presets.insert("bakeries".to_string(), DomainPresets::new());
        config.domains.get_mut("cafes").unwrap().formulas = Some("bakery".to_string());

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("default_domain")));
        assert!(errors.iter().any(|e| e.contains("datasets.bakeries")));
        assert!(errors.iter().any(|e| e.contains("presets.bakeries")));
        assert!(errors.iter().any(|e| e.contains("domains.cafes.formulas")));
    }

    #[test]
    fn test_dataset_path_resolution() {
        let mut config = Config::default();
        config.datasets.insert("hotels".to_string(), PathBuf::from("/srv/hotels.json"));

        let base = Path::new("/home/u/.config/placerank");
        assert_eq!(
            config.dataset_path("localities", base),
            Some(base.join("data/localities.json"))
        );
        assert_eq!(config.dataset_path("hotels", base), Some(PathBuf::from("/srv/hotels.json")));
        assert_eq!(config.dataset_path("bakeries", base), None);
    }
}
