use std::collections::HashSet;

use super::schema::{Domain, Schema};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validate a schema once, before any entity is scored.
/// Returns all validation errors at once (not just the first).
pub fn validate_schema(schema: &Schema) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if schema.domains.is_empty() {
        errors.push("domains: at least one domain is required".to_string());
    }

    for (domain_id, domain) in &schema.domains {
        validate_domain(domain_id, domain, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_domain(domain_id: &str, domain: &Domain, errors: &mut Vec<String>) {
    let prefix = format!("domains.{}", domain_id);

    if domain.scoring_categories.is_empty() {
        errors.push(format!("{}.scoring_categories: must not be empty", prefix));
    }

    let mut category_ids = HashSet::new();
    let mut metric_ids = HashSet::new();

    for (i, category) in domain.scoring_categories.iter().enumerate() {
        let path = format!("{}.scoring_categories[{}]", prefix, i);

        if !category_ids.insert(category.id.as_str()) {
            errors.push(format!("{}.id: duplicate category id '{}'", path, category.id));
        }
        if !category.weight.is_finite() || category.weight < 0.0 {
            errors.push(format!(
                "{}.weight: must be a non-negative number, got {}",
                path, category.weight
            ));
        }
        if category.metrics.is_empty() {
            errors.push(format!("{}.metrics: must not be empty", path));
        }

        for (j, metric) in category.metrics.iter().enumerate() {
            let path = format!("{}.metrics[{}]", path, j);

            // Metric ids key into entity data, so they must be unique across the domain.
            if !metric_ids.insert(metric.id.as_str()) {
                errors.push(format!("{}.id: duplicate metric id '{}'", path, metric.id));
            }
            if !metric.min.is_finite() || !metric.max.is_finite() {
                errors.push(format!("{}: min and max must be finite", path));
            } else if metric.min >= metric.max {
                errors.push(format!(
                    "{}.max: must be greater than min ({} >= {})",
                    path, metric.min, metric.max
                ));
            }
            if !metric.weight.is_finite() || metric.weight < 0.0 {
                errors.push(format!(
                    "{}.weight: must be a non-negative number, got {}",
                    path, metric.weight
                ));
            }
        }
    }
}

/// Observations about a schema that are allowed but usually unintended,
/// such as weights that do not add up to 1. Never blocks loading.
pub fn schema_warnings(schema: &Schema) -> Vec<String> {
    let mut warnings = Vec::new();

    for (domain_id, domain) in &schema.domains {
        let category_total: f64 = domain.scoring_categories.iter().map(|c| c.weight).sum();
        if !domain.scoring_categories.is_empty()
            && (category_total - 1.0).abs() > WEIGHT_SUM_TOLERANCE
        {
            warnings.push(format!(
                "domains.{}: category weights sum to {:.3}, not 1",
                domain_id, category_total
            ));
        }

        for category in &domain.scoring_categories {
            let metric_total: f64 = category.metrics.iter().map(|m| m.weight).sum();
            if !category.metrics.is_empty() && (metric_total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                warnings.push(format!(
                    "domains.{}.{}: metric weights sum to {:.3}, not 1",
                    domain_id, category.id, metric_total
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::schema::{MetricDescriptor, ScoringCategory, WeightScope};
    use std::collections::BTreeMap;

    fn schema_with(categories: Vec<ScoringCategory>) -> Schema {
        let mut domains = BTreeMap::new();
        domains.insert(
            "localities".to_string(),
            Domain {
                name: None,
                weight_scope: WeightScope::Category,
                formulas: None,
                scoring_categories: categories,
            },
        );
        Schema::new(domains)
    }

    fn category(id: &str, weight: f64, metrics: Vec<MetricDescriptor>) -> ScoringCategory {
        ScoringCategory {
            id: id.to_string(),
            name: id.to_string(),
            weight,
            metrics,
        }
    }

    #[test]
    fn test_valid_schema() {
        let schema = schema_with(vec![category(
            "access",
            1.0,
            vec![MetricDescriptor::new("time", 0.0, 60.0, 1.0).inverted()],
        )]);
        assert!(validate_schema(&schema).is_ok());
        assert!(schema_warnings(&schema).is_empty());
    }

    #[test]
    fn test_empty_schema() {
        let errors = validate_schema(&Schema::default()).unwrap_err();
        assert!(errors[0].contains("at least one domain"));
    }

    #[test]
    fn test_degenerate_range_rejected() {
        let schema = schema_with(vec![category(
            "access",
            1.0,
            vec![MetricDescriptor::new("time", 5.0, 5.0, 1.0)],
        )]);
        let errors = validate_schema(&schema).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("domains.localities.scoring_categories[0].metrics[0].max"));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let schema = schema_with(vec![category(
            "access",
            1.0,
            vec![MetricDescriptor::new("time", 0.0, f64::INFINITY, 1.0)],
        )]);
        let errors = validate_schema(&schema).unwrap_err();
        assert!(errors[0].contains("must be finite"));
    }

    #[test]
    fn test_negative_weights_rejected() {
        let schema = schema_with(vec![category(
            "access",
            -0.5,
            vec![MetricDescriptor::new("time", 0.0, 60.0, -1.0)],
        )]);
        let errors = validate_schema(&schema).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let schema = schema_with(vec![
            category("access", 0.5, vec![MetricDescriptor::new("time", 0.0, 60.0, 1.0)]),
            category("access", 0.5, vec![MetricDescriptor::new("time", 0.0, 60.0, 1.0)]),
        ]);
        let errors = validate_schema(&schema).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("duplicate category id 'access'")));
        assert!(errors.iter().any(|e| e.contains("duplicate metric id 'time'")));
    }

    #[test]
    fn test_empty_categories_and_metrics() {
        let schema = schema_with(vec![]);
        let errors = validate_schema(&schema).unwrap_err();
        assert!(errors[0].contains("scoring_categories: must not be empty"));

        let schema = schema_with(vec![category("access", 1.0, vec![])]);
        let errors = validate_schema(&schema).unwrap_err();
        assert!(errors[0].contains("metrics: must not be empty"));
    }

    #[test]
    fn test_collects_all_errors() {
        let schema = schema_with(vec![category(
            "access",
            f64::NAN,
            vec![
                MetricDescriptor::new("a", 1.0, 0.0, 1.0),
                MetricDescriptor::new("b", 0.0, 1.0, f64::NAN),
            ],
        )]);
        let errors = validate_schema(&schema).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_weight_sums_only_warn() {
        let schema = schema_with(vec![category(
            "access",
            0.7,
            vec![
                MetricDescriptor::new("a", 0.0, 1.0, 0.5),
                MetricDescriptor::new("b", 0.0, 1.0, 0.2),
            ],
        )]);
        assert!(validate_schema(&schema).is_ok());

        let warnings = schema_warnings(&schema);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("category weights sum to 0.700"));
        assert!(warnings[1].contains("domains.localities.access: metric weights sum to 0.700"));
    }
}
