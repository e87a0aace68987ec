use std::collections::BTreeMap;

use super::error::WeightError;
use super::sliders::{SliderSet, SLIDER_TOTAL};
use crate::scoring::Domain;

/// Slider percentages keyed by slider id.
pub type Preset = BTreeMap<String, u32>;

/// Named presets for one domain.
pub type DomainPresets = BTreeMap<String, Preset>;

fn preset(values: &[(&str, u32)]) -> Preset {
    values.iter().map(|(id, v)| (id.to_string(), *v)).collect()
}

/// Built-in quick presets for the six locality categories.
pub fn locality_presets() -> DomainPresets {
    let mut presets = BTreeMap::new();
    presets.insert(
        "balanced".to_string(),
        preset(&[
            ("accessibility", 20),
            ("amenities", 20),
            ("safety", 15),
            ("environment", 15),
            ("economy", 15),
            ("prestige", 15),
        ]),
    );
    presets.insert(
        "families".to_string(),
        preset(&[
            ("accessibility", 20),
            ("amenities", 30),
            ("safety", 20),
            ("environment", 15),
            ("economy", 10),
            ("prestige", 5),
        ]),
    );
    presets.insert(
        "professionals".to_string(),
        preset(&[
            ("accessibility", 25),
            ("amenities", 20),
            ("safety", 10),
            ("environment", 10),
            ("economy", 25),
            ("prestige", 10),
        ]),
    );
    presets.insert(
        "retirees".to_string(),
        preset(&[
            ("accessibility", 15),
            ("amenities", 30),
            ("safety", 20),
            ("environment", 25),
            ("economy", 5),
            ("prestige", 5),
        ]),
    );
    presets.insert(
        "environment".to_string(),
        preset(&[
            ("accessibility", 10),
            ("amenities", 15),
            ("safety", 15),
            ("environment", 40),
            ("economy", 10),
            ("prestige", 10),
        ]),
    );
    presets
}

/// Look up a preset and apply it to `sliders`.
pub fn apply_preset(
    sliders: &mut SliderSet,
    domain_id: &str,
    presets: Option<&DomainPresets>,
    name: &str,
) -> Result<(), WeightError> {
    let values = presets
        .and_then(|p| p.get(name))
        .ok_or_else(|| WeightError::UnknownPreset {
            domain: domain_id.to_string(),
            name: name.to_string(),
        })?;
    sliders.apply_values(values)
}

/// Check every preset of a domain against its sliders.
/// Returns all problems at once.
pub fn validate_presets(domain_id: &str, domain: &Domain, presets: &DomainPresets) -> Vec<String> {
    let mut errors = Vec::new();
    let defaults = SliderSet::for_domain(domain);

    for (name, values) in presets {
        let path = format!("presets.{}.{}", domain_id, name);

        let mut sliders = defaults.clone();
        if let Err(e) = sliders.apply_values(values) {
            errors.push(format!("{}: {}", path, e));
            continue;
        }
        let total = sliders.total();
        if total != SLIDER_TOTAL {
            errors.push(format!("{}: values sum to {}, expected 100", path, total));
        }
    }

    errors
}
