use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::error::WeightError;
use crate::scoring::{Domain, WeightScope};

/// The budget every balanced slider set adds up to.
pub const SLIDER_TOTAL: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Slider {
    pub id: String,
    pub value: u32,
}

/// Ordered set of percentage sliders, one per category (or metric).
///
/// Order is significant: auto-balancing walks the other sliders in declared
/// order when it spreads leftovers and corrects rounding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderSet {
    sliders: Vec<Slider>,
}

impl SliderSet {
    pub fn new(values: Vec<(String, u32)>) -> Result<Self, WeightError> {
        let mut seen = HashSet::new();
        let mut sliders = Vec::with_capacity(values.len());
        for (id, value) in values {
            if !seen.insert(id.clone()) {
                return Err(WeightError::DuplicateSlider { id });
            }
            if value > SLIDER_TOTAL {
                return Err(WeightError::OutOfRange { id, value });
            }
            sliders.push(Slider { id, value });
        }
        Ok(Self { sliders })
    }

    /// Default sliders for a domain: the schema weights as whole percentages.
    ///
    /// Category scope reads category weights, metric scope the weights of the
    /// declared metrics. Either way the shares are scaled to sum to 100, so
    /// scoring with these sliders matches scoring with no overrides.
    pub fn for_domain(domain: &Domain) -> Self {
        let weighted: Vec<(String, f64)> = match domain.weight_scope {
            WeightScope::Category => domain
                .scoring_categories
                .iter()
                .map(|c| (c.id.clone(), c.weight))
                .collect(),
            WeightScope::Metric => domain.metrics().map(|m| (m.id.clone(), m.weight)).collect(),
        };
        let weights: Vec<f64> = weighted.iter().map(|(_, w)| *w).collect();
        let sliders = weighted
            .into_iter()
            .zip(weight_percents(&weights))
            .map(|((id, _), value)| Slider { id, value })
            .collect();
        Self { sliders }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slider> {
        self.sliders.iter()
    }

    pub fn len(&self) -> usize {
        self.sliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sliders.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<u32> {
        self.sliders.iter().find(|s| s.id == id).map(|s| s.value)
    }

    pub fn total(&self) -> u32 {
        self.sliders.iter().map(|s| s.value).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total() == SLIDER_TOTAL
    }

    pub fn ensure_balanced(&self) -> Result<(), WeightError> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(WeightError::Unbalanced {
                total: self.total(),
            })
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, u32> {
        self.sliders
            .iter()
            .map(|s| (s.id.clone(), s.value))
            .collect()
    }

    /// Overwrite every slider from `values` (a preset or a saved set).
    ///
    /// `values` must name exactly this set's sliders; the set is left
    /// untouched on error.
    pub fn apply_values(&mut self, values: &BTreeMap<String, u32>) -> Result<(), WeightError> {
        if let Some(id) = values.keys().find(|id| self.get(id).is_none()) {
            return Err(WeightError::UnknownSlider { id: id.clone() });
        }
        let mut updated = Vec::with_capacity(self.sliders.len());
        for slider in &self.sliders {
            let value = *values
                .get(&slider.id)
                .ok_or_else(|| WeightError::MissingSlider {
                    id: slider.id.clone(),
                })?;
            if value > SLIDER_TOTAL {
                return Err(WeightError::OutOfRange {
                    id: slider.id.clone(),
                    value,
                });
            }
            updated.push(value);
        }
        for (slider, value) in self.sliders.iter_mut().zip(updated) {
            slider.value = value;
        }
        Ok(())
    }

    /// Set one slider and rebalance the others so the set sums to 100.
    ///
    /// The remaining budget is spread over the other sliders in proportion to
    /// their current values. When they are all zero it is split evenly, the
    /// remainder going one unit at a time to the first sliders. Rounding
    /// drift is added in full to the first other slider that stays within
    /// `0..=100`, or spread a unit at a time when none can take all of it.
    /// A lone slider stays pinned at 100.
    pub fn auto_adjust(&mut self, changed_id: &str, new_value: u32) -> Result<(), WeightError> {
        let changed = self
            .sliders
            .iter()
            .position(|s| s.id == changed_id)
            .ok_or_else(|| WeightError::UnknownSlider {
                id: changed_id.to_string(),
            })?;
        if new_value > SLIDER_TOTAL {
            return Err(WeightError::OutOfRange {
                id: changed_id.to_string(),
                value: new_value,
            });
        }

        let others: Vec<usize> = (0..self.sliders.len()).filter(|&i| i != changed).collect();
        if others.is_empty() {
            self.sliders[changed].value = SLIDER_TOTAL;
            return Ok(());
        }

        self.sliders[changed].value = new_value;
        let remaining = SLIDER_TOTAL - new_value;
        let current_total: u32 = others.iter().map(|&i| self.sliders[i].value).sum();

        if current_total == 0 {
            let shares = equal_split(remaining, others.len());
            for (&i, share) in others.iter().zip(shares) {
                self.sliders[i].value = share;
            }
            return Ok(());
        }

        for &i in &others {
            let proportion = f64::from(self.sliders[i].value) / f64::from(current_total);
            self.sliders[i].value = (f64::from(remaining) * proportion).round() as u32;
        }

        let diff = i64::from(SLIDER_TOTAL) - i64::from(self.total());
        if diff != 0 && !self.absorb_whole(&others, diff) {
            self.absorb_stepwise(&others, diff);
        }

        Ok(())
    }

    /// Add `diff` to the first slider in `indices` that stays within range.
    fn absorb_whole(&mut self, indices: &[usize], diff: i64) -> bool {
        for &i in indices {
            let adjusted = i64::from(self.sliders[i].value) + diff;
            if (0..=i64::from(SLIDER_TOTAL)).contains(&adjusted) {
                self.sliders[i].value = adjusted as u32;
                return true;
            }
        }
        false
    }

    /// Spread `diff` one unit at a time over `indices`, in order.
    ///
    /// Only reached when no single slider can take the whole difference,
    /// e.g. five sliders at 20 with one moved to 98: the other four round
    /// up to 1 each and overshoot by 2.
    fn absorb_stepwise(&mut self, indices: &[usize], mut diff: i64) {
        while diff != 0 {
            let step = diff.signum();
            let mut moved = false;
            for &i in indices {
                if diff == 0 {
                    break;
                }
                let adjusted = i64::from(self.sliders[i].value) + step;
                if (0..=i64::from(SLIDER_TOTAL)).contains(&adjusted) {
                    self.sliders[i].value = adjusted as u32;
                    diff -= step;
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }
    }
}

/// Whole percentages proportional to `weights`, summing to 100.
///
/// Largest remainder: every share is floored, then the leftover units go to
/// the largest fractional parts, earlier entries first on ties. All-zero
/// weights split evenly.
fn weight_percents(weights: &[f64]) -> Vec<u32> {
    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if weights.is_empty() || !total.is_finite() || total <= 0.0 {
        return equal_split(SLIDER_TOTAL, weights.len());
    }

    let exact: Vec<f64> = weights
        .iter()
        .map(|w| w.max(0.0) / total * f64::from(SLIDER_TOTAL))
        .collect();
    // Absorb float noise such as 0.15 * 100 / 1.0000000000000002.
    let mut shares: Vec<u32> = exact.iter().map(|x| (x + 1e-9).floor() as u32).collect();
    let assigned: u32 = shares.iter().sum();
    let leftover = SLIDER_TOTAL.saturating_sub(assigned) as usize;

    let mut by_remainder: Vec<usize> = (0..exact.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let rem_a = exact[a] - f64::from(shares[a]);
        let rem_b = exact[b] - f64::from(shares[b]);
        rem_b.total_cmp(&rem_a)
    });
    for &i in by_remainder.iter().cycle().take(leftover) {
        shares[i] += 1;
    }
    shares
}

/// Split `amount` into `parts` integer shares, the first `amount % parts`
/// shares getting one extra unit.
fn equal_split(amount: u32, parts: usize) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let parts_u32 = parts as u32;
    let each = amount / parts_u32;
    let leftover = amount - each * parts_u32;
    (0..parts_u32)
        .map(|i| each + u32::from(i < leftover))
        .collect()
}
