use serde::Serialize;

use super::engine::ScoreBreakdown;
use super::entity::Entity;

/// An entity with its score attached, as produced by ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntity {
    /// 1-based position after sorting
    pub rank: usize,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub entity: Entity,
}

/// Sort descending by score, keeping input order for equal scores.
///
/// `sort_by` is stable, which is what makes tie order deterministic. NaN
/// scores sort last and `-0.0` ties with `0.0`.
pub fn sort_by_score_desc<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| sort_key(score(b)).total_cmp(&sort_key(score(a))));
}

fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score + 0.0
    }
}

pub(crate) fn rank_scored(scored: Vec<(Entity, ScoreBreakdown)>) -> Vec<RankedEntity> {
    let mut ranked: Vec<RankedEntity> = scored
        .into_iter()
        .map(|(entity, breakdown)| RankedEntity {
            rank: 0,
            score: breakdown.overall,
            breakdown,
            entity,
        })
        .collect();

    sort_by_score_desc(&mut ranked, |r| r.score);

    for (index, item) in ranked.iter_mut().enumerate() {
        item.rank = index + 1;
    }
    ranked
}
