use super::FormulaRegistry;
use crate::scoring::Entity;

const SENTIMENT_MAX: f64 = 35.0;
const POPULARITY_MAX: f64 = 25.0;
const POPULARITY_SATURATION_REVIEWS: f64 = 2000.0;
const VALUE_MAX: f64 = 10.0;
const DEFAULT_PRICE_LEVEL: f64 = 2.0;

/// Formulas shared by restaurants, cafes and hotels.
pub fn dining() -> FormulaRegistry {
    FormulaRegistry::new()
        .with("sentiment", sentiment)
        .with("popularity", popularity)
        .with("value", value)
}

/// Dining formulas plus the restaurant-only vibe score.
pub fn restaurants() -> FormulaRegistry {
    dining().with("vibe", vibe)
}

/// 0-35 from the star rating: nothing up to 3.5 stars, full marks at 5.
pub fn sentiment(entity: &Entity) -> Option<f64> {
    let rating = entity.metric("rating")?;
    let score = if rating > 3.5 {
        SENTIMENT_MAX * ((rating - 3.5) / 1.5)
    } else {
        0.0
    };
    Some(score.clamp(0.0, SENTIMENT_MAX))
}

/// 0-25 on a log scale of review count, saturating at 2000 reviews.
pub fn popularity(entity: &Entity) -> Option<f64> {
    let reviews = entity.metric("reviews")?;
    let score = if reviews > 0.0 {
        POPULARITY_MAX * (reviews.ln() / POPULARITY_SATURATION_REVIEWS.ln())
    } else {
        0.0
    };
    Some(score.clamp(0.0, POPULARITY_MAX))
}

/// 0-10: high rating at a low price level is good value.
pub fn value(entity: &Entity) -> Option<f64> {
    let rating = entity.metric("rating")?;
    let price_level = entity.metric("price_level").unwrap_or(DEFAULT_PRICE_LEVEL);
    let multiplier = match price_level.round() as i64 {
        1 => 1.2,
        3 => 0.9,
        4 => 0.8,
        _ => 1.0,
    };
    Some(((rating * 2.0) * multiplier - 6.0).clamp(0.0, VALUE_MAX))
}

/// 0-10, twice the star rating.
pub fn vibe(entity: &Entity) -> Option<f64> {
    let rating = entity.metric("rating")?;
    Some((rating * 2.0).min(10.0))
}
