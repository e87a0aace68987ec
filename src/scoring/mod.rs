pub mod engine;
pub mod entity;
pub mod error;
pub mod normalize;
pub mod rank;
pub mod recalc;
pub mod schema;
pub mod validation;

pub use engine::{
    score_category, CategoryScore, MetricScore, ScoreBreakdown, ScoringEngine, SCORE_SCALE,
};
pub use entity::Entity;
pub use error::{SchemaError, ScoringError};
pub use normalize::normalize;
pub use rank::{sort_by_score_desc, RankedEntity};
pub use recalc::{recalculate_rankings, PrecomputedEntry};
pub use schema::{Domain, MetricDescriptor, Schema, ScoringCategory, WeightScope};
pub use validation::{schema_warnings, validate_schema};
