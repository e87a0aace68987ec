use thiserror::Error;

/// Errors raised while adjusting, restoring or persisting slider weights.
#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    /// No slider with this id exists in the set.
    #[error("unknown weight '{id}'")]
    UnknownSlider { id: String },

    /// The same slider id appears twice.
    #[error("duplicate weight '{id}'")]
    DuplicateSlider { id: String },

    /// A saved set or preset does not provide a value for this slider.
    #[error("missing weight for '{id}'")]
    MissingSlider { id: String },

    /// Slider values are whole percentages.
    #[error("weight for '{id}' must be between 0 and 100, got {value}")]
    OutOfRange { id: String, value: u32 },

    /// Only sets summing to 100 may be applied or saved.
    #[error("weights sum to {total}%, expected 100%")]
    Unbalanced { total: u32 },

    #[error("unknown preset '{name}' for domain '{domain}'")]
    UnknownPreset { domain: String, name: String },
}
