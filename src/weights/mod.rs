pub mod custom;
pub mod error;
pub mod presets;
pub mod sliders;
pub mod storage;

pub use custom::CustomWeights;
pub use error::WeightError;
pub use presets::{apply_preset, locality_presets, validate_presets, DomainPresets, Preset};
pub use sliders::{Slider, SliderSet, SLIDER_TOTAL};
pub use storage::{
    get_weights_path, load_weight_store, save_weight_store, SavedWeights, WeightStore,
};
