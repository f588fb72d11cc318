mod evaluators;
mod presets;

pub use evaluators::EvaluatorsApi;
pub use presets::{PresetEvaluator, PresetEvaluatorRunner};
