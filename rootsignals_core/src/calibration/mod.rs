//! Evaluator calibration: fan a batch of evaluator definitions out to the
//! calibration endpoint and reduce the scored rows into RMS/MAE per model and
//! per prompt.

pub mod accumulator;
pub mod engine;
pub mod models;
pub mod traits;

pub use accumulator::{ErrorAccumulator, ErrorTables};
pub use engine::calibrate_batch;
pub use models::{
    CalibrateBatchRequest, CalibrateBatchResult, CalibrationOutcome, CalibrationParameter,
    CalibrationRequest, CalibrationResult, DataLoader, DataLoaderKind, InputVariable,
    ReferenceVariable, TestSet,
};
pub use traits::CalibrationTransport;
