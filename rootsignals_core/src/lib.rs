//! Root Signals core library: shared errors, tracing bootstrap, and the
//! transport-agnostic calibration aggregator.

#![forbid(unsafe_code)]

pub mod calibration;
pub mod error;
pub mod o11y;

pub use calibration::{
    CalibrateBatchRequest, CalibrateBatchResult, CalibrationOutcome, CalibrationParameter,
    CalibrationRequest, CalibrationTransport, TestSet, calibrate_batch,
};
pub use error::{Error, Result};
pub use o11y::traits::{LogFormat, O11yConfig};
