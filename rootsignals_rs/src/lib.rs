#![forbid(unsafe_code)]

mod apis;
pub mod blocking;
mod client;
mod error;
mod pagination;
mod types;

pub use apis::*;
pub use client::{
    API_KEY_ENV, BASE_URL_ENV, ClientOptions, DEFAULT_BASE_URL, RootSignalsClient, resolve_api_key,
};
pub use error::{RootSignalsError, RootSignalsErrorKind};
pub use pagination::iterate_cursor_list;
pub use types::*;

pub use rootsignals_core::calibration::{
    CalibrationResult, DataLoader, DataLoaderKind, InputVariable, ReferenceVariable,
};
pub use rootsignals_core::{
    CalibrateBatchRequest, CalibrateBatchResult, CalibrationOutcome, CalibrationParameter,
    CalibrationRequest, CalibrationTransport, TestSet,
};
