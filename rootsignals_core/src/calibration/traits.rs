use super::models::{CalibrationOutcome, CalibrationRequest};
use crate::Result;
use async_trait::async_trait;

/// One network round trip to the calibration endpoint.
#[async_trait]
pub trait CalibrationTransport: Send + Sync {
    async fn calibrate(&self, request: CalibrationRequest) -> Result<Vec<CalibrationOutcome>>;
}
