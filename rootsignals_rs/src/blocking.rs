//! Synchronous wrapper over the async client.
//!
//! Each call drives the async implementation to completion on a private
//! current-thread runtime. Do not call these methods from inside another tokio
//! runtime; use the async client there.

use crate::apis::PresetEvaluator;
use crate::error::{RootSignalsError, RootSignalsErrorKind};
use crate::types::{
    Evaluator, EvaluatorExecutionRequest, EvaluatorExecutionResult, EvaluatorListItem,
    EvaluatorListParams,
};
use futures_util::TryStreamExt;
use rootsignals_core::{
    CalibrateBatchRequest, CalibrateBatchResult, CalibrationOutcome, CalibrationRequest,
};
use std::time::Duration;
use tokio::runtime::Runtime;

pub struct RootSignalsClient {
    inner: crate::client::RootSignalsClient,
    rt: Runtime,
}

impl RootSignalsClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, RootSignalsError> {
        Self::from_async(crate::client::RootSignalsClient::new(api_key, base_url))
    }

    pub fn from_env() -> Result<Self, RootSignalsError> {
        Self::from_async(crate::client::RootSignalsClient::from_env()?)
    }

    pub fn from_async(inner: crate::client::RootSignalsClient) -> Result<Self, RootSignalsError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                RootSignalsError::new(
                    RootSignalsErrorKind::Config,
                    None,
                    format!("failed to build tokio runtime: {e}"),
                )
            })?;
        Ok(Self { inner, rt })
    }

    pub fn inner(&self) -> &crate::client::RootSignalsClient {
        &self.inner
    }

    pub fn evaluators(&self) -> EvaluatorsApi<'_> {
        EvaluatorsApi {
            inner: self.inner.evaluators(),
            rt: &self.rt,
        }
    }
}

pub struct EvaluatorsApi<'a> {
    inner: crate::apis::EvaluatorsApi,
    rt: &'a Runtime,
}

impl EvaluatorsApi<'_> {
    pub fn run(
        &self,
        evaluator_id: &str,
        payload: EvaluatorExecutionRequest,
        timeout: Option<Duration>,
    ) -> Result<EvaluatorExecutionResult, RootSignalsError> {
        self.rt.block_on(self.inner.run(evaluator_id, payload, timeout))
    }

    pub fn run_by_name(
        &self,
        name: &str,
        payload: EvaluatorExecutionRequest,
        timeout: Option<Duration>,
    ) -> Result<EvaluatorExecutionResult, RootSignalsError> {
        self.rt.block_on(self.inner.run_by_name(name, payload, timeout))
    }

    pub fn run_preset(
        &self,
        preset: PresetEvaluator,
        payload: EvaluatorExecutionRequest,
        timeout: Option<Duration>,
    ) -> Result<EvaluatorExecutionResult, RootSignalsError> {
        self.rt
            .block_on(self.inner.preset(preset).run(payload, timeout))
    }

    pub fn get(&self, evaluator_id: &str) -> Result<Evaluator, RootSignalsError> {
        self.rt.block_on(self.inner.get(evaluator_id))
    }

    pub fn get_by_name(&self, name: &str) -> Result<Evaluator, RootSignalsError> {
        self.rt.block_on(self.inner.get_by_name(name))
    }

    /// Collects up to `limit` evaluators.
    pub fn list(
        &self,
        params: EvaluatorListParams,
        limit: usize,
    ) -> Result<Vec<EvaluatorListItem>, RootSignalsError> {
        self.rt
            .block_on(self.inner.list(params, limit).try_collect::<Vec<_>>())
    }

    pub fn calibrate(
        &self,
        request: &CalibrationRequest,
    ) -> Result<Vec<CalibrationOutcome>, RootSignalsError> {
        self.rt.block_on(self.inner.calibrate(request))
    }

    pub fn calibrate_existing(
        &self,
        evaluator_id: &str,
        test_dataset_id: Option<String>,
        test_data: Option<Vec<Vec<String>>>,
        timeout: Option<Duration>,
    ) -> Result<Vec<CalibrationOutcome>, RootSignalsError> {
        self.rt.block_on(
            self.inner
                .calibrate_existing(evaluator_id, test_dataset_id, test_data, timeout),
        )
    }

    pub fn calibrate_batch(
        &self,
        request: CalibrateBatchRequest,
    ) -> Result<CalibrateBatchResult, RootSignalsError> {
        self.rt.block_on(self.inner.calibrate_batch(request))
    }
}
