use crate::apis::{PresetEvaluator, PresetEvaluatorRunner};
use crate::client::RootSignalsClient;
use crate::error::{RootSignalsError, RootSignalsErrorKind};
use crate::pagination::iterate_cursor_list;
use crate::types::{
    Evaluator, EvaluatorExecutionRequest, EvaluatorExecutionResult, EvaluatorListItem,
    EvaluatorListParams, Page,
};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::Method;
use rootsignals_core::calibration::{DataLoader, InputVariable, ReferenceVariable};
use rootsignals_core::{
    CalibrateBatchRequest, CalibrateBatchResult, CalibrationOutcome, CalibrationRequest,
    CalibrationTransport, TestSet,
};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EvaluatorsApi {
    client: RootSignalsClient,
}

impl EvaluatorsApi {
    pub(crate) fn new(client: RootSignalsClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "info", skip(self, payload))]
    pub async fn run(
        &self,
        evaluator_id: &str,
        payload: EvaluatorExecutionRequest,
        timeout: Option<Duration>,
    ) -> Result<EvaluatorExecutionResult, RootSignalsError> {
        if !payload.has_input() {
            return Err(RootSignalsError::validation(
                "either request or response must be provided",
            ));
        }
        let path = format!("/v1/evaluators/execute/{evaluator_id}/");
        self.client
            .request_json(Method::POST, &path, None::<&()>, Some(&payload), timeout)
            .await
    }

    #[tracing::instrument(level = "info", skip(self, payload))]
    pub async fn run_by_name(
        &self,
        name: &str,
        payload: EvaluatorExecutionRequest,
        timeout: Option<Duration>,
    ) -> Result<EvaluatorExecutionResult, RootSignalsError> {
        #[derive(Serialize)]
        struct Query<'a> {
            name: &'a str,
        }
        if !payload.has_input() {
            return Err(RootSignalsError::validation(
                "either request or response must be provided",
            ));
        }
        self.client
            .request_json(
                Method::POST,
                "/v1/evaluators/execute/by-name/",
                Some(&Query { name }),
                Some(&payload),
                timeout,
            )
            .await
    }

    pub async fn get(&self, evaluator_id: &str) -> Result<Evaluator, RootSignalsError> {
        let path = format!("/v1/evaluators/{evaluator_id}/");
        self.client
            .request_json(Method::GET, &path, None::<&()>, None::<&()>, None)
            .await
    }

    /// Streams at most `limit` evaluators, following the listing's cursors.
    pub fn list(
        &self,
        params: EvaluatorListParams,
        limit: usize,
    ) -> impl Stream<Item = Result<EvaluatorListItem, RootSignalsError>> + Send + 'static {
        #[derive(Serialize)]
        struct Query {
            page_size: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            cursor: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            search: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_preset: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            ordering: Option<String>,
        }

        let client = self.client.clone();
        iterate_cursor_list(
            move |page_size, cursor| {
                let client = client.clone();
                let q = Query {
                    page_size,
                    cursor,
                    search: params.search.clone(),
                    name: params.name.clone(),
                    is_preset: params.is_preset,
                    ordering: params.ordering.clone(),
                };
                async move {
                    client
                        .request_json::<Page<EvaluatorListItem>>(
                            Method::GET,
                            "/v1/evaluators/",
                            Some(&q),
                            None::<&()>,
                            None,
                        )
                        .await
                }
            },
            limit,
        )
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<Evaluator, RootSignalsError> {
        let params = EvaluatorListParams {
            name: Some(name.to_string()),
            ..EvaluatorListParams::default()
        };
        let first = Box::pin(self.list(params, 1)).next().await.transpose()?;
        match first {
            Some(item) => self.get(&item.id).await,
            None => Err(RootSignalsError::new(
                RootSignalsErrorKind::NotFound,
                None,
                format!("no evaluator named {name}"),
            )),
        }
    }

    /// Scores an existing evaluator against a dataset or inline rows.
    #[tracing::instrument(level = "info", skip(self, test_data))]
    pub async fn calibrate_existing(
        &self,
        evaluator_id: &str,
        test_dataset_id: Option<String>,
        test_data: Option<Vec<Vec<String>>>,
        timeout: Option<Duration>,
    ) -> Result<Vec<CalibrationOutcome>, RootSignalsError> {
        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            test_dataset_id: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            test_data: Option<&'a [Vec<String>]>,
        }
        let test_set = TestSet::from_options(test_dataset_id, test_data)?;
        let body = Body {
            test_dataset_id: test_set.dataset_id(),
            test_data: test_set.rows(),
        };
        let path = format!("/v1/evaluators/calibrate/{evaluator_id}/");
        self.client
            .request_json(Method::POST, &path, None::<&()>, Some(&body), timeout)
            .await
    }

    /// Scores an evaluator definition that has not been saved.
    #[tracing::instrument(level = "info", skip_all, fields(name = %request.name, model = %request.model))]
    pub async fn calibrate(
        &self,
        request: &CalibrationRequest,
    ) -> Result<Vec<CalibrationOutcome>, RootSignalsError> {
        #[derive(Serialize)]
        struct Objective {
            intent: &'static str,
        }
        #[derive(Serialize)]
        struct Body<'a> {
            name: &'a str,
            prompt: &'a str,
            models: [&'a str; 1],
            is_evaluator: bool,
            pii_filter: bool,
            objective: Objective,
            #[serde(skip_serializing_if = "Option::is_none")]
            reference_variables: Option<&'a [ReferenceVariable]>,
            #[serde(skip_serializing_if = "Option::is_none")]
            input_variables: Option<&'a [InputVariable]>,
            #[serde(skip_serializing_if = "Option::is_none")]
            data_loaders: Option<&'a [DataLoader]>,
            #[serde(skip_serializing_if = "Option::is_none")]
            test_dataset_id: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            test_data: Option<&'a [Vec<String>]>,
        }
        let body = Body {
            name: &request.name,
            prompt: &request.prompt,
            models: [&request.model],
            is_evaluator: true,
            pii_filter: request.pii_filter,
            objective: Objective {
                intent: "Calibration",
            },
            reference_variables: request.reference_variables.as_deref(),
            input_variables: request.input_variables.as_deref(),
            data_loaders: request.data_loaders.as_deref(),
            test_dataset_id: request.test_set.dataset_id(),
            test_data: request.test_set.rows(),
        };
        self.client
            .request_json(
                Method::POST,
                "/v1/evaluators/calibrate/",
                None::<&()>,
                Some(&body),
                request.request_timeout,
            )
            .await
    }

    /// Calibrates every definition against the same test set and reports
    /// RMS/MAE per model and per prompt. Any failed definition fails the batch.
    pub async fn calibrate_batch(
        &self,
        request: CalibrateBatchRequest,
    ) -> Result<CalibrateBatchResult, RootSignalsError> {
        Ok(rootsignals_core::calibrate_batch(self, request).await?)
    }

    pub fn preset(&self, preset: PresetEvaluator) -> PresetEvaluatorRunner {
        PresetEvaluatorRunner::new(self.clone(), preset)
    }
}

#[async_trait]
impl CalibrationTransport for EvaluatorsApi {
    async fn calibrate(
        &self,
        request: CalibrationRequest,
    ) -> rootsignals_core::Result<Vec<CalibrationOutcome>> {
        Ok(EvaluatorsApi::calibrate(self, &request).await?)
    }
}
