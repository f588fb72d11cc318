use super::accumulator::ErrorTables;
use super::models::{
    CalibrateBatchRequest, CalibrateBatchResult, CalibrationOutcome, CalibrationParameter,
    CalibrationRequest, TestSet,
};
use super::traits::CalibrationTransport;
use crate::{Error, Result};
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Runs every evaluator definition against the shared test set and reduces the
/// outcomes into per-model and per-prompt RMS/MAE.
///
/// Fails before any transport call when the test set is ambiguous or missing,
/// or when `parallel_requests` is zero. Any single transport failure aborts the
/// batch with `Error::Calibration` naming the failing prompt and model; no
/// partial result is returned.
///
/// Error statistics do not depend on `parallel_requests`. The order of
/// `results` does: sequential runs keep submission order, bounded runs use
/// completion order.
#[tracing::instrument(
    level = "info",
    skip_all,
    fields(
        definitions = request.evaluator_definitions.len(),
        parallel_requests = request.parallel_requests
    )
)]
pub async fn calibrate_batch(
    transport: &dyn CalibrationTransport,
    request: CalibrateBatchRequest,
) -> Result<CalibrateBatchResult> {
    let CalibrateBatchRequest {
        evaluator_definitions,
        test_dataset_id,
        test_data,
        parallel_requests,
        request_timeout,
    } = request;

    let test_set = TestSet::from_options(test_dataset_id, test_data)?;
    if parallel_requests == 0 {
        return Err(Error::InvalidInput(
            "parallel_requests must be >= 1".to_string(),
        ));
    }

    let tables = if parallel_requests == 1 {
        run_sequential(transport, &evaluator_definitions, &test_set, request_timeout).await?
    } else {
        run_bounded(
            transport,
            &evaluator_definitions,
            &test_set,
            request_timeout,
            parallel_requests,
        )
        .await?
    };

    let result = tables.finish();
    tracing::info!(
        results = result.results.len(),
        models = result.rms_errors_model.len(),
        prompts = result.rms_errors_prompt.len(),
        "calibration batch finished"
    );
    Ok(result)
}

#[tracing::instrument(level = "debug", skip_all)]
async fn run_sequential(
    transport: &dyn CalibrationTransport,
    params: &[CalibrationParameter],
    test_set: &TestSet,
    request_timeout: Option<Duration>,
) -> Result<ErrorTables> {
    let mut tables = ErrorTables::new();
    for param in params {
        let outcomes = calibrate_one(transport, param, test_set.clone(), request_timeout).await?;
        fold(&mut tables, param, outcomes);
    }
    Ok(tables)
}

/// At most `limit` calls are in flight. This task is the only writer of the
/// error tables: it drains completions one at a time.
#[tracing::instrument(level = "debug", skip_all, fields(limit = limit))]
async fn run_bounded(
    transport: &dyn CalibrationTransport,
    params: &[CalibrationParameter],
    test_set: &TestSet,
    request_timeout: Option<Duration>,
    limit: usize,
) -> Result<ErrorTables> {
    let semaphore = Arc::new(Semaphore::new(limit));
    let mut inflight = FuturesUnordered::new();

    for param in params {
        let semaphore = semaphore.clone();
        let test_set = test_set.clone();
        inflight.push(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| Error::BackendMessage("calibration semaphore closed".to_string()))?;
            let outcomes = calibrate_one(transport, param, test_set, request_timeout).await?;
            Ok::<_, Error>((param, outcomes))
        });
    }

    let mut tables = ErrorTables::new();
    while let Some(done) = inflight.next().await {
        // Returning drops every pending call; nothing after a failure is folded.
        let (param, outcomes) = done?;
        fold(&mut tables, param, outcomes);
    }
    Ok(tables)
}

async fn calibrate_one(
    transport: &dyn CalibrationTransport,
    param: &CalibrationParameter,
    test_set: TestSet,
    request_timeout: Option<Duration>,
) -> Result<Vec<CalibrationOutcome>> {
    let req = CalibrationRequest::for_parameter(param, test_set, request_timeout);
    transport.calibrate(req).await.map_err(|e| {
        tracing::warn!(prompt = %param.prompt, model = %param.model, error = %e, "calibration call failed");
        Error::calibration(param.prompt.clone(), param.model.clone(), e)
    })
}

fn fold(tables: &mut ErrorTables, param: &CalibrationParameter, outcomes: Vec<CalibrationOutcome>) {
    tracing::debug!(
        name = %param.name,
        model = %param.model,
        outcomes = outcomes.len(),
        "folding calibration outcomes"
    );
    tables.fold_outcomes(param, outcomes);
}
