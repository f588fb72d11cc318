mod common;

use std::sync::Arc;

use common::{API_KEY, MockApi, client, evaluator, start_server};
use futures_util::TryStreamExt;
use rootsignals_rs::{
    EvaluatorExecutionRequest, EvaluatorListParams, PresetEvaluator, RootSignalsClient,
    RootSignalsErrorKind,
};

#[tokio::test]
async fn run_sends_api_key_user_agent_and_payload() {
    let api = Arc::new(MockApi::default());
    let addr = start_server(api.clone()).await;

    let payload = EvaluatorExecutionRequest::response("Sunny, 24 degrees.")
        .with_request(common::PROMPT)
        .with_contexts(vec!["Forecast: sunny".to_string()]);
    let result = client(addr)
        .evaluators()
        .run("e1", payload, None)
        .await
        .unwrap();
    assert_eq!(result.score, Some(0.9));
    assert_eq!(result.execution_log_id.as_deref(), Some("log-1"));

    let calls = api.recorded("/v1/evaluators/execute/e1/");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].authorization.as_deref(), Some(format!("Api-Key {API_KEY}").as_str()));
    assert!(calls[0].user_agent.as_deref().unwrap().starts_with("rs-rust-sdk/"));
    assert_eq!(calls[0].body["response"], "Sunny, 24 degrees.");
    assert_eq!(calls[0].body["contexts"][0], "Forecast: sunny");
    assert!(calls[0].body.get("expected_output").is_none());
}

#[tokio::test]
async fn run_without_request_or_response_is_rejected_locally() {
    let api = Arc::new(MockApi::default());
    let addr = start_server(api.clone()).await;

    let err = client(addr)
        .evaluators()
        .run("e1", EvaluatorExecutionRequest::default(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, RootSignalsErrorKind::Validation);
    assert_eq!(err.status, None);
    assert!(api.recorded("/").is_empty());
}

#[tokio::test]
async fn wrong_api_key_maps_to_auth_error() {
    let api = Arc::new(MockApi::default());
    let addr = start_server(api.clone()).await;

    let bad = RootSignalsClient::new("not-the-key", format!("http://{addr}"));
    let err = bad
        .evaluators()
        .run("e1", EvaluatorExecutionRequest::response("x"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, RootSignalsErrorKind::Auth);
    assert_eq!(err.status, Some(401));
    assert!(err.message.contains("Invalid API key"));
}

#[tokio::test]
async fn run_by_name_and_preset_hit_the_right_endpoints() {
    let api = Arc::new(MockApi::default());
    let addr = start_server(api.clone()).await;
    let evaluators = client(addr).evaluators();

    let result = evaluators
        .run_by_name("My evaluator", EvaluatorExecutionRequest::response("ok"), None)
        .await
        .unwrap();
    assert_eq!(result.evaluator_name.as_deref(), Some("My evaluator"));
    let calls = api.recorded("/v1/evaluators/execute/by-name/");
    assert_eq!(calls[0].query["name"], "My evaluator");

    let clarity = PresetEvaluator::Clarity;
    let result = evaluators
        .preset(clarity)
        .with_version("v7")
        .run(EvaluatorExecutionRequest::response("Paris."), None)
        .await
        .unwrap();
    assert_eq!(result.score, Some(0.9));
    let path = format!("/v1/evaluators/execute/{}/", clarity.id());
    let calls = api.recorded(&path);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body["evaluator_version_id"], "v7");
}

#[tokio::test]
async fn list_follows_cursors_up_to_the_limit() {
    let evaluators: Vec<_> = (0..5)
        .map(|i| evaluator(&format!("e{i}"), &format!("Evaluator {i}")))
        .collect();
    let api = Arc::new(MockApi::default().with_evaluators(evaluators));
    let addr = start_server(api.clone()).await;
    let sdk = client(addr).evaluators();

    let all: Vec<_> = sdk
        .list(EvaluatorListParams::default(), 100)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[4].id, "e4");
    assert!(all[0].created_at.is_some());

    let first_three: Vec<_> = sdk
        .list(
            EvaluatorListParams {
                search: Some("Evaluator".to_string()),
                ..EvaluatorListParams::default()
            },
            3,
        )
        .try_collect()
        .await
        .unwrap();
    let ids: Vec<_> = first_three.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e0", "e1", "e2"]);

    let calls = api.recorded("/v1/evaluators/");
    let last = calls.last().unwrap();
    assert_eq!(last.query["page_size"], "1");
    assert_eq!(last.query["cursor"], "2");
    assert_eq!(last.query["search"], "Evaluator");
}

#[tokio::test]
async fn list_asks_for_the_remaining_count_on_each_page() {
    let evaluators: Vec<_> = (0..7)
        .map(|i| evaluator(&format!("e{i}"), "Same"))
        .collect();
    let api = Arc::new(MockApi::default().with_evaluators(evaluators));
    let addr = start_server(api.clone()).await;

    let items: Vec<_> = client(addr)
        .evaluators()
        .list(EvaluatorListParams::default(), 7)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(items.len(), 7);
    assert_eq!(items[6].id, "e6");

    let calls = api.recorded("/v1/evaluators/");
    let sizes: Vec<_> = calls.iter().map(|c| c.query["page_size"].as_str()).collect();
    let cursors: Vec<_> = calls
        .iter()
        .map(|c| c.query.get("cursor").map(String::as_str))
        .collect();
    assert_eq!(sizes, ["7", "5", "3", "1"]);
    assert_eq!(cursors, [None, Some("2"), Some("4"), Some("6")]);
}

#[tokio::test]
async fn get_and_get_by_name() {
    let api = Arc::new(MockApi::default().with_evaluators(vec![
        evaluator("e1", "Clarity"),
        evaluator("e2", "Precision"),
    ]));
    let addr = start_server(api.clone()).await;
    let sdk = client(addr).evaluators();

    let found = sdk.get("e2").await.unwrap();
    assert_eq!(found.name, "Precision");
    assert_eq!(found.models, ["gpt-4o"]);

    let by_name = sdk.get_by_name("Clarity").await.unwrap();
    assert_eq!(by_name.id, "e1");

    let err = sdk.get("nope").await.unwrap_err();
    assert_eq!(err.kind, RootSignalsErrorKind::NotFound);
    assert_eq!(err.status, Some(404));

    let err = sdk.get_by_name("Sarcasm").await.unwrap_err();
    assert_eq!(err.kind, RootSignalsErrorKind::NotFound);
    assert_eq!(err.status, None);
}
