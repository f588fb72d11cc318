use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// `name` within the prompt gets populated with content from `dataset_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceVariable {
    pub name: String,
    pub dataset_id: String,
}

/// `name` within the prompt gets populated with the provided variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVariable {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLoaderKind {
    Http,
    WebPage,
    Ocr,
}

/// Fetches prompt context at execution time (a URL, a page to scrape, a document to OCR).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLoader {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataLoaderKind,
    pub data: String,
}

/// One evaluator definition under test.
///
/// `name` is a human label and is not required to be unique within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParameter {
    pub name: String,
    pub prompt: String,
    pub model: String,
    #[serde(default)]
    pub pii_filter: bool,
    #[serde(default)]
    pub reference_variables: Option<Vec<ReferenceVariable>>,
    #[serde(default)]
    pub input_variables: Option<Vec<InputVariable>>,
    #[serde(default)]
    pub data_loaders: Option<Vec<DataLoader>>,
}

impl CalibrationParameter {
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            model: model.into(),
            pii_filter: false,
            reference_variables: None,
            input_variables: None,
            data_loaders: None,
        }
    }

    pub fn with_pii_filter(mut self, pii_filter: bool) -> Self {
        self.pii_filter = pii_filter;
        self
    }

    pub fn with_reference_variables(mut self, vars: Vec<ReferenceVariable>) -> Self {
        self.reference_variables = Some(vars);
        self
    }

    pub fn with_input_variables(mut self, vars: Vec<InputVariable>) -> Self {
        self.input_variables = Some(vars);
        self
    }

    pub fn with_data_loaders(mut self, loaders: Vec<DataLoader>) -> Self {
        self.data_loaders = Some(loaders);
        self
    }
}

/// Scored row as returned by the service. Only `score` and `expected_score`
/// feed the error statistics; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub expected_score: Option<f64>,
    #[serde(default)]
    pub llm_output: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub rendered_prompt: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub execution_log_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOutcome {
    pub result: CalibrationResult,
    #[serde(default)]
    pub row_number: Option<i64>,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl CalibrationOutcome {
    pub fn scored(score: Option<f64>, expected_score: Option<f64>) -> Self {
        Self {
            result: CalibrationResult {
                score,
                expected_score,
                ..CalibrationResult::default()
            },
            ..Self::default()
        }
    }

    /// Missing scores count as zero.
    pub fn score(&self) -> f64 {
        self.result.score.unwrap_or(0.0)
    }

    /// Missing expected scores count as zero.
    pub fn expected_score(&self) -> f64 {
        self.result.expected_score.unwrap_or(0.0)
    }
}

/// The examples every definition of a batch is scored against.
///
/// `Rows` entries are `[expected_score, ...columns]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSet {
    Dataset(String),
    Rows(Vec<Vec<String>>),
}

impl TestSet {
    /// Exactly one of the two must be supplied. Empty values count as absent.
    pub fn from_options(
        test_dataset_id: Option<String>,
        test_data: Option<Vec<Vec<String>>>,
    ) -> Result<Self> {
        let dataset = test_dataset_id.filter(|id| !id.trim().is_empty());
        let rows = test_data.filter(|rows| !rows.is_empty());
        match (dataset, rows) {
            (Some(_), Some(_)) => Err(Error::InvalidInput(
                "only one of test_dataset_id or test_data must be provided".to_string(),
            )),
            (None, None) => Err(Error::InvalidInput(
                "either test_dataset_id or test_data must be provided".to_string(),
            )),
            (Some(id), None) => Ok(Self::Dataset(id)),
            (None, Some(rows)) => Ok(Self::Rows(rows)),
        }
    }

    pub fn dataset_id(&self) -> Option<&str> {
        match self {
            Self::Dataset(id) => Some(id),
            Self::Rows(_) => None,
        }
    }

    pub fn rows(&self) -> Option<&[Vec<String>]> {
        match self {
            Self::Dataset(_) => None,
            Self::Rows(rows) => Some(rows),
        }
    }
}

/// Everything a single transport round trip needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationRequest {
    pub name: String,
    pub prompt: String,
    pub model: String,
    pub pii_filter: bool,
    pub reference_variables: Option<Vec<ReferenceVariable>>,
    pub input_variables: Option<Vec<InputVariable>>,
    pub data_loaders: Option<Vec<DataLoader>>,
    pub test_set: TestSet,
    pub request_timeout: Option<Duration>,
}

impl CalibrationRequest {
    pub fn for_parameter(
        param: &CalibrationParameter,
        test_set: TestSet,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            name: param.name.clone(),
            prompt: param.prompt.clone(),
            model: param.model.clone(),
            pii_filter: param.pii_filter,
            reference_variables: param.reference_variables.clone(),
            input_variables: param.input_variables.clone(),
            data_loaders: param.data_loaders.clone(),
            test_set,
            request_timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrateBatchRequest {
    pub evaluator_definitions: Vec<CalibrationParameter>,
    pub test_dataset_id: Option<String>,
    pub test_data: Option<Vec<Vec<String>>>,
    /// 1 runs definitions one at a time; larger values bound the number in flight.
    pub parallel_requests: usize,
    pub request_timeout: Option<Duration>,
}

impl CalibrateBatchRequest {
    pub fn new(evaluator_definitions: Vec<CalibrationParameter>) -> Self {
        Self {
            evaluator_definitions,
            test_dataset_id: None,
            test_data: None,
            parallel_requests: 1,
            request_timeout: None,
        }
    }

    pub fn with_test_dataset_id(mut self, id: impl Into<String>) -> Self {
        self.test_dataset_id = Some(id.into());
        self
    }

    pub fn with_test_data(mut self, rows: Vec<Vec<String>>) -> Self {
        self.test_data = Some(rows);
        self
    }

    pub fn with_parallel_requests(mut self, n: usize) -> Self {
        self.parallel_requests = n;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrateBatchResult {
    /// Rows in the order their definitions completed.
    pub results: Vec<CalibrationOutcome>,
    pub rms_errors_model: BTreeMap<String, f64>,
    pub mae_errors_model: BTreeMap<String, f64>,
    pub rms_errors_prompt: BTreeMap<String, f64>,
    pub mae_errors_prompt: BTreeMap<String, f64>,
}
