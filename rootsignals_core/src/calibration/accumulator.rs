use super::models::{CalibrateBatchResult, CalibrationOutcome, CalibrationParameter};
use std::collections::BTreeMap;

/// Running error sums for one model or one prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorAccumulator {
    pub sum_squared_errors: f64,
    pub abs_errors: f64,
    pub count: u64,
}

impl ErrorAccumulator {
    pub fn fold(&mut self, score: f64, expected_score: f64) {
        let diff = score - expected_score;
        self.sum_squared_errors += diff * diff;
        self.abs_errors += diff.abs();
        self.count += 1;
    }

    pub fn rms(&self) -> Option<f64> {
        (self.count > 0).then(|| (self.sum_squared_errors / self.count as f64).sqrt())
    }

    pub fn mae(&self) -> Option<f64> {
        (self.count > 0).then(|| self.abs_errors / self.count as f64)
    }
}

/// Model-keyed and prompt-keyed marginals. No cross-tabulation.
///
/// Owned by exactly one task for the whole batch; callers never share it.
#[derive(Debug, Default)]
pub struct ErrorTables {
    by_model: BTreeMap<String, ErrorAccumulator>,
    by_prompt: BTreeMap<String, ErrorAccumulator>,
    results: Vec<CalibrationOutcome>,
}

impl ErrorTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold_outcomes(&mut self, param: &CalibrationParameter, outcomes: Vec<CalibrationOutcome>) {
        for outcome in outcomes {
            let (score, expected) = (outcome.score(), outcome.expected_score());
            self.by_model
                .entry(param.model.clone())
                .or_default()
                .fold(score, expected);
            self.by_prompt
                .entry(param.prompt.clone())
                .or_default()
                .fold(score, expected);
            self.results.push(outcome);
        }
    }

    pub fn model(&self, model: &str) -> Option<&ErrorAccumulator> {
        self.by_model.get(model)
    }

    pub fn prompt(&self, prompt: &str) -> Option<&ErrorAccumulator> {
        self.by_prompt.get(prompt)
    }

    pub fn finish(self) -> CalibrateBatchResult {
        CalibrateBatchResult {
            rms_errors_model: collect(&self.by_model, ErrorAccumulator::rms),
            mae_errors_model: collect(&self.by_model, ErrorAccumulator::mae),
            rms_errors_prompt: collect(&self.by_prompt, ErrorAccumulator::rms),
            mae_errors_prompt: collect(&self.by_prompt, ErrorAccumulator::mae),
            results: self.results,
        }
    }
}

// Keys with a zero count are dropped here.
fn collect(
    table: &BTreeMap<String, ErrorAccumulator>,
    stat: fn(&ErrorAccumulator) -> Option<f64>,
) -> BTreeMap<String, f64> {
    table
        .iter()
        .filter_map(|(k, acc)| stat(acc).map(|v| (k.clone(), v)))
        .collect()
}
