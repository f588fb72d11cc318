use std::error::Error as StdError;

/// Common error type for `rootsignals_core`.
///
/// Transport implementations should preserve the underlying error chain where
/// possible via `Error::backend`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("backend error: {context}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("backend error: {0}")]
    BackendMessage(String),

    /// One evaluator definition of a calibration batch failed; the whole batch is aborted.
    #[error("calibration failed for {prompt} with model {model}")]
    Calibration {
        prompt: String,
        model: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    #[tracing::instrument(level = "debug", name = "rootsignals.error.backend", skip(source))]
    pub fn backend(
        context: impl Into<String> + std::fmt::Debug,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn calibration(prompt: impl Into<String>, model: impl Into<String>, source: Error) -> Self {
        Self::Calibration {
            prompt: prompt.into(),
            model: model.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
