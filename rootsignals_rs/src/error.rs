use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSignalsErrorKind {
    NotFound,
    Auth,
    RateLimited,
    Validation,
    Server,
    Transport,
    Serialization,
    Config,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct RootSignalsError {
    pub kind: RootSignalsErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl RootSignalsError {
    pub fn new(kind: RootSignalsErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(RootSignalsErrorKind::Validation, None, message)
    }

    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let kind = match code {
            404 => RootSignalsErrorKind::NotFound,
            401 | 403 => RootSignalsErrorKind::Auth,
            429 => RootSignalsErrorKind::RateLimited,
            400..=499 => RootSignalsErrorKind::Validation,
            _ => RootSignalsErrorKind::Server,
        };
        Self::new(kind, Some(code), message)
    }
}

impl From<reqwest::Error> for RootSignalsError {
    fn from(e: reqwest::Error) -> Self {
        RootSignalsError::new(RootSignalsErrorKind::Transport, None, e.to_string())
    }
}

impl From<serde_json::Error> for RootSignalsError {
    fn from(e: serde_json::Error) -> Self {
        RootSignalsError::new(RootSignalsErrorKind::Serialization, None, e.to_string())
    }
}

impl From<rootsignals_core::Error> for RootSignalsError {
    fn from(e: rootsignals_core::Error) -> Self {
        // Keep the full chain so the failing prompt/model stays visible.
        let mut message = e.to_string();
        let mut api_error: Option<&RootSignalsError> = None;
        let mut source = std::error::Error::source(&e);
        while let Some(s) = source {
            message.push_str(": ");
            message.push_str(&s.to_string());
            api_error = api_error.or_else(|| s.downcast_ref::<RootSignalsError>());
            source = s.source();
        }
        // An API error anywhere in the chain decides kind and status.
        let (kind, status) = match api_error {
            Some(api) => (api.kind, api.status),
            None => (core_kind(&e), None),
        };
        RootSignalsError::new(kind, status, message)
    }
}

fn core_kind(e: &rootsignals_core::Error) -> RootSignalsErrorKind {
    use rootsignals_core::Error as CoreError;
    match e {
        CoreError::InvalidInput(_) => RootSignalsErrorKind::Validation,
        CoreError::NotFound(_) => RootSignalsErrorKind::NotFound,
        CoreError::Unauthorized(_) => RootSignalsErrorKind::Auth,
        CoreError::Conflict(_) => RootSignalsErrorKind::Config,
        CoreError::Calibration { source, .. } => core_kind(source),
        CoreError::Backend { .. } | CoreError::BackendMessage(_) => RootSignalsErrorKind::Server,
    }
}

/// Local validation failures become `InvalidInput`; everything else keeps the
/// API error as its source so kind and status survive the round trip.
impl From<RootSignalsError> for rootsignals_core::Error {
    fn from(e: RootSignalsError) -> Self {
        match e.kind {
            RootSignalsErrorKind::Validation if e.status.is_none() => {
                rootsignals_core::Error::InvalidInput(e.message)
            }
            _ => rootsignals_core::Error::backend("root signals api", e),
        }
    }
}
