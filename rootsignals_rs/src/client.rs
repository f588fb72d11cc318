use crate::error::{RootSignalsError, RootSignalsErrorKind};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.app.rootsignals.ai";
pub const API_KEY_ENV: &str = "ROOTSIGNALS_API_KEY";
pub const BASE_URL_ENV: &str = "ROOTSIGNALS_API_URL";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Applied to every request unless a call passes its own timeout.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: format!("rs-rust-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RootSignalsClient {
    base_url: String,
    api_key: String,
    opts: ClientOptions,
    http: reqwest::Client,
}

impl RootSignalsClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
            opts: ClientOptions::default(),
            http: reqwest::Client::new(),
        }
    }

    /// Resolves the API key from the environment or a `.env` file in the
    /// working directory, and the base URL from `ROOTSIGNALS_API_URL`.
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self, RootSignalsError> {
        Self::configured(None, None)
    }

    /// Explicit values win over the environment; the key falls back to `.env`.
    #[tracing::instrument(level = "debug", skip(api_key))]
    pub fn configured(
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, RootSignalsError> {
        let api_key = resolve_api_key(
            api_key,
            std::env::var(API_KEY_ENV).ok(),
            Path::new(".env"),
        )?;
        let base_url = base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(api_key, base_url))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = Some(timeout);
        self
    }

    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Result<HeaderMap, RootSignalsError> {
        fn value(v: &str) -> Result<HeaderValue, RootSignalsError> {
            HeaderValue::from_str(v).map_err(|e| {
                RootSignalsError::new(RootSignalsErrorKind::Serialization, None, e.to_string())
            })
        }

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value(&format!("Api-Key {}", self.api_key))?);
        headers.insert(USER_AGENT, value(&self.opts.user_agent)?);
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&impl Serialize>,
        body: Option<&impl Serialize>,
        timeout: Option<Duration>,
    ) -> Result<Response, RootSignalsError> {
        let mut req = self.http.request(method, self.url(path));
        if let Some(q) = query {
            req = req.query(q);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        if let Some(t) = timeout.or(self.opts.timeout) {
            req = req.timeout(t);
        }
        req = req.headers(self.headers()?);
        Ok(req.send().await?)
    }

    pub(crate) async fn map_error(&self, resp: Response) -> RootSignalsError {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        RootSignalsError::from_status(
            status.as_u16(),
            if text.is_empty() {
                status.to_string()
            } else {
                text
            },
        )
    }

    #[tracing::instrument(level = "debug", skip(self, query, body))]
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&impl Serialize>,
        body: Option<&impl Serialize>,
        timeout: Option<Duration>,
    ) -> Result<T, RootSignalsError> {
        let resp = self.send(method, path, query, body, timeout).await?;
        if resp.status().is_success() {
            if resp.status().as_u16() == 204 {
                // Can't deserialize an empty body.
                return Ok(serde_json::from_value(Value::Null)?);
            }
            return Ok(resp.json::<T>().await?);
        }
        let err = self.map_error(resp).await;
        tracing::debug!(status = ?err.status, kind = ?err.kind, "root signals api error");
        Err(err)
    }

    pub fn evaluators(&self) -> crate::apis::EvaluatorsApi {
        crate::apis::EvaluatorsApi::new(self.clone())
    }
}

/// Explicit key, then the environment value, then a `ROOTSIGNALS_API_KEY=` line in `dot_env`.
pub fn resolve_api_key(
    explicit: Option<String>,
    from_env: Option<String>,
    dot_env: &Path,
) -> Result<String, RootSignalsError> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    if let Some(key) = non_empty(explicit).or_else(|| non_empty(from_env)) {
        return Ok(key);
    }
    if let Ok(contents) = std::fs::read_to_string(dot_env) {
        if let Some(key) = contents.lines().find_map(parse_dot_env_line) {
            return Ok(key);
        }
    }
    Err(RootSignalsError::new(
        RootSignalsErrorKind::Config,
        None,
        format!(
            "Root Signals API key cannot be found. Pass it to the client, set {API_KEY_ENV}, \
             or add a `{API_KEY_ENV}=<key>` line to .env"
        ),
    ))
}

fn parse_dot_env_line(line: &str) -> Option<String> {
    let (name, value) = line.split_once('=')?;
    if name.trim() != API_KEY_ENV {
        return None;
    }
    let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
    (!value.is_empty() && !value.contains(char::is_whitespace)).then(|| value.to_string())
}
