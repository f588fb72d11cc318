use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[tracing::instrument(level = "debug")]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" | "text" | "human" => Some(Self::Pretty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct O11yConfig {
    pub format: LogFormat,
    /// Directive used when `RUST_LOG` is unset or invalid.
    pub default_filter: String,
    pub with_target: bool,
}

impl Default for O11yConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            default_filter: "info".to_string(),
            with_target: true,
        }
    }
}

impl O11yConfig {
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        fn parse_bool(v: &str) -> bool {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "y" | "on"
            )
        }

        let mut cfg = Self::default();

        if let Some(v) = lookup("ROOTSIGNALS_LOG_FORMAT") {
            if !v.trim().is_empty() {
                cfg.format = LogFormat::parse(&v).ok_or_else(|| {
                    Error::InvalidInput(format!("invalid ROOTSIGNALS_LOG_FORMAT: {v}"))
                })?;
            }
        }

        if let Some(v) = lookup("ROOTSIGNALS_LOG_DEFAULT_FILTER") {
            if !v.trim().is_empty() {
                cfg.default_filter = v.trim().to_string();
            }
        }

        if let Some(v) = lookup("ROOTSIGNALS_LOG_TARGETS") {
            cfg.with_target = parse_bool(&v);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> Result<()> {
        if self.default_filter.trim().is_empty() {
            return Err(Error::InvalidInput(
                "default log filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_json_info() {
        let cfg = O11yConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.default_filter, "info");
        assert!(cfg.with_target);
    }

    #[test]
    fn reads_overrides() {
        let cfg = O11yConfig::from_lookup(lookup(&[
            ("ROOTSIGNALS_LOG_FORMAT", "Pretty"),
            ("ROOTSIGNALS_LOG_DEFAULT_FILTER", "rootsignals_core=debug"),
            ("ROOTSIGNALS_LOG_TARGETS", "no"),
        ]))
        .unwrap();
        assert_eq!(cfg.format, LogFormat::Pretty);
        assert_eq!(cfg.default_filter, "rootsignals_core=debug");
        assert!(!cfg.with_target);
    }

    #[test]
    fn rejects_unknown_format() {
        let err = O11yConfig::from_lookup(lookup(&[("ROOTSIGNALS_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
