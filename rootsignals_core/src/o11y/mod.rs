pub mod traits;

use crate::o11y::traits::{LogFormat, O11yConfig};
use crate::{Error, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

#[tracing::instrument(level = "info", skip_all)]
pub fn init_global_from_env() -> Result<()> {
    let cfg = O11yConfig::from_env()?;
    init_global(cfg)
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `cfg.default_filter`. Calling this twice returns
/// `Error::Conflict` rather than panicking.
#[tracing::instrument(level = "info", skip_all)]
pub fn init_global(cfg: O11yConfig) -> Result<()> {
    cfg.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.default_filter))
        .map_err(|e| Error::InvalidInput(format!("invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cfg.with_target)
        .with_writer(std::io::stderr);

    let res = match cfg.format {
        LogFormat::Json => builder.json().finish().try_init(),
        LogFormat::Pretty => builder.finish().try_init(),
    };
    res.map_err(|e| Error::Conflict(format!("tracing already initialized: {e}")))
}
