//! Logging setup. The library only emits `tracing` events; a subscriber is
//! installed when the host calls `object_init`.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

use crate::common::config::{LogFormat, ObjCfg};
use crate::common::error::{ObjError, ObjResult};

static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();

/// Install the global subscriber described by `cfg`. Only the first call has
/// an effect; later calls return the first outcome.
pub fn init(cfg: &ObjCfg) -> ObjResult<()> {
    INSTALLED
        .get_or_init(|| install(cfg))
        .clone()
        .map_err(ObjError::Internal)
}

fn install(cfg: &ObjCfg) -> Result<(), String> {
    let filter = EnvFilter::try_new(&cfg.log_filter)
        .map_err(|err| format!("bad log filter `{}`: {err}", cfg.log_filter))?;

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = match cfg.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    // Another subscriber already owning the global slot is not our failure.
    if let Err(err) = installed {
        tracing::debug!(%err, "global subscriber already set");
    }
    Ok(())
}
