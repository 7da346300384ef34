//! Runtime configuration loaded from the environment.

use std::env;

/// Default ceiling on simultaneously live holders.
pub const DEFAULT_MAX_LIVE: usize = 1 << 20;

/// Output format for the tracing subscriber.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct ObjCfg {
    /// `tracing` filter directive, e.g. `warn` or `object_ffi=debug`.
    pub log_filter: String,
    pub log_format: LogFormat,
    /// Maximum number of holders alive at once.
    pub max_live: usize,
}

impl Default for ObjCfg {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            log_format: LogFormat::Text,
            max_live: DEFAULT_MAX_LIVE,
        }
    }
}

impl ObjCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup; unset or malformed
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_filter = lookup("OBJECT_FFI_LOG")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.log_filter);

        let log_format = match lookup("OBJECT_FFI_LOG_FORMAT").as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let max_live = lookup("OBJECT_FFI_MAX_LIVE")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.max_live);

        Self {
            log_filter,
            log_format,
            max_live,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn cfg_from(pairs: &[(&str, &str)]) -> ObjCfg {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ObjCfg::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = cfg_from(&[]);
        assert_eq!(cfg.log_filter, "warn");
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.max_live, DEFAULT_MAX_LIVE);
    }

    #[test]
    fn reads_overrides() {
        let cfg = cfg_from(&[
            ("OBJECT_FFI_LOG", "object_ffi=debug"),
            ("OBJECT_FFI_LOG_FORMAT", "JSON"),
            ("OBJECT_FFI_MAX_LIVE", " 16 "),
        ]);
        assert_eq!(cfg.log_filter, "object_ffi=debug");
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.max_live, 16);
    }

    #[test]
    fn malformed_limit_falls_back() {
        assert_eq!(cfg_from(&[("OBJECT_FFI_MAX_LIVE", "lots")]).max_live, DEFAULT_MAX_LIVE);
        assert_eq!(cfg_from(&[("OBJECT_FFI_MAX_LIVE", "0")]).max_live, DEFAULT_MAX_LIVE);
        assert_eq!(cfg_from(&[("OBJECT_FFI_LOG", "  ")]).log_filter, "warn");
    }
}
