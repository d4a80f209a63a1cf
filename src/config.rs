use std::env;
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::logging::default_log_path;
use crate::session::default_session_path;

pub const DEFAULT_EXPORT_PATH: &str = "voltrix_roster.xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    pub session_path: Option<PathBuf>,
    pub log_path: PathBuf,
    pub export_path: String,
}

impl Config {
    /// Reads the process environment; call after the dotenv files are loaded.
    pub fn from_env() -> Result<Self> {
        let api_base = env::var("VOLTRIX_API_BASE").unwrap_or_default();
        Ok(Self {
            api_base: normalize_base(&api_base)?,
            session_path: default_session_path(),
            log_path: default_log_path(),
            export_path: env::var("ROSTER_EXPORT_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string()),
        })
    }
}

pub fn normalize_base(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/');
    if base.is_empty() {
        bail!("VOLTRIX_API_BASE is not set");
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        bail!("VOLTRIX_API_BASE must be an http(s) URL, got {base:?}");
    }
    Ok(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed() {
        assert_eq!(
            normalize_base(" https://api.voltrix.gg/v1/ ").unwrap(),
            "https://api.voltrix.gg/v1"
        );
    }

    #[test]
    fn missing_or_bad_base_is_rejected() {
        assert!(normalize_base("").is_err());
        assert!(normalize_base("api.voltrix.gg").is_err());
    }
}
