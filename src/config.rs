//! Runtime configuration from environment variables.

use std::env;

use crate::constants::DEFAULT_BLUNDER_THRESHOLD;
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Reject setup stones that arrive without liberties.
    pub strict_placements: bool,

    /// Win-rate drop that counts as a blunder.
    pub blunder_threshold: f64,

    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_placements: false,
            blunder_threshold: DEFAULT_BLUNDER_THRESHOLD,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `KIFU_STRICT_PLACEMENTS`,
    /// `KIFU_BLUNDER_THRESHOLD` and `RUST_LOG`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Config::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("KIFU_STRICT_PLACEMENTS") {
            config.strict_placements = parse_flag(&v).ok_or_else(|| {
                Error::Config(format!("KIFU_STRICT_PLACEMENTS must be a boolean, got {v:?}"))
            })?;
        }

        if let Some(v) = lookup("KIFU_BLUNDER_THRESHOLD") {
            config.blunder_threshold = parse_threshold(&v)?;
        }

        if let Some(v) = lookup("RUST_LOG") {
            config.log_filter = v;
        }

        Ok(config)
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Parse a blunder threshold in `(0, 1]`.
pub fn parse_threshold(v: &str) -> Result<f64> {
    match v.trim().parse::<f64>() {
        Ok(t) if t > 0.0 && t <= 1.0 => Ok(t),
        _ => Err(Error::Config(format!(
            "blunder threshold must be in (0, 1], got {v:?}"
        ))),
    }
}
