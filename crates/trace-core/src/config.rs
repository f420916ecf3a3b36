//! Trace configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::correlate::BuiltInRulePolicy;
use crate::error::{Error, Result};
use crate::event::DetailLevel;

/// Default report section name
pub const DEFAULT_REPORT_NAME: &str = "XSLT Trace";

/// Settings for one traced transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceConfig {
    pub detail_level: DetailLevel,
    pub built_in_rules: BuiltInRulePolicy,
    pub show_separator: bool,
    pub report_name: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::High,
            built_in_rules: BuiltInRulePolicy::Skip,
            show_separator: true,
            report_name: DEFAULT_REPORT_NAME.to_string(),
        }
    }
}

/// On-disk shape; the detail level is checked after parsing so that a bad
/// value surfaces as [`Error::InvalidDetailLevel`].
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    detail_level: u8,
    built_in_rules: BuiltInRulePolicy,
    show_separator: bool,
    report_name: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        let defaults = TraceConfig::default();
        Self {
            detail_level: defaults.detail_level.into(),
            built_in_rules: defaults.built_in_rules,
            show_separator: defaults.show_separator,
            report_name: defaults.report_name,
        }
    }
}

impl TraceConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        Ok(Self {
            detail_level: DetailLevel::try_from(raw.detail_level)?,
            built_in_rules: raw.built_in_rules,
            show_separator: raw.show_separator,
            report_name: raw.report_name,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_detail_level(mut self, detail_level: DetailLevel) -> Self {
        self.detail_level = detail_level;
        self
    }

    pub fn with_built_in_rules(mut self, policy: BuiltInRulePolicy) -> Self {
        self.built_in_rules = policy;
        self
    }
}
