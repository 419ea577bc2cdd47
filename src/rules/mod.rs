//! Static rule registry.

pub mod must_use_result;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleMeta {
    pub name: &'static str,
    pub category: &'static str,
    pub recommended: Level,
    pub description: &'static str,
    /// Whether the rule cannot run without a type oracle.
    pub requires_types: bool,
}

pub static RULES: &[RuleMeta] = &[must_use_result::META];

pub fn find(name: &str) -> Option<&'static RuleMeta> {
    RULES.iter().find(|r| r.name == name)
}
