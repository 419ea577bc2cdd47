use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diagnostics::LintError;

pub const CONFIG_FILE_NAME: &str = "resultlint.toml";

/// Members a type must expose to count as a result.
pub const DEFAULT_RESULT_MEMBERS: [&str; 6] = ["mapErr", "map", "andThen", "orElse", "match", "unwrapOr"];
/// Calls that terminate a result chain.
pub const DEFAULT_HANDLER_METHODS: [&str; 3] = ["match", "unwrapOr", "_unsafeUnwrap"];
pub const DEFAULT_GUARD_METHODS: [&str; 2] = ["isOk", "isErr"];

/// Where an invoked `isOk()` / `isErr()` on a variable counts as checking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardPolicy {
    /// Only when the call decides a branch: the test of an `if`, `while` or `?:`,
    /// possibly through `!`, `&&` and `||`.
    #[default]
    Controlling,
    /// Every invoked guard.
    Anywhere,
}

/// Options of the `must-use-result` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOptions {
    pub enabled: bool,
    pub result_members: Vec<String>,
    /// Also require the guard methods on a type before treating it as a result.
    pub require_guard_members: bool,
    pub handler_methods: Vec<String>,
    pub guard_methods: Vec<String>,
    pub guard_policy: GuardPolicy,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            result_members: DEFAULT_RESULT_MEMBERS.iter().map(|s| s.to_string()).collect(),
            require_guard_members: false,
            handler_methods: DEFAULT_HANDLER_METHODS.iter().map(|s| s.to_string()).collect(),
            guard_methods: DEFAULT_GUARD_METHODS.iter().map(|s| s.to_string()).collect(),
            guard_policy: GuardPolicy::default(),
        }
    }
}

impl RuleOptions {
    /// Members checked by the producer classifier.
    pub fn required_members(&self) -> impl Iterator<Item = &str> {
        let guards = if self.require_guard_members { self.guard_methods.as_slice() } else { &[] };
        self.result_members.iter().chain(guards).map(String::as_str)
    }

    pub fn is_handler(&self, name: &str) -> bool {
        self.handler_methods.iter().any(|h| h == name)
    }

    pub fn is_guard(&self, name: &str) -> bool {
        self.guard_methods.iter().any(|g| g == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub must_use_result: RuleOptions,
    /// File the configuration was read from, if any.
    pub source: Option<PathBuf>,
}

// ---- TOML deserialization types ----

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    rules: BTreeMap<String, toml::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct TomlMustUseResult {
    enabled: Option<bool>,
    result_members: Option<Vec<String>>,
    require_guard_members: Option<bool>,
    handler_methods: Option<Vec<String>>,
    guard_methods: Option<Vec<String>>,
    guard_policy: Option<GuardPolicy>,
}

impl Config {
    /// Parse configuration text. `path` is only used in error messages.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, LintError> {
        let parsed: TomlConfig = toml::from_str(content).map_err(|e| {
            LintError::config(format!("{CONFIG_FILE_NAME}: invalid syntax: {e}"), path.to_path_buf())
        })?;

        let mut config = Config { source: Some(path.to_path_buf()), ..Config::default() };
        for (name, value) in parsed.rules {
            if name != crate::rules::must_use_result::RULE_NAME {
                return Err(LintError::config(
                    format!("{CONFIG_FILE_NAME}: unknown rule '{name}'"),
                    path.to_path_buf(),
                ));
            }
            let table = value.try_into::<TomlMustUseResult>().map_err(|e| {
                LintError::config(format!("{CONFIG_FILE_NAME}: [rules.{name}]: {e}"), path.to_path_buf())
            })?;
            apply(&mut config.must_use_result, table, path)?;
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, LintError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LintError::config(format!("{CONFIG_FILE_NAME}: could not read file: {e}"), path.to_path_buf())
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Resolve the configuration for a run: an explicit file wins, then
    /// `resultlint.toml` next to the first input, then the working directory.
    /// No file at all means defaults.
    pub fn discover(explicit: Option<&Path>, first_input: Option<&Path>) -> Result<Self, LintError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let beside_input = first_input
            .and_then(|p| p.parent())
            .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir })
            .map(|dir| dir.join(CONFIG_FILE_NAME));
        let in_cwd = std::env::current_dir().ok().map(|dir| dir.join(CONFIG_FILE_NAME));
        for candidate in beside_input.into_iter().chain(in_cwd) {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }
}

fn apply(options: &mut RuleOptions, table: TomlMustUseResult, path: &Path) -> Result<(), LintError> {
    let non_empty = |field: &str, list: Vec<String>| {
        if list.is_empty() || list.iter().any(|s| s.trim().is_empty()) {
            Err(LintError::config(
                format!("{CONFIG_FILE_NAME}: '{field}' must be a non-empty list of member names"),
                path.to_path_buf(),
            ))
        } else {
            Ok(list)
        }
    };

    if let Some(enabled) = table.enabled {
        options.enabled = enabled;
    }
    if let Some(members) = table.result_members {
        options.result_members = non_empty("result-members", members)?;
    }
    if let Some(require) = table.require_guard_members {
        options.require_guard_members = require;
    }
    if let Some(handlers) = table.handler_methods {
        options.handler_methods = non_empty("handler-methods", handlers)?;
    }
    if let Some(guards) = table.guard_methods {
        options.guard_methods = guards;
    }
    if let Some(policy) = table.guard_policy {
        options.guard_policy = policy;
    }
    Ok(())
}
