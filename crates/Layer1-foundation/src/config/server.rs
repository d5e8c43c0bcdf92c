//! Tool server launch settings
//!
//! ```json
//! {
//!   "command": "toolrelay-server",
//!   "args": [],
//!   "env": { "API_TOKEN": "${TOKEN:-none}" }
//! }
//! ```

use crate::{Error, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// How to launch the tool server child process
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Executable path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Command arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Working directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Environment variables (`${VAR}` / `${VAR:-default}` expanded at launch)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl ServerConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Default::default()
        }
    }

    // === Builder methods ===

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.cwd = Some(path.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Executable path, or a config error when none was given
    pub fn command(&self) -> Result<&str> {
        match self.command.as_deref().map(str::trim) {
            Some(cmd) if !cmd.is_empty() => Ok(cmd),
            _ => Err(Error::Config("server requires a 'command'".to_string())),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.command().map(|_| ())
    }

    /// Environment with `${VAR}` and `${VAR:-default}` expanded
    pub fn expand_env(&self) -> HashMap<String, String> {
        self.env
            .iter()
            .map(|(k, v)| (k.clone(), expand_env_var(v)))
            .collect()
    }

    /// Overlay `later` on top of `self`
    pub fn merge(self, later: ServerConfig) -> ServerConfig {
        ServerConfig {
            command: later.command.or(self.command),
            args: if later.args.is_empty() {
                self.args
            } else {
                later.args
            },
            cwd: later.cwd.or(self.cwd),
            env: {
                let mut merged = self.env;
                merged.extend(later.env);
                merged
            },
        }
    }
}

fn default_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}:]+):-([^}]*)\}").expect("valid regex"))
}

fn simple_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"))
}

fn expand_env_var(value: &str) -> String {
    let result = default_pattern().replace_all(value, |caps: &Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[2].to_string())
    });

    simple_pattern()
        .replace_all(&result, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_command() {
        assert!(ServerConfig::default().validate().is_err());
        assert!(ServerConfig::new("  ").validate().is_err());
        assert!(ServerConfig::new("toolrelay-server").validate().is_ok());
    }

    #[test]
    fn test_expand_env() {
        std::env::set_var("TOOLRELAY_TEST_TOKEN", "abc");
        let config = ServerConfig::new("srv")
            .env("TOKEN", "${TOOLRELAY_TEST_TOKEN}")
            .env("FALLBACK", "${TOOLRELAY_TEST_UNSET_VAR:-fallback}")
            .env("MISSING", "x${TOOLRELAY_TEST_UNSET_VAR}y");

        let env = config.expand_env();
        assert_eq!(env["TOKEN"], "abc");
        assert_eq!(env["FALLBACK"], "fallback");
        assert_eq!(env["MISSING"], "xy");
    }

    #[test]
    fn test_merge_overrides() {
        let base = ServerConfig::new("a").arg("one").env("K1", "v1");
        let overlay = ServerConfig {
            command: Some("b".to_string()),
            env: HashMap::from([("K2".to_string(), "v2".to_string())]),
            ..Default::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.command.as_deref(), Some("b"));
        assert_eq!(merged.args, vec!["one".to_string()]);
        assert_eq!(merged.env.len(), 2);
    }
}
