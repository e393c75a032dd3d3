//! Environment handed to dispatched actions.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{MonitorError, Result};

/// Variable carrying the firing trigger's threshold.
pub const THRESHOLD_VAR: &str = "THRESHOLD";

/// Ordered name/value mapping passed to every action.
///
/// Seeded once at startup and updated in place with history variables on
/// every pass. Never reset while the engine lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment. Variables that are not
    /// valid UTF-8 are skipped.
    pub fn from_host() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Merge `KEY=VALUE` lines from an env file, overwriting existing keys.
    pub fn load_env_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            MonitorError::config_error(format!(
                "cannot read env file {}: {}",
                path.display(),
                e
            ))
        })?;

        for item in iter {
            let (key, value) = item.map_err(|e| {
                MonitorError::config_error(format!(
                    "invalid line in env file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            self.vars.insert(key, value);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Insert every pair, overwriting keys that already exist.
    pub fn merge<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.set(key, value);
        }
    }

    /// Per-call copy with `THRESHOLD` set to `threshold`.
    pub fn with_threshold(&self, threshold: f64) -> Self {
        let mut env = self.clone();
        env.set(THRESHOLD_VAR, threshold.to_string());
        env
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Environment::new();
        env.merge(iter);
        env
    }
}
