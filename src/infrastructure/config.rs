//! Application configuration management.
//!
//! Configuration is loaded once at startup from environment variables.
//! Missing optional values fall back to defaults; values that are present
//! but unusable are reported as `ConfigurationError::InvalidValue`.
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `3000`)
//! - `TODO_NAMESPACE`: Namespace holding the task list (default: `default`)
//! - `STATIC_DIR`: Directory served under `/static` (default: `public`)
//! - `SEED_TASKS`: `true` | `1` | `yes` seeds the in-memory store with two tasks

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use super::factory::ConfigurationError;
use crate::domain::{Namespace, Task, TaskId, TaskText};

/// Runtime settings of the HTTP application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP server host address.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// Namespace every route operates in.
    pub namespace: Namespace,
    /// Directory with static assets.
    pub static_dir: PathBuf,
    /// Whether to seed an in-memory store with demo tasks.
    pub seed_tasks: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            namespace: Namespace::default(),
            static_dir: PathBuf::from("public"),
            seed_tasks: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let defaults = Self::default();

        let port = match optional_env("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| ConfigurationError::InvalidValue {
                    key: "PORT".to_string(),
                    message: error.to_string(),
                })?,
            None => defaults.port,
        };

        Ok(Self {
            host: optional_env("HOST").unwrap_or(defaults.host),
            port,
            namespace: optional_env("TODO_NAMESPACE").map_or(defaults.namespace, Namespace::new),
            static_dir: optional_env("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            seed_tasks: optional_env("SEED_TASKS").is_some_and(|value| is_truthy(&value)),
        })
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigurationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|error: std::net::AddrParseError| ConfigurationError::InvalidValue {
                key: "HOST".to_string(),
                message: error.to_string(),
            })
    }

    /// Tasks inserted into an empty in-memory store when seeding is enabled.
    #[must_use]
    pub fn seed(&self) -> Vec<Task> {
        if !self.seed_tasks {
            return Vec::new();
        }
        [("Learn HTMX", false), ("Learn Vim", true)]
            .into_iter()
            .filter_map(|(text, completed)| {
                TaskText::parse(text).map(|text| {
                    Task::new(self.namespace.clone(), TaskId::generate(), text)
                        .with_completed(completed)
                })
            })
            .collect()
    }
}

/// Reads an environment variable, treating empty or whitespace-only values as absent.
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

// =============================================================================
// Tests
// =============================================================================
