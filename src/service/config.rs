use std::time::Duration;

use crate::foundation::error::{FlowError, FlowResult};
use crate::service::retry::RetryPolicy;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection and request deadlines for the completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTimeouts {
    /// Whole-request deadline.
    pub request: Duration,
    /// TCP/TLS connect deadline.
    pub connect: Duration,
}

impl Default for ServiceTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Typed completion service configuration.
#[derive(Clone, PartialEq)]
pub struct ServiceConfig {
    /// Bearer token.
    pub api_key: String,
    /// Model name sent with every request.
    pub model: String,
    /// API base URL without trailing slash.
    pub base_url: String,
    /// Deadlines.
    pub timeouts: ServiceTimeouts,
    /// Attempt budget for transport failures.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ServiceConfig {
    /// Build config from process environment variables.
    ///
    /// Required:
    /// - `OPENAI_API_KEY`
    ///
    /// Optional:
    /// - `FLOWREEL_MODEL`: default `gpt-4o`
    /// - `FLOWREEL_BASE_URL`: default OpenAI API base URL
    /// - `FLOWREEL_REQUEST_TIMEOUT_SECS`: default 120
    /// - `FLOWREEL_CONNECT_TIMEOUT_SECS`: default 10
    /// - `FLOWREEL_MAX_ATTEMPTS`: default 1
    pub fn from_env() -> FlowResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FlowResult<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                FlowError::config(format!("{API_KEY_VAR} environment variable is not set"))
            })?;

        let model = lookup("FLOWREEL_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = lookup("FLOWREEL_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeouts = ServiceTimeouts {
            request: Duration::from_secs(parse_u64(
                &lookup,
                "FLOWREEL_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            connect: Duration::from_secs(parse_u64(
                &lookup,
                "FLOWREEL_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
        };
        let max_attempts = parse_u64(&lookup, "FLOWREEL_MAX_ATTEMPTS", 1)?;
        let retry = RetryPolicy {
            max_attempts: u32::try_from(max_attempts.max(1)).unwrap_or(u32::MAX),
            ..RetryPolicy::default()
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeouts,
            retry,
        })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> FlowResult<u64> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| FlowError::config(format!("{key} must be an unsigned integer, got '{raw}'"))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/config.rs"]
mod tests;
