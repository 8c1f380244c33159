//! Run configuration, resolved once at startup.
//!
//! Everything environment-dependent (endpoint, poll delay, delivery mode)
//! is decided here and handed to each component by reference; nothing
//! reads the environment at call time.

use std::time::Duration;

use crate::context::{ContextKey, WorkflowVariant};
use crate::error::ConfigError;

/// Default attempt budget. Two pauses of the production delay plus request
/// latency must fit inside the host's ~50 s execution ceiling.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DEV_POLL_DELAY_MS: u64 = 5_000;
pub const DEFAULT_PROD_POLL_DELAY_MS: u64 = 20_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ANSWER_FORMAT: &str = "slack";
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Where resolved answers are posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Reply in the thread of the originating escalation message.
    Thread,
    /// Send every answer to one fixed identity instead (development only).
    Direct { fallback_channel: String },
}

/// Attempt budget and fixed inter-attempt delay for the job poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl PollSettings {
    /// Default budget with the delay for `environment`.
    pub fn for_environment(environment: Environment) -> Self {
        let delay_ms = match environment {
            Environment::Production => DEFAULT_PROD_POLL_DELAY_MS,
            Environment::Development => DEFAULT_DEV_POLL_DELAY_MS,
        };
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Connection settings for the AI backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Sent verbatim as the `Authorization` header.
    pub auth_token: String,
    /// `answerFormat` query parameter for status requests, if any.
    pub answer_format: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackConfig {
    pub api_url: String,
    pub bot_token: Option<String>,
}

/// Complete configuration for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistConfig {
    pub environment: Environment,
    pub variant: WorkflowVariant,
    pub context_key: ContextKey,
    pub backend: BackendConfig,
    pub poll: PollSettings,
    pub delivery_mode: DeliveryMode,
    pub slack: SlackConfig,
}

impl AssistConfig {
    /// Load configuration from process environment variables.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `IS_PROD`              | `false`                  |
    /// | `ENDPOINT`             | required when not prod   |
    /// | `PROD_ENDPOINT`        | required when prod       |
    /// | `AUTH_TOKEN`           | required                 |
    /// | `WORKFLOW_VARIANT`     | `customer_support`       |
    /// | `CONTEXT_KEY`          | variant default          |
    /// | `POLL_MAX_ATTEMPTS`    | `3`                      |
    /// | `POLL_DELAY_DEV_MS`    | `5000`                   |
    /// | `POLL_DELAY_PROD_MS`   | `20000`                  |
    /// | `ANSWER_FORMAT`        | `slack` (empty disables) |
    /// | `REQUEST_TIMEOUT_SECS` | `10`                     |
    /// | `SLACK_API_URL`        | `https://slack.com/api`  |
    /// | `SLACK_BOT_TOKEN`      | unset                    |
    /// | `DELIVERY_MODE`        | `thread`                 |
    /// | `DEV_FALLBACK_CHANNEL` | required when `direct`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let environment = if env.flag("IS_PROD")? {
            Environment::Production
        } else {
            Environment::Development
        };

        let base_url = match environment {
            Environment::Production => env.required("PROD_ENDPOINT")?,
            Environment::Development => env.required("ENDPOINT")?,
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        let variant = match env.get("WORKFLOW_VARIANT") {
            None => WorkflowVariant::CustomerSupport,
            Some(raw) => WorkflowVariant::parse(&raw).ok_or(ConfigError::Invalid {
                var: "WORKFLOW_VARIANT",
                value: raw,
            })?,
        };

        let context_key = match env.get("CONTEXT_KEY") {
            None => variant.default_context_key(),
            Some(raw) => ContextKey::parse(&raw).ok_or(ConfigError::Invalid {
                var: "CONTEXT_KEY",
                value: raw,
            })?,
        };

        let defaults = PollSettings::for_environment(environment);
        let default_delay_ms = defaults.delay.as_millis() as u64;
        let delay_ms = match environment {
            Environment::Production => env.number("POLL_DELAY_PROD_MS", default_delay_ms)?,
            Environment::Development => env.number("POLL_DELAY_DEV_MS", default_delay_ms)?,
        };
        let max_attempts = env.number("POLL_MAX_ATTEMPTS", u64::from(defaults.max_attempts))?;
        let max_attempts = u32::try_from(max_attempts)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid {
                var: "POLL_MAX_ATTEMPTS",
                value: max_attempts.to_string(),
            })?;

        // Explicitly empty disables the parameter; unset uses the default.
        let answer_format = match (env.0)("ANSWER_FORMAT") {
            None => Some(DEFAULT_ANSWER_FORMAT.to_string()),
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().to_string()),
        };

        let backend = BackendConfig {
            base_url,
            auth_token: env.required("AUTH_TOKEN")?,
            answer_format,
            request_timeout: Duration::from_secs(
                env.number("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            ),
        };

        let delivery_mode = match env.get("DELIVERY_MODE").as_deref() {
            None | Some("thread") => DeliveryMode::Thread,
            Some("direct") => DeliveryMode::Direct {
                fallback_channel: env.required("DEV_FALLBACK_CHANNEL")?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "DELIVERY_MODE",
                    value: other.to_string(),
                })
            }
        };

        let slack = SlackConfig {
            api_url: env
                .get("SLACK_API_URL")
                .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            bot_token: env.get("SLACK_BOT_TOKEN"),
        };

        Ok(Self {
            environment,
            variant,
            context_key,
            backend,
            poll: PollSettings {
                max_attempts,
                delay: Duration::from_millis(delay_ms),
            },
            delivery_mode,
            slack,
        })
    }
}

/// Typed accessors over a raw key lookup. Blank values read as unset.
struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn flag(&self, key: &'static str) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(false),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    var: key,
                    value: raw,
                }),
            },
        }
    }

    fn number(&self, key: &'static str, default: u64) -> Result<u64, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: key,
                value: raw,
            }),
        }
    }
}
