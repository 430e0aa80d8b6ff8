//! Session configuration parsed from environment variables.

use std::time::Duration;

use canvas::camera::Size;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;
pub const DEFAULT_COMMAND_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1024.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 768.0;

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A value parsed but is outside its allowed range.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl FetchTimeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub timeouts: FetchTimeouts,
    /// Largest background image body accepted, in bytes.
    pub max_image_bytes: usize,
    /// Bounded capacity of the session command queue.
    pub command_queue_capacity: usize,
    /// Initial viewport size in screen pixels.
    pub viewport: Size,
    pub user_agent: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeouts: FetchTimeouts {
                request_secs: DEFAULT_FETCH_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            command_queue_capacity: DEFAULT_COMMAND_QUEUE_CAPACITY,
            viewport: Size::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            user_agent: default_user_agent(),
        }
    }
}

impl SessionConfig {
    /// Build session config from environment variables.
    ///
    /// Optional:
    /// - `EMOJIART_FETCH_TIMEOUT_SECS`: default 30
    /// - `EMOJIART_CONNECT_TIMEOUT_SECS`: default 10
    /// - `EMOJIART_MAX_IMAGE_BYTES`: default 32 MiB
    /// - `EMOJIART_COMMAND_QUEUE_CAPACITY`: default 256
    /// - `EMOJIART_VIEWPORT_WIDTH` / `EMOJIART_VIEWPORT_HEIGHT`: default 1024x768
    /// - `EMOJIART_USER_AGENT`: default `emojiart/<version>`
    ///
    /// Unparseable values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero queue capacity, a zero
    /// byte cap, or a viewport that is not finite and positive.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            timeouts: FetchTimeouts {
                request_secs: env_parse("EMOJIART_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS),
                connect_secs: env_parse("EMOJIART_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
            max_image_bytes: env_parse("EMOJIART_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES),
            command_queue_capacity: env_parse("EMOJIART_COMMAND_QUEUE_CAPACITY", DEFAULT_COMMAND_QUEUE_CAPACITY),
            viewport: Size::new(
                env_parse("EMOJIART_VIEWPORT_WIDTH", DEFAULT_VIEWPORT_WIDTH),
                env_parse("EMOJIART_VIEWPORT_HEIGHT", DEFAULT_VIEWPORT_HEIGHT),
            ),
            user_agent: std::env::var("EMOJIART_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// See [`SessionConfig::from_env`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_queue_capacity == 0 {
            return Err(ConfigError::Invalid { key: "EMOJIART_COMMAND_QUEUE_CAPACITY", reason: "must be at least 1" });
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid { key: "EMOJIART_MAX_IMAGE_BYTES", reason: "must be at least 1" });
        }
        if !self.viewport.is_positive() {
            return Err(ConfigError::Invalid { key: "EMOJIART_VIEWPORT_WIDTH", reason: "viewport must be positive" });
        }
        Ok(())
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn default_user_agent() -> String {
    format!("emojiart/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
