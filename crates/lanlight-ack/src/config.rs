//! Read timeout and receive buffer settings.
//!
//! The process-wide config is read from the environment on first use:
//!
//! | Variable | Default |
//! |---|---|
//! | `LANLIGHT_READ_TIMEOUT_MS` | 100 |
//! | `LANLIGHT_RESPONSE_BUFFER_SIZE` | 4096 |

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use lanlight_protocol::HEADER_SIZE;
use tracing::warn;

/// Upper bound on a single blocking read; also the worst-case delay before
/// a cancellation is noticed.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Receive buffer size. Responses larger than this are truncated by the OS.
pub const DEFAULT_RESPONSE_BUFFER_SIZE: usize = 4096;

/// Longest single read. Larger read timeouts are clamped to this so the
/// read deadline stays representable.
pub const MAX_READ_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

const ENV_READ_TIMEOUT_MS: &str = "LANLIGHT_READ_TIMEOUT_MS";
const ENV_RESPONSE_BUFFER_SIZE: &str = "LANLIGHT_RESPONSE_BUFFER_SIZE";

static GLOBAL: OnceLock<WaitConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    pub read_timeout: Duration,
    pub response_buffer_size: usize,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            response_buffer_size: DEFAULT_RESPONSE_BUFFER_SIZE,
        }
    }
}

impl WaitConfig {
    /// Defaults overridden by `LANLIGHT_*` variables. Malformed values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_READ_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.read_timeout = Duration::from_millis(ms),
                _ => warn!(
                    "{}={:?} is not a positive integer, using {:?}",
                    ENV_READ_TIMEOUT_MS, raw, config.read_timeout
                ),
            }
        }

        if let Some(raw) = lookup(ENV_RESPONSE_BUFFER_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size >= HEADER_SIZE => config.response_buffer_size = size,
                _ => warn!(
                    "{}={:?} must be at least {} bytes, using {}",
                    ENV_RESPONSE_BUFFER_SIZE, raw, HEADER_SIZE, config.response_buffer_size
                ),
            }
        }

        config
    }

    /// Process-wide config, initialised from the environment on first call.
    pub fn global() -> &'static WaitConfig {
        GLOBAL.get_or_init(Self::from_env)
    }

    /// Set the process-wide config. Fails, returning `config`, if it was
    /// already initialised (explicitly or by a previous wait).
    pub fn install(config: WaitConfig) -> Result<(), WaitConfig> {
        GLOBAL.set(config)
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sizes below [`HEADER_SIZE`] are raised to it; a smaller buffer could
    /// never hold a response.
    pub fn with_response_buffer_size(mut self, size: usize) -> Self {
        self.response_buffer_size = size.max(HEADER_SIZE);
        self
    }

    /// Read timeout actually applied, at most [`MAX_READ_TIMEOUT`].
    pub(crate) fn bounded_read_timeout(&self) -> Duration {
        self.read_timeout.min(MAX_READ_TIMEOUT)
    }

    /// Receive buffer length actually allocated, at least [`HEADER_SIZE`].
    pub(crate) fn buffer_len(&self) -> usize {
        self.response_buffer_size.max(HEADER_SIZE)
    }

    /// Deadline for the next read: now plus the read timeout.
    pub fn read_deadline(&self) -> Instant {
        Instant::now() + self.bounded_read_timeout()
    }
}

/// Deadline for the next read under the process-wide config.
pub fn read_deadline() -> Instant {
    WaitConfig::global().read_deadline()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(WaitConfig::from_lookup(lookup(&[])), WaitConfig::default());
    }

    #[test]
    fn overrides_from_env() {
        let config = WaitConfig::from_lookup(lookup(&[
            (ENV_READ_TIMEOUT_MS, "25"),
            (ENV_RESPONSE_BUFFER_SIZE, " 1500 "),
        ]));
        assert_eq!(config.read_timeout, Duration::from_millis(25));
        assert_eq!(config.response_buffer_size, 1500);
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let config = WaitConfig::from_lookup(lookup(&[
            (ENV_READ_TIMEOUT_MS, "0"),
            (ENV_RESPONSE_BUFFER_SIZE, "12"),
        ]));
        assert_eq!(config, WaitConfig::default());

        let config = WaitConfig::from_lookup(lookup(&[(ENV_READ_TIMEOUT_MS, "soon")]));
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn read_deadline_is_in_the_future() {
        let config = WaitConfig::default().with_read_timeout(Duration::from_secs(5));
        assert!(config.read_deadline() > Instant::now() + Duration::from_secs(4));
    }

    #[test]
    fn huge_read_timeout_is_clamped() {
        let config = WaitConfig::default().with_read_timeout(Duration::MAX);
        let deadline = config.read_deadline();
        assert!(deadline > Instant::now() + Duration::from_secs(60 * 60));
        assert!(deadline <= Instant::now() + MAX_READ_TIMEOUT);
    }

    #[test]
    fn buffer_never_smaller_than_header() {
        let config = WaitConfig::default().with_response_buffer_size(0);
        assert_eq!(config.response_buffer_size, HEADER_SIZE);

        let config = WaitConfig {
            response_buffer_size: 0,
            ..WaitConfig::default()
        };
        assert_eq!(config.buffer_len(), HEADER_SIZE);
    }
}
