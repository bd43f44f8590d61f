//! Coordinator configuration and environment helpers.
//!
//! All tunables are explicit constructor inputs rather than process-wide
//! state; the environment is read once at startup.

use crate::constants::{
    DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_REJOIN_BAN_SECS, DEFAULT_SUCCESS_NOTICE_TTL_SECS,
    DEFAULT_WINDOW_SECS,
};

/// Tunables of the verification lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct VerifierConfig {
    /// Seconds from join to the enforcement deadline.
    pub window_secs: i64,
    /// Cap on the countdown re-scheduling delay.
    pub refresh_interval_secs: i64,
    /// Seconds before the success notice is cleaned up.
    pub success_notice_ttl_secs: i64,
    /// How long a removed member stays banned.
    pub rejoin_ban_secs: i64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            success_notice_ttl_secs: DEFAULT_SUCCESS_NOTICE_TTL_SECS,
            rejoin_ban_secs: DEFAULT_REJOIN_BAN_SECS,
        }
    }
}

impl VerifierConfig {
    /// Reads overrides from `DOORMAN_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            window_secs: env_parse_or("DOORMAN_WINDOW_SECS", defaults.window_secs),
            refresh_interval_secs: env_parse_or(
                "DOORMAN_REFRESH_INTERVAL_SECS",
                defaults.refresh_interval_secs,
            ),
            success_notice_ttl_secs: env_parse_or(
                "DOORMAN_SUCCESS_NOTICE_TTL_SECS",
                defaults.success_notice_ttl_secs,
            ),
            rejoin_ban_secs: env_parse_or("DOORMAN_REJOIN_BAN_SECS", defaults.rejoin_ban_secs),
        }
    }

    /// Delay for the next countdown tick given the remaining seconds.
    ///
    /// The visible caption refreshes at most every `refresh_interval_secs`
    /// while the final tick lands on the deadline itself. Callers must take
    /// the expiry branch instead when `remaining_secs` is not positive.
    #[must_use]
    pub fn tick_delay(&self, remaining_secs: i64) -> i64 {
        self.refresh_interval_secs.min(remaining_secs)
    }
}

/// Parse an environment variable, falling back to `default` when the
/// variable is unset or unparseable. A set-but-invalid value is logged at
/// warn level instead of being silently ignored.
pub fn env_parse_or<T: std::str::FromStr + std::fmt::Display>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var, value = %raw, default = %default, "invalid env var, using default");
                default
            },
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = VerifierConfig::default();
        assert_eq!(cfg.window_secs, 300);
        assert_eq!(cfg.refresh_interval_secs, 15);
        assert_eq!(cfg.success_notice_ttl_secs, 10);
        assert_eq!(cfg.rejoin_ban_secs, 60);
    }

    #[test]
    fn tick_delay_is_capped_by_refresh_interval() {
        let cfg = VerifierConfig::default();
        assert_eq!(cfg.tick_delay(285), 15);
        assert_eq!(cfg.tick_delay(15), 15);
    }

    #[test]
    fn tick_delay_shrinks_near_deadline() {
        let cfg = VerifierConfig::default();
        assert_eq!(cfg.tick_delay(7), 7);
        assert_eq!(cfg.tick_delay(1), 1);
    }

    #[test]
    fn env_parse_or_prefers_valid_value() {
        let var = "DOORMAN_TEST_PARSE_VALID_41923";
        unsafe { std::env::set_var(var, "120") };
        let parsed: i64 = env_parse_or(var, 300);
        assert_eq!(parsed, 120);
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn env_parse_or_falls_back_on_garbage() {
        let var = "DOORMAN_TEST_PARSE_GARBAGE_41924";
        unsafe { std::env::set_var(var, "soon") };
        let parsed: i64 = env_parse_or(var, 300);
        assert_eq!(parsed, 300);
        unsafe { std::env::remove_var(var) };
    }
}
