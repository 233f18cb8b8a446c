//! Configuration resolution from the environment.
//!
//! The console needs four values to reach the API: host, port, URL path
//! prefix, and request timeout. Host and port are required and never
//! defaulted; prefix and timeout have documented defaults. Validation
//! reports every missing or malformed variable in one pass so the
//! operator fixes the environment once, not one variable per restart.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub const ENV_HOST: &str = "MEDIADECK_API_HOST";
pub const ENV_PORT: &str = "MEDIADECK_API_PORT";
pub const ENV_PREFIX: &str = "MEDIADECK_API_PREFIX";
pub const ENV_TIMEOUT: &str = "MEDIADECK_API_TIMEOUT";

pub const DEFAULT_PREFIX: &str = "conveyor";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One offending environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    Missing(&'static str),
    Malformed {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "{var} is not set"),
            Self::Malformed {
                var,
                value,
                expected,
            } => write!(f, "{var}={value:?} is not {expected}"),
        }
    }
}

/// The environment did not yield a usable configuration.
///
/// Carries every problem found, not just the first.
#[derive(Debug, Error)]
#[error("invalid configuration: {}", describe(.problems))]
pub struct ConfigError {
    problems: Vec<ConfigProblem>,
}

fn describe(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConfigError {
    pub fn problems(&self) -> &[ConfigProblem] {
        &self.problems
    }

    /// Multi-line guidance for the operator: every variable, its
    /// meaning, and its default (or "required").
    pub fn remediation(&self) -> String {
        format!(
            "set the following environment variables and restart:\n\
             \x20 {ENV_HOST}      API hostname (required)\n\
             \x20 {ENV_PORT}      API TCP port, 1-65535 (required)\n\
             \x20 {ENV_PREFIX}    URL path prefix (default: {DEFAULT_PREFIX})\n\
             \x20 {ENV_TIMEOUT}   request timeout in seconds (default: {DEFAULT_TIMEOUT_SECS})"
        )
    }
}

/// Validated connection settings for the remote API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub prefix: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolve from an arbitrary lookup. Empty values count as unset,
    /// matching how container env injection leaves blanks behind.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut problems = Vec::new();

        let host = non_empty(lookup(ENV_HOST));
        if host.is_none() {
            problems.push(ConfigProblem::Missing(ENV_HOST));
        }

        let port = match non_empty(lookup(ENV_PORT)) {
            None => {
                problems.push(ConfigProblem::Missing(ENV_PORT));
                None
            }
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => Some(port),
                _ => {
                    problems.push(ConfigProblem::Malformed {
                        var: ENV_PORT,
                        value: raw,
                        expected: "a TCP port between 1 and 65535",
                    });
                    None
                }
            },
        };

        let prefix = non_empty(lookup(ENV_PREFIX))
            .map(|p| p.trim_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let timeout = match non_empty(lookup(ENV_TIMEOUT)) {
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    problems.push(ConfigProblem::Malformed {
                        var: ENV_TIMEOUT,
                        value: raw,
                        expected: "a positive number of seconds",
                    });
                    None
                }
            },
        };

        if let (Some(host), Some(port), Some(timeout), true) =
            (host, port, timeout, problems.is_empty())
        {
            Ok(Self {
                host,
                port,
                prefix,
                timeout,
            })
        } else {
            Err(ConfigError { problems })
        }
    }

    /// Base URL all endpoint paths are joined onto, with a trailing slash.
    pub fn base_url(&self) -> String {
        if self.prefix.is_empty() {
            format!("http://{}:{}/", self.host, self.port)
        } else {
            format!("http://{}:{}/{}/", self.host, self.port, self.prefix)
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn resolves_with_defaults() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            (ENV_HOST, "api.internal"),
            (ENV_PORT, "8080"),
        ]))
        .unwrap();
        assert_eq!(config.host, "api.internal");
        assert_eq!(config.port, 8080);
        assert_eq!(config.prefix, DEFAULT_PREFIX);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn missing_host_and_port_are_both_reported() {
        let err = ApiConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(
            err.problems(),
            [
                ConfigProblem::Missing(ENV_HOST),
                ConfigProblem::Missing(ENV_PORT),
            ]
        );
    }

    #[test]
    fn missing_host_alone_is_reported() {
        let err = ApiConfig::from_lookup(lookup_from(&[(ENV_PORT, "8080")])).unwrap_err();
        assert_eq!(err.problems(), [ConfigProblem::Missing(ENV_HOST)]);
        assert!(err.to_string().contains(ENV_HOST));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let err = ApiConfig::from_lookup(lookup_from(&[(ENV_HOST, "  "), (ENV_PORT, "")]))
            .unwrap_err();
        assert_eq!(err.problems().len(), 2);
    }

    #[test]
    fn malformed_port_is_reported_alongside_missing_host() {
        let err = ApiConfig::from_lookup(lookup_from(&[(ENV_PORT, "http")])).unwrap_err();
        assert_eq!(err.problems().len(), 2);
        assert!(matches!(
            err.problems()[1],
            ConfigProblem::Malformed { var, .. } if var == ENV_PORT
        ));
    }

    #[test]
    fn port_zero_and_overflow_are_malformed() {
        for bad in ["0", "70000", "-1"] {
            let err = ApiConfig::from_lookup(lookup_from(&[
                (ENV_HOST, "h"),
                (ENV_PORT, bad),
            ]))
            .unwrap_err();
            assert_eq!(err.problems().len(), 1, "port {bad:?}");
        }
    }

    #[test]
    fn malformed_timeout_is_reported() {
        let err = ApiConfig::from_lookup(lookup_from(&[
            (ENV_HOST, "h"),
            (ENV_PORT, "80"),
            (ENV_TIMEOUT, "soon"),
        ]))
        .unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert!(err.to_string().contains(ENV_TIMEOUT));
    }

    #[test]
    fn base_url_shape() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            (ENV_HOST, "10.0.0.5"),
            (ENV_PORT, "9000"),
            (ENV_PREFIX, "pipeline"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "http://10.0.0.5:9000/pipeline/");
    }

    #[test]
    fn prefix_slashes_are_trimmed() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            (ENV_HOST, "h"),
            (ENV_PORT, "80"),
            (ENV_PREFIX, "/v2/"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "http://h:80/v2/");
    }

    #[test]
    fn remediation_names_every_variable() {
        let err = ApiConfig::from_lookup(lookup_from(&[])).unwrap_err();
        let text = err.remediation();
        for var in [ENV_HOST, ENV_PORT, ENV_PREFIX, ENV_TIMEOUT] {
            assert!(text.contains(var), "remediation missing {var}");
        }
    }
}
