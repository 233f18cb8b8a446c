//! One view controller per record type, all driven by the shell.

pub mod media;
pub mod migrations;
pub mod pipeline;
pub mod predictions;
pub mod training;

#[cfg(test)]
pub(crate) mod testutil {
    use mediadeck_client::config::{ENV_HOST, ENV_PORT, ENV_TIMEOUT};
    use mediadeck_client::{ApiConfig, ConsoleApi};

    /// A `ConsoleApi` whose every request fails fast: nothing listens on
    /// loopback port 1.
    pub fn refused_api() -> ConsoleApi {
        let config = ApiConfig::from_lookup(|var| match var {
            ENV_HOST => Some("127.0.0.1".to_string()),
            ENV_PORT => Some("1".to_string()),
            ENV_TIMEOUT => Some("2".to_string()),
            _ => None,
        })
        .unwrap();
        ConsoleApi::new(&config).unwrap()
    }
}
