use std::{fs::read_to_string, net::SocketAddr};

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Server {
    ///
    /// server listen address
    ///
    /// The address and port to which the UDP socket is bound. The
    /// binding address supports ipv4 and ipv6.
    ///
    #[serde(default = "Server::listen")]
    pub listen: SocketAddr,
}

impl Server {
    fn listen() -> SocketAddr {
        "0.0.0.0:3478".parse().unwrap()
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            listen: Self::listen(),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub struct Delay {
    ///
    /// base response delay in milliseconds
    ///
    /// Every binding response is held back for this long before it is
    /// sent. The default of zero turns the server into a plain
    /// synchronous responder.
    ///
    #[serde(default)]
    pub base_ms: u64,
    ///
    /// symmetric jitter bound in milliseconds
    ///
    /// A per-response offset is drawn uniformly from
    /// [-jitter-ms, +jitter-ms] and added to the base delay, emulating
    /// variable network latency for NAT-traversal clients under test.
    /// Delays that would go negative are clamped to zero.
    ///
    #[serde(default)]
    pub jitter_ms: u64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    pub fn as_level(&self) -> log::Level {
        match *self {
            Self::Error => log::Level::Error,
            Self::Debug => log::Level::Debug,
            Self::Trace => log::Level::Trace,
            Self::Warn => log::Level::Warn,
            Self::Info => log::Level::Info,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Log {
    ///
    /// log level
    ///
    /// An enum representing the available verbosity levels of the logger.
    ///
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub delay: Delay,
    #[serde(default)]
    pub log: Log,
}

#[derive(Parser, Debug)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    ///
    /// Specify the configuration file path
    ///
    /// Example: stun-server --config /etc/stun-server/config.json5
    ///
    #[arg(long, short)]
    config: Option<String>,
}

impl Config {
    ///
    /// Load configure from config file and command line parameters.
    ///
    /// Load command line parameters, if the configuration file path is
    /// specified, the configuration is read from the configuration file,
    /// otherwise the default configuration is used.
    ///
    pub fn load() -> Result<Self> {
        Ok(match Cli::parse().config {
            Some(path) => serde_json5::from_str(&read_to_string(path)?)?,
            None => Self::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.server.listen, "0.0.0.0:3478".parse().unwrap());
        assert_eq!(config.delay.base_ms, 0);
        assert_eq!(config.delay.jitter_ms, 0);
    }

    #[test]
    fn parse_file_contents() {
        let config: Config = serde_json5::from_str(
            r#"{
                server: { listen: "127.0.0.1:3478" },
                delay: { "base-ms": 100, "jitter-ms": 20 },
                log: { level: "debug" },
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:3478".parse().unwrap());
        assert_eq!(config.delay.base_ms, 100);
        assert_eq!(config.delay.jitter_ms, 20);
    }
}
