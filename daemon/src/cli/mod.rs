//! CLI module for dmsg-daemon
//!
//! Every flag can also be set through a `DMSG_DAEMON_*` environment variable.
//! Precedence: flag / env > `--config` file > built-in defaults.

use clap::{Parser, ValueEnum};
use dmsg_daemon_common::config::{ConfigError, DaemonConfig, ReloadPolicy};
use std::path::PathBuf;

/// dmsg daemon - periodic reachability monitor for dmsg peers
#[derive(Parser, Debug)]
#[command(name = "dmsg-daemon")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    DMSG_DAEMON_LOG_LEVEL   Log filter (default: info)
    DMSG_DAEMON_LOG_DIR     Also write daily-rotated log files to this directory

PEER LIST CSV:
    The first line is a header. Each following line is `<public key>,<port>`;
    the port may be empty.
"#)]
pub struct Cli {
    /// Config file (JSON, TOML or YAML)
    #[arg(long, env = "DMSG_DAEMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind address for the status API [default: 0.0.0.0]
    #[arg(short = 'H', long, env = "DMSG_DAEMON_HOST")]
    pub host: Option<String>,

    /// Listen port for the status API [default: 9090]
    #[arg(short, long, env = "DMSG_DAEMON_PORT")]
    pub port: Option<u16>,

    /// Path of the peer list CSV [default: dmsg-clients.csv]
    #[arg(short, long, env = "DMSG_DAEMON_CSV_PATH")]
    pub csv_path: Option<String>,

    /// Probe a fixed peer instead of reading the CSV (repeatable)
    #[arg(
        long = "peer",
        value_name = "PK[:PORT]",
        env = "DMSG_DAEMON_PEERS",
        value_delimiter = ','
    )]
    pub peers: Vec<String>,

    /// When to read the peer list CSV [default: every-round]
    #[arg(long, value_enum, env = "DMSG_DAEMON_RELOAD_PEERS")]
    pub reload_peers: Option<ReloadArg>,

    /// Seconds between probe rounds [default: 60]
    #[arg(long, env = "DMSG_DAEMON_INTERVAL_SECS")]
    pub interval_secs: Option<u64>,

    /// Seconds before a single dial is abandoned [default: 10]
    #[arg(long, env = "DMSG_DAEMON_DIAL_TIMEOUT_SECS")]
    pub dial_timeout_secs: Option<u64>,

    /// dmsg discovery service URL
    #[arg(long, env = "DMSG_DAEMON_DISCOVERY_URL")]
    pub discovery_url: Option<String>,

    /// Maximum number of concurrent dials per round [default: unbounded]
    #[arg(long, env = "DMSG_DAEMON_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,
}

/// Peer list reload policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReloadArg {
    /// Read once at startup
    Once,
    /// Re-read before every round
    EveryRound,
}

impl From<ReloadArg> for ReloadPolicy {
    fn from(arg: ReloadArg) -> Self {
        match arg {
            ReloadArg::Once => ReloadPolicy::Once,
            ReloadArg::EveryRound => ReloadPolicy::EveryRound,
        }
    }
}

impl Cli {
    /// Resolve the effective configuration
    pub fn into_config(self) -> Result<DaemonConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_file(path)?,
            None => DaemonConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(csv_path) = self.csv_path {
            config.csv_path = csv_path;
        }
        if !self.peers.is_empty() {
            config.peers = self.peers;
        }
        if let Some(reload) = self.reload_peers {
            config.reload_peers = reload.into();
        }
        if let Some(interval_secs) = self.interval_secs {
            config.interval_secs = interval_secs;
        }
        if let Some(dial_timeout_secs) = self.dial_timeout_secs {
            config.dial_timeout_secs = dial_timeout_secs;
        }
        if let Some(discovery_url) = self.discovery_url {
            config.discovery_url = discovery_url;
        }
        if self.max_concurrency.is_some() {
            config.max_concurrency = self.max_concurrency;
        }

        config.validate()?;
        Ok(config)
    }
}
