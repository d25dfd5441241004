use std::env;

use log::*;
use order_tracking_engine::db_url;
use ots_common::{parse_boolean_flag, Pkr};

const DEFAULT_OTS_HOST: &str = "127.0.0.1";
const DEFAULT_OTS_PORT: u16 = 5000;
const DEFAULT_SETTLEMENT_RATE: i64 = 500;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The payout per delivered order used in settlement reports.
    pub settlement_rate: Pkr,
    pub max_connections: u32,
    /// When true, embedded migrations run at startup, before the server binds.
    pub auto_migrate: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OTS_HOST.to_string(),
            port: DEFAULT_OTS_PORT,
            database_url: String::default(),
            settlement_rate: Pkr::new(DEFAULT_SETTLEMENT_RATE),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auto_migrate: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OTS_HOST").ok().unwrap_or_else(|| DEFAULT_OTS_HOST.into());
        let port = env::var("OTS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for OTS_PORT. {e} Using the default, {DEFAULT_OTS_PORT}, instead."
                    );
                    DEFAULT_OTS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_OTS_PORT);
        let database_url = db_url();
        let settlement_rate = env::var("OTS_SETTLEMENT_RATE")
            .map_err(|_| {
                info!(
                    "🪛️ OTS_SETTLEMENT_RATE is not set. Using the default rate of {DEFAULT_SETTLEMENT_RATE} PKR per \
                     delivered order."
                )
            })
            .and_then(|s| {
                s.parse::<i64>().map_err(|e| warn!("🪛️ Invalid configuration value for OTS_SETTLEMENT_RATE. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_SETTLEMENT_RATE);
        let max_connections = env::var("OTS_MAX_CONNECTIONS")
            .map_err(|_| ())
            .and_then(|s| {
                s.parse::<u32>().map_err(|e| warn!("🪛️ Invalid configuration value for OTS_MAX_CONNECTIONS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let auto_migrate = parse_boolean_flag(env::var("OTS_AUTO_MIGRATE").ok(), true);
        if !auto_migrate {
            info!("🪛️ OTS_AUTO_MIGRATE is disabled. The database schema is assumed to be up to date.");
        }
        Self { host, port, database_url, settlement_rate: Pkr::new(settlement_rate), max_connections, auto_migrate }
    }
}
