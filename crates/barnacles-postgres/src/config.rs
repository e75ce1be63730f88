use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use barnacles_domain::filter::{DeviceFilterParameters, RaddecFilterParameters};

/// Connection and diagnostics configuration, loaded once at startup
/// from explicit values or `BARNACLES_*` environment variables. The
/// pipeline itself never reads the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,

    /// Surface per-event failures to the diagnostic log. Disabled by
    /// default; failures are then completely silent.
    #[serde(default)]
    pub print_errors: bool,
}

fn default_user() -> String {
    "reelyactive".to_string()
}

fn default_password() -> String {
    "paretoanywhere".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "pareto_anywhere".to_string()
}

fn default_max_pool_size() -> usize {
    10
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            password: default_password(),
            host: default_host(),
            port: default_port(),
            database: default_database(),
            max_pool_size: default_max_pool_size(),
            print_errors: false,
        }
    }
}

impl SinkConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("BARNACLES"))
            .build()?
            .try_deserialize()
    }
}

/// Per-kind options for location events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaddecOptions {
    /// Keep the raw packets sub-structure in the stored record.
    pub include_packets: bool,
    pub filter: RaddecFilterParameters,
}

/// Per-kind options for dynamic-ambient events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DynambOptions {
    pub filter: DeviceFilterParameters,
}

/// Per-kind options for spatial events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatemOptions {
    pub filter: DeviceFilterParameters,
}

/// The active configuration set. A kind left as `None` is never
/// dispatched to storage. The default enables all three kinds with
/// pass-all filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsToStore {
    pub raddec: Option<RaddecOptions>,
    pub dynamb: Option<DynambOptions>,
    pub spatem: Option<SpatemOptions>,
}

impl Default for EventsToStore {
    fn default() -> Self {
        Self {
            raddec: Some(RaddecOptions::default()),
            dynamb: Some(DynambOptions::default()),
            spatem: Some(SpatemOptions::default()),
        }
    }
}

impl EventsToStore {
    /// An empty configuration set; every event becomes a no-op.
    pub fn none() -> Self {
        Self {
            raddec: None,
            dynamb: None,
            spatem: None,
        }
    }
}
