use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub durability: DurabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding trains.json / tickets.json
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DurabilityConfig {
    /// Upper bound on any single snapshot write; a slow storage backend must
    /// not stall bookings for a train indefinitely.
    #[serde(default = "default_persist_timeout_ms")]
    pub persist_timeout_ms: u64,
}

fn default_persist_timeout_ms() -> u64 {
    2_000
}

impl DurabilityConfig {
    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `RAILBOOK__DURABILITY__PERSIST_TIMEOUT_MS=500`
            .add_source(config::Environment::with_prefix("RAILBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
