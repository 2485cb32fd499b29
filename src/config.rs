use std::time::Duration;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:51051";
pub const DEFAULT_BACKEND: &str = "localhost:51051";
pub const DEFAULT_BASE_ID: u32 = 1;
pub const DEFAULT_NUM_QUERIES: u32 = 5000;

/// Settings of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    /// `ip:port` or `host:port` of the probe server.
    pub backend: String,
    /// Request id of the first probe.
    pub base_id: u32,
    pub num_queries: u32,
    /// Issue SleepAndEcho with this duration instead of EchoTimestamp.
    pub sleep: Option<Duration>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            backend: DEFAULT_BACKEND.to_owned(),
            base_id: DEFAULT_BASE_ID,
            num_queries: DEFAULT_NUM_QUERIES,
            sleep: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: DEFAULT_BIND_ADDRESS.to_owned(),
        }
    }
}
