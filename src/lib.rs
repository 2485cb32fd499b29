//! Request/reply latency probe.
//!
//! A probe server answers two trivial operations with its wall clock, and a
//! benchmark client issues a burst of sequential requests over one
//! connection, printing one CSV record per request.

pub mod bench;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;

pub use crate::bench::{run, ProbeResult, Summary, CSV_HEADER};
pub use crate::config::{BenchmarkConfig, ServerConfig};
pub use crate::error::{Error, Result};
pub use crate::protocol::{Reply, Request};
pub use crate::server::{serve, ProbeService};
