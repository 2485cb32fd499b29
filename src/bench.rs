//! The latency measurement loop and its CSV output.
//!
//! Probes are issued strictly one at a time on a single connection. Each
//! probe is timed on the client's monotonic clock; the server timestamp is
//! only reported, never used for timing.

use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use log::{debug, info};
use tokio_core::reactor::Core;
use tokio_service::Service;

use crate::client::connect;
use crate::config::BenchmarkConfig;
use crate::error::Result;
use crate::protocol::{Reply, Request};

pub const CSV_HEADER: &str = "query_id,success,query_time,backend_ts";

/// One issued probe, rendered as a CSV record by `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub req_id: u32,
    /// Client-observed round trip.
    pub elapsed_ns: u64,
    /// Present only on success.
    pub server_timestamp: Option<u64>,
}

impl ProbeResult {
    pub fn success(&self) -> bool {
        self.server_timestamp.is_some()
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{},{},{},",
            self.req_id,
            if self.success() { 1 } else { 0 },
            self.elapsed_ns
        )?;
        match self.server_timestamp {
            Some(ts) => write!(f, "{}.{:06}", ts / 1_000_000, ts % 1_000_000),
            None => f.write_str("-1"),
        }
    }
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub queries: u32,
    pub errors: u32,
    pub elapsed: Duration,
}

impl Summary {
    /// Probes per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = duration_secs(self.elapsed);
        if secs > 0.0 {
            f64::from(self.queries) / secs
        } else {
            0.0
        }
    }
}

/// Server timestamp of a usable reply. A transport error and a reply
/// echoing the wrong id both yield `None`.
pub fn classify(req_id: u32, outcome: io::Result<Reply>) -> Option<u64> {
    match outcome {
        Ok(reply) => {
            debug!("Got ID {} in response to request ID {}", reply.req_id, req_id);
            if reply.req_id == req_id {
                Some(reply.timestamp)
            } else {
                None
            }
        }
        Err(e) => {
            debug!("Request ID {} failed: {}", req_id, e);
            None
        }
    }
}

fn probe_request(req_id: u32, sleep: Option<Duration>) -> Request {
    match sleep {
        None => Request::Echo { req_id },
        Some(delay) => Request::Sleep {
            req_id,
            sleep_duration: Some(delay),
        },
    }
}

fn elapsed_nanos(reference: Instant) -> u64 {
    let d = reference.elapsed();
    d.as_secs() * 1_000_000_000 + u64::from(d.subsec_nanos())
}

fn duration_secs(d: Duration) -> f64 {
    d.as_secs() as f64 + f64::from(d.subsec_nanos()) / 1e9
}

pub fn write_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)
}

/// Issues `config.num_queries` sequential probes through `service`, writing
/// one record per probe in issue order. Failed probes never stop the loop.
pub fn run_queries<S, W>(
    core: &mut Core,
    service: &S,
    config: &BenchmarkConfig,
    out: &mut W,
) -> Result<Summary>
where
    S: Service<Request = Request, Response = Reply, Error = io::Error>,
    W: Write,
{
    let start = Instant::now();
    let mut errors = 0;

    for i in 0..config.num_queries {
        let req_id = config.base_id.wrapping_add(i);
        let request = probe_request(req_id, config.sleep);

        let before = elapsed_nanos(start);
        let outcome = core.run(service.call(request));
        let after = elapsed_nanos(start);

        let result = ProbeResult {
            req_id,
            elapsed_ns: after.saturating_sub(before),
            server_timestamp: classify(req_id, outcome),
        };
        if !result.success() {
            errors += 1;
        }
        writeln!(out, "{}", result)?;
    }
    out.flush()?;

    let summary = Summary {
        queries: config.num_queries,
        errors,
        elapsed: start.elapsed(),
    };
    info!(
        "Finished {} requests with {} errors, took {:.6} seconds ({:.1} queries/s)",
        summary.queries,
        summary.errors,
        duration_secs(summary.elapsed),
        summary.throughput()
    );
    Ok(summary)
}

/// Connects to `config.backend` and runs the whole benchmark, CSV header first.
///
/// If the connection cannot be established the header is the only output
/// and the error is returned without issuing any probe.
pub fn run<W: Write>(config: &BenchmarkConfig, out: &mut W) -> Result<Summary> {
    write_header(out)?;
    out.flush()?;

    let mut core = Core::new()?;
    let client = connect(&mut core, &config.backend)?;
    run_queries(&mut core, &client, config, out)
}
