use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_derive::{Deserialize, Serialize};

/// The two operations a probe server answers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// EchoTimestamp: reply immediately.
    Echo { req_id: u32 },
    /// SleepAndEcho: the server may wait `sleep_duration` before replying.
    Sleep {
        req_id: u32,
        sleep_duration: Option<Duration>,
    },
}

impl Request {
    pub fn req_id(&self) -> u32 {
        match *self {
            Request::Echo { req_id } | Request::Sleep { req_id, .. } => req_id,
        }
    }
}

/// Shared reply shape of both operations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub req_id: u32,
    /// Server wall clock, microseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Reply {
    pub fn stamped(req_id: u32) -> Reply {
        Reply {
            req_id,
            timestamp: now_micros(),
        }
    }
}

/// Wall-clock time in microseconds since the epoch, `0` if the clock is set before it.
pub fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() * 1_000_000 + u64::from(d.subsec_micros()))
        .unwrap_or(0)
}
