use std::io;
use std::net::SocketAddr;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that end a run. Per-request failures are never reported here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot resolve `{address}`: {source}")]
    Resolve { address: String, source: io::Error },

    #[error("`{address}` resolved to no addresses")]
    NoAddress { address: String },

    #[error("cannot connect to {address}: {source}")]
    Connect { address: SocketAddr, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
