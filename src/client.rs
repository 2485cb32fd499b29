//! Client side of the transport: one multiplexed TCP connection per run.

use std::io;
use std::net::ToSocketAddrs;

use log::debug;
use tokio_codec::{Decoder, Framed};
use tokio_core::net::TcpStream;
use tokio_core::reactor::Core;
use tokio_io::{AsyncRead, AsyncWrite};
use tokio_proto::multiplex::{ClientProto, ClientService};
use tokio_proto::TcpClient;

use crate::codec::FrameCodec;
use crate::error::{Error, Result};
use crate::protocol::{Reply, Request};

pub type ClientCodec = FrameCodec<Reply, Request>;

pub struct ClientProtocol;
impl<T: AsyncRead + AsyncWrite + 'static> ClientProto<T> for ClientProtocol {
    type Request = Request;
    type Response = Reply;
    type Transport = Framed<T, ClientCodec>;
    type BindTransport = io::Result<Self::Transport>;
    fn bind_transport(&self, io: T) -> Self::BindTransport {
        Ok(ClientCodec::new().framed(io))
    }
}

/// A connected client; every `call` is one request on the shared connection.
pub type ProbeClient = ClientService<TcpStream, ClientProtocol>;

/// Resolves `backend` and connects to its first address, blocking on `core`.
pub fn connect(core: &mut Core, backend: &str) -> Result<ProbeClient> {
    let address = backend
        .to_socket_addrs()
        .map_err(|source| Error::Resolve {
            address: backend.to_owned(),
            source,
        })?
        .next()
        .ok_or_else(|| Error::NoAddress {
            address: backend.to_owned(),
        })?;
    debug!("Connecting to {} ({})", backend, address);

    let handle = core.handle();
    core.run(TcpClient::new(ClientProtocol).connect(&address, &handle))
        .map_err(|source| Error::Connect { address, source })
}
