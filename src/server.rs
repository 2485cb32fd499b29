//! Probe server: stamps the wall clock on every request it receives.

use std::io;
use std::net::{self, ToSocketAddrs};
use std::cmp;
use std::time::{Duration, Instant};

use futures::future::{self, Either, Loop};
use futures::{Future, Stream};
use log::{debug, info, trace, warn};
use tokio_codec::{Decoder, Framed};
use tokio_core::net::TcpListener;
use tokio_core::reactor::Core;
use tokio_io::{AsyncRead, AsyncWrite};
use tokio_proto::multiplex::ServerProto;
use tokio_proto::BindServer;
use tokio_service::{NewService, Service};
use tokio_timer::{Timer, TimerError};

use crate::codec::FrameCodec;
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::protocol::{Reply, Request};

pub type ServerCodec = FrameCodec<Request, Reply>;

pub struct ServerProtocol;
impl<T: AsyncRead + AsyncWrite + 'static> ServerProto<T> for ServerProtocol {
    type Request = Request;
    type Response = Reply;
    type Transport = Framed<T, ServerCodec>;
    type BindTransport = io::Result<Self::Transport>;
    fn bind_transport(&self, io: T) -> Self::BindTransport {
        Ok(ServerCodec::new().framed(io))
    }
}

/// Stateless handler for both operations.
#[derive(Clone)]
pub struct ProbeService {
    timer: Timer,
}

impl ProbeService {
    pub fn new(timer: Timer) -> ProbeService {
        ProbeService { timer }
    }
}

const TICK: Duration = Duration::from_millis(1);

/// Timer wheel with millisecond ticks, covering sleeps of a bit over a minute.
pub fn probe_timer() -> Timer {
    tokio_timer::wheel()
        .tick_duration(TICK)
        .num_slots(1 << 16)
        .build()
}

/// Resolves no earlier than `delay` from now. The wheel may fire a tick
/// early or skip sub-tick sleeps, so it is re-armed until the deadline passes.
fn wait_at_least(timer: Timer, delay: Duration) -> impl Future<Item = (), Error = TimerError> {
    let deadline = Instant::now() + delay;
    future::loop_fn((), move |()| {
        let now = Instant::now();
        if now >= deadline {
            return Either::A(future::ok(Loop::Break(())));
        }
        let remaining = cmp::max(deadline - now, TICK);
        Either::B(timer.sleep(remaining).map(Loop::Continue))
    })
}

impl Service for ProbeService {
    type Request = Request;
    type Response = Reply;
    type Error = io::Error;
    type Future = Box<dyn Future<Item = Self::Response, Error = Self::Error>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        let reply = Reply::stamped(req.req_id());
        trace!("Request: {:?}", req);

        match req {
            Request::Sleep {
                sleep_duration: Some(delay),
                ..
            } => Box::new(wait_at_least(self.timer.clone(), delay).then(move |slept| {
                if let Err(e) = slept {
                    warn!("Sleep of {:?} for request {} failed: {:?}", delay, reply.req_id, e);
                }
                Ok::<_, io::Error>(reply)
            })),
            _ => Box::new(future::ok(reply)),
        }
    }
}

/// Serves on an already bound listener until the process exits.
pub fn serve_listener<S>(listener: net::TcpListener, new_service: S) -> io::Result<()>
where
    S: NewService<Request = Request, Response = Reply, Error = io::Error>,
    S::Instance: 'static,
{
    let mut core = Core::new()?;
    let handle = core.handle();
    let address = listener.local_addr()?;
    let listener = TcpListener::from_listener(listener, &address, &handle)?;
    info!("Server listening on {}", address);

    let server = listener.incoming().for_each(|(socket, peer)| -> io::Result<()> {
        debug!("Accepted connection from {}", peer);
        let service = new_service.new_service()?;
        ServerProtocol.bind_server(&handle, socket, service);
        Ok(())
    });
    core.run(server)
}

/// Binds `config.address` and answers probes forever.
pub fn serve(config: &ServerConfig) -> Result<()> {
    let address = config
        .address
        .to_socket_addrs()
        .map_err(|source| Error::Resolve {
            address: config.address.clone(),
            source,
        })?
        .next()
        .ok_or_else(|| Error::NoAddress {
            address: config.address.clone(),
        })?;
    let listener = net::TcpListener::bind(address)?;

    let timer = probe_timer();
    serve_listener(listener, move || -> io::Result<ProbeService> {
        Ok(ProbeService::new(timer.clone()))
    })?;
    Ok(())
}
