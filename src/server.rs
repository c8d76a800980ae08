//! The top-level `Server`: resolves an endpoint, binds a listening
//! socket, drives the accept loop through the reactor, and hands each
//! accepted connection to a [`HandlerStrategy`].

use std::sync::Arc;

use log::{error, info};

use crate::acceptor::{Acceptor, SocketOption};
use crate::connection::{Connection, Handler};
use crate::endpoint::Endpoint;
use crate::error::TcpError;
use crate::pool::ThreadPool;
use crate::reactor::{Reactor, Wake};
use crate::request::Request;
use crate::response::Response;
use crate::strategy::{HandlerStrategy, ThreadedStrategy};

/// `listen(2)` backlog used for every server's acceptor.
const DEFAULT_BACKLOG: i32 = 128;

/// A bound, not-yet-running HTTP/1.0 server.
///
/// Construction (`bind`/`with_strategy`) resolves the endpoint, opens
/// and binds the acceptor, and registers it with a fresh [`Reactor`];
/// none of that happens lazily inside [`Server::run`].
pub struct Server {
    acceptor: Acceptor,
    reactor: Reactor,
    handler: Arc<Handler>,
    strategy: Arc<dyn HandlerStrategy>,
}

impl Server {
    /// Binds `host:port` with the bundled [`ThreadedStrategy`], sized
    /// with [`ThreadPool::default_sized`] (hardware-parallelism threads,
    /// `max_load` 500).
    pub fn bind<F>(host: &str, port: u16, handler: F) -> Result<Server, TcpError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        Server::with_strategy(host, port, handler, Arc::new(ThreadedStrategy::default_sized()))
    }

    /// Binds `host:port` with the bundled [`ThreadedStrategy`] over a
    /// pool built from explicit `max_threads`/`max_load` parameters.
    pub fn bind_with_pool<F>(
        host: &str,
        port: u16,
        handler: F,
        max_threads: Option<usize>,
        max_load: usize,
    ) -> Result<Server, TcpError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        let pool = ThreadPool::new(max_threads, max_load);
        Server::with_strategy(host, port, handler, Arc::new(ThreadedStrategy::new(pool)))
    }

    /// Binds `host:port` with a caller-supplied strategy, for callers
    /// that want request handling scheduled some other way than the
    /// bundled bounded thread pool.
    pub fn with_strategy<F>(
        host: &str,
        port: u16,
        handler: F,
        strategy: Arc<dyn HandlerStrategy>,
    ) -> Result<Server, TcpError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        let endpoint = Endpoint::resolve(host, port)?;
        let addr = endpoint.primary();

        let mut acceptor = Acceptor::open(addr)?;
        acceptor.set_option(SocketOption::ReuseAddress(true))?;
        acceptor.bind(addr, DEFAULT_BACKLOG)?;

        let mut reactor = Reactor::new()?;
        reactor.register_acceptor(&mut acceptor)?;

        info!("listening on {}", addr);
        let handler: Arc<Handler> = Arc::new(handler);
        Ok(Server { acceptor, reactor, handler, strategy })
    }

    /// The address actually bound; useful after binding to port `0` to
    /// discover the ephemeral port the kernel assigned.
    pub fn local_addr(&mut self) -> std::io::Result<std::net::SocketAddr> {
        self.acceptor.local_addr()
    }

    /// Runs the accept loop until a shutdown signal arrives or the
    /// acceptor itself fails, returning the signal number that stopped
    /// it (or `0` on an accept failure or if the reactor reports no
    /// registered services).
    ///
    /// Every accepted connection is handed to the strategy's `start`
    /// immediately; `run` itself never blocks inside a connection's
    /// read/parse/write flow, only inside [`Reactor::wait`].
    pub fn run(mut self) -> i32 {
        loop {
            match self.reactor.wait() {
                Ok(Some(Wake::AcceptorReady)) => {
                    // `mio`'s readiness events are edge-triggered: one
                    // wakeup can mean several connections are already
                    // sitting in the listen backlog, so drain it down to
                    // `WouldBlock` before going back to `reactor.wait()`,
                    // rather than accepting just one per wakeup.
                    loop {
                        match self.acceptor.accept() {
                            Ok(socket) => {
                                let connection = Connection::new(socket);
                                Arc::clone(&self.strategy)
                                    .start(connection, Arc::clone(&self.handler));
                            }
                            Err(err) if err.is_would_block() => break,
                            Err(err) => {
                                error!("accept failed, stopping server: {}", err);
                                return 0;
                            }
                        }
                    }
                }
                Ok(Some(Wake::Signal(signal))) => {
                    info!("received signal {}, shutting down", signal);
                    return signal;
                }
                Ok(None) => return 0,
                Err(err) => {
                    error!("reactor error, stopping server: {}", err);
                    return 0;
                }
            }
        }
    }
}
