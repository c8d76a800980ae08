//! The listening-socket abstraction.
//!
//! `Acceptor` is deliberately thin: `open`, `set_option`, `bind`,
//! `listen`, and a non-blocking `accept`. The server's accept loop
//! registers the acceptor with a [`Reactor`](crate::reactor::Reactor),
//! waits for readiness, and then drains `accept` in a loop until it
//! reports `WouldBlock`; see
//! [`Reactor::register_acceptor`](crate::reactor::Reactor::register_acceptor).

use std::io;
use std::net::SocketAddr;

use net2::TcpBuilder;

use crate::error::TcpError;
use crate::socket::Socket;

/// Socket options `Acceptor::set_option` understands. Open for
/// extension — currently only address reuse is defined.
#[derive(Copy, Clone, Debug)]
pub enum SocketOption {
    ReuseAddress(bool),
}

/// A listening socket, built up through the `open`/`set_option`/`bind`/
/// `listen` sequence before any connection is accepted.
pub struct Acceptor {
    builder: Option<TcpBuilder>,
    listener: Option<mio::net::TcpListener>,
    reuse_address: bool,
}

impl Acceptor {
    /// Opens a new (unbound) IPv4 or IPv6 acceptor, chosen to match
    /// `addr`'s family.
    pub fn open(addr: SocketAddr) -> Result<Acceptor, TcpError> {
        let builder = if addr.is_ipv4() {
            TcpBuilder::new_v4()
        } else {
            TcpBuilder::new_v6()
        }
        .map_err(TcpError::Platform)?;
        Ok(Acceptor { builder: Some(builder), listener: None, reuse_address: false })
    }

    /// Sets a socket option. Must be called before [`Acceptor::bind`].
    pub fn set_option(&mut self, option: SocketOption) -> Result<(), TcpError> {
        match option {
            SocketOption::ReuseAddress(value) => {
                self.reuse_address = value;
                self.builder
                    .as_ref()
                    .expect("set_option called after bind")
                    .reuse_address(value)
                    .map_err(TcpError::SocketOption)?;
            }
        }
        Ok(())
    }

    /// Binds to `addr` and starts listening with the given backlog,
    /// registering the resulting listener for non-blocking readiness
    /// notifications (what [`Reactor`](crate::reactor::Reactor) polls on).
    pub fn bind(&mut self, addr: SocketAddr, backlog: i32) -> Result<(), TcpError> {
        let builder = self.builder.take().expect("bind called twice");
        builder.bind(addr).map_err(TcpError::Bind)?;
        let std_listener = builder.listen(backlog).map_err(TcpError::Listen)?;
        std_listener.set_nonblocking(true).map_err(TcpError::Platform)?;
        self.listener = Some(mio::net::TcpListener::from_std(std_listener));
        Ok(())
    }

    /// Accepts a single pending connection, returning an owned [`Socket`].
    ///
    /// This never blocks: the listener is non-blocking, so when nothing is
    /// pending this returns `Err(TcpError::Accept(_))` with a
    /// `WouldBlock`-kind source, which [`TcpError::is_would_block`]
    /// recognises. `mio`'s readiness notifications are edge-triggered, so
    /// a single `Ready` event can mean more than one connection is sitting
    /// in the backlog; callers (the server's accept loop) must call this
    /// in a loop until it reports `WouldBlock` before going back to
    /// `poll()`, rather than accepting just once per wakeup.
    pub fn accept(&mut self) -> Result<Socket, TcpError> {
        match self.listener_mut().accept() {
            Ok((stream, _addr)) => {
                let std_stream = stream.into_std().map_err(TcpError::Accept)?;
                Socket::from_stream(std_stream).map_err(TcpError::Accept)
            }
            Err(e) => Err(TcpError::Accept(e)),
        }
    }

    /// The address actually bound, useful after binding to port `0` to
    /// discover which ephemeral port the kernel assigned.
    pub fn local_addr(&mut self) -> io::Result<SocketAddr> {
        self.listener_mut().local_addr()
    }

    pub(crate) fn listener_mut(&mut self) -> &mut mio::net::TcpListener {
        self.listener.as_mut().expect("accept called before bind")
    }
}
