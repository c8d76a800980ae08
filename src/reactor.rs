//! The event loop: demultiplexes readiness over registered acceptors and
//! the signal set, and nothing else. Request bodies and responses are
//! handled with blocking I/O on worker threads; the reactor's only job
//! is to unblock the accept loop either because a new connection is
//! ready or because a shutdown signal arrived, so that the server can
//! check both without a worker thread sitting inside a blocking
//! `accept()` forever.

use std::io;

use mio::{Events, Interest, Poll, Token};

use crate::acceptor::Acceptor;
use crate::error::TcpError;
use crate::signal::SignalSet;

const ACCEPTOR_TOKEN: Token = Token(0);
const SIGNAL_TOKEN: Token = Token(1);

/// What woke the reactor's `run` up.
pub enum Wake {
    /// The registered acceptor has at least one pending connection.
    AcceptorReady,
    /// A shutdown signal was delivered; carries the signal number.
    Signal(i32),
}

/// Owns the readiness registrations for the listening acceptor and the
/// one signal source. This crate only ever registers a single acceptor
/// at a time (one listening socket per `Server`), but the
/// `register_acceptor`/`deregister_acceptor` seam is kept distinct from
/// construction so a future multi-listener server isn't a breaking change.
pub struct Reactor {
    poll: Poll,
    signals: SignalSet,
    acceptor_registered: bool,
}

impl Reactor {
    pub fn new() -> Result<Reactor, TcpError> {
        let poll = Poll::new().map_err(TcpError::Service)?;
        let mut signals = SignalSet::new().map_err(TcpError::Platform)?;
        poll.registry()
            .register(signals.source(), SIGNAL_TOKEN, Interest::READABLE)
            .map_err(TcpError::Service)?;
        Ok(Reactor { poll, signals, acceptor_registered: false })
    }

    /// Registers `acceptor`'s listener for readiness notifications. The
    /// reactor does not take ownership of the acceptor, only a readiness
    /// registration on it.
    pub fn register_acceptor(&mut self, acceptor: &mut Acceptor) -> Result<(), TcpError> {
        self.poll
            .registry()
            .register(acceptor.listener_mut(), ACCEPTOR_TOKEN, Interest::READABLE)
            .map_err(TcpError::Service)?;
        self.acceptor_registered = true;
        Ok(())
    }

    pub fn deregister_acceptor(&mut self, acceptor: &mut Acceptor) -> Result<(), TcpError> {
        self.poll
            .registry()
            .deregister(acceptor.listener_mut())
            .map_err(TcpError::Service)?;
        self.acceptor_registered = false;
        Ok(())
    }

    /// Blocks until the acceptor becomes readable or a shutdown signal is
    /// received, whichever happens first. Returns `Ok(None)` only when no
    /// acceptor is registered; in this crate's only caller (`Server::run`)
    /// the acceptor is always registered before `run` is first called, so
    /// that branch is there for completeness rather than something the
    /// main loop relies on.
    pub fn wait(&mut self) -> Result<Option<Wake>, TcpError> {
        if !self.acceptor_registered {
            return Ok(None);
        }
        let mut events = Events::with_capacity(16);
        'poll: loop {
            match self.poll.poll(&mut events, None) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue 'poll,
                Err(e) => return Err(TcpError::Service(e)),
            }
            for event in events.iter() {
                if event.token() == SIGNAL_TOKEN {
                    if let Some(signal) = self.signals.received() {
                        return Ok(Some(Wake::Signal(signal)));
                    }
                } else if event.token() == ACCEPTOR_TOKEN {
                    return Ok(Some(Wake::AcceptorReady));
                }
            }
            // Spurious wakeup (e.g. a signal-fd event with nothing
            // actually pending yet): poll again rather than report a
            // wakeup the caller can't act on.
        }
    }
}
