//! A closed error taxonomy for the socket/acceptor/reactor layer.
//!
//! Each variant names the construct that failed, following the flat
//! enum style `quick_error!` produces rather than a class-style
//! inheritance chain — Rust error taxonomies are conventionally flat
//! enums, not class hierarchies.

use std::io;

use quick_error::quick_error;

quick_error! {
    /// Failure modes surfaced by the socket/acceptor/reactor layer.
    #[derive(Debug)]
    pub enum TcpError {
        /// A platform-specific failure not covered by a more specific
        /// variant (e.g. failing to create the underlying reactor).
        Platform(err: io::Error) {
            display("platform error: {}", err)
            source(err)
        }
        /// A socket-level failure not covered by a more specific variant.
        Socket(err: io::Error) {
            display("socket error: {}", err)
            source(err)
        }
        /// Failure sending data on a connected socket.
        Send(err: io::Error) {
            display("send error: {}", err)
            source(err)
        }
        /// Failure receiving data on a connected socket.
        Receive(err: io::Error) {
            display("receive error: {}", err)
            source(err)
        }
        /// Failure binding the listening socket to an address.
        Bind(err: io::Error) {
            display("bind error: {}", err)
            source(err)
        }
        /// Failure marking the listening socket for `listen(2)`.
        Listen(err: io::Error) {
            display("listen error: {}", err)
            source(err)
        }
        /// Failure accepting an incoming connection.
        Accept(err: io::Error) {
            display("accept error: {}", err)
            source(err)
        }
        /// Failure in the reactor's readiness demultiplexing.
        Service(err: io::Error) {
            display("reactor service error: {}", err)
            source(err)
        }
        /// Failure resolving a host/port to an address.
        Endpoint(err: io::Error) {
            display("endpoint resolution error: {}", err)
            source(err)
        }
        /// Failure applying a socket option.
        SocketOption(err: io::Error) {
            display("socket option error: {}", err)
            source(err)
        }
        /// The requested operation has no implementation on this
        /// platform or in this build.
        NotImplemented(what: &'static str) {
            display("not implemented: {}", what)
        }
    }
}

impl TcpError {
    /// Whether this error is a non-blocking `Accept` that found nothing
    /// pending, rather than a genuine accept failure. `Acceptor::accept`
    /// never blocks, so a caller draining an edge-triggered readiness
    /// event checks this to know when the backlog is empty and it's safe
    /// to go back to `poll()`.
    pub fn is_would_block(&self) -> bool {
        match self {
            TcpError::Accept(err) => err.kind() == io::ErrorKind::WouldBlock,
            _ => false,
        }
    }
}

quick_error! {
    /// Per-connection failure classification.
    ///
    /// These never escape the worker thread that produced them: the
    /// connection driver matches on this enum and either writes a stock
    /// `400` response and closes, or closes silently, and then returns.
    #[derive(Debug)]
    pub enum ConnectionError {
        /// The parser returned `Bad`: reply `400 Bad Request` and close.
        ParseBad {
            display("malformed request")
        }
        /// The peer closed the connection before the body (or headers)
        /// were complete: close silently.
        PeerClosed {
            display("peer closed connection before request was complete")
        }
        /// A read or write syscall failed.
        Io(err: TcpError) {
            display("socket I/O error: {}", err)
            source(err)
            from()
        }
    }
}

#[cfg(test)]
mod test {
    use super::TcpError;
    use std::io;

    #[test]
    fn is_would_block_recognises_a_would_block_accept_error() {
        let err = TcpError::Accept(io::Error::new(io::ErrorKind::WouldBlock, "nothing pending"));
        assert!(err.is_would_block());
    }

    #[test]
    fn is_would_block_is_false_for_other_errors() {
        let err = TcpError::Accept(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(!err.is_would_block());

        let err = TcpError::Bind(io::Error::new(io::ErrorKind::WouldBlock, "not accept"));
        assert!(!err.is_would_block());
    }
}
