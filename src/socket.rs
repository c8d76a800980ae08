//! The blocking socket primitive.
//!
//! Every suspension point in the connection lifecycle (other than
//! `accept`) goes through one of [`Socket::read_some`] or [`Socket::write`];
//! both block the calling worker thread until the kernel returns, per the
//! thread-per-connection concurrency model.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

use crate::error::TcpError;

/// A connected TCP socket, owned exclusively by the [`Connection`](crate::connection::Connection)
/// that accepted it — the reactor itself owns no sockets.
pub struct Socket {
    stream: TcpStream,
}

impl Socket {
    pub(crate) fn from_stream(stream: TcpStream) -> io::Result<Socket> {
        stream.set_nonblocking(false)?;
        Ok(Socket { stream })
    }

    /// Blocks until `buffer` is filled exactly, or fails.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<(), TcpError> {
        self.stream.read_exact(buffer).map_err(TcpError::Receive)
    }

    /// Blocks until at least one byte is available, returning how many
    /// were read. A return of `0` means the peer closed its write half
    /// (EOF): zero bytes is EOF, a positive count is a successful read,
    /// never the other way around.
    pub fn read_some(&mut self, buffer: &mut [u8]) -> Result<usize, TcpError> {
        self.stream.read(buffer).map_err(TcpError::Receive)
    }

    /// Blocks until all of `data` has been written.
    pub fn write(&mut self, data: &[u8]) -> Result<(), TcpError> {
        self.stream.write_all(data).map_err(TcpError::Send)
    }

    /// Blocks until at least one byte of `data` has been written,
    /// returning how many were.
    pub fn write_some(&mut self, data: &[u8]) -> Result<usize, TcpError> {
        self.stream.write(data).map_err(TcpError::Send)
    }

    /// Marks the connection for a graceful close: no further data will be
    /// sent or received, but any data already queued by the kernel is
    /// still delivered.
    pub fn shutdown(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    /// Closes the connection immediately. Implemented by dropping the
    /// underlying stream, which is what `close` ultimately does on every
    /// platform this crate targets; kept as an explicit method so callers
    /// don't need to know that.
    pub fn close(self) {
        drop(self);
    }

    pub fn peer_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.stream.peer_addr()
    }
}
