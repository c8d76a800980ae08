//! The per-connection lifecycle: read, parse, fill a body if one is
//! declared, hand off to the handler strategy, write the response, close.
//!
//! One `Connection` is created per accepted socket and runs to
//! completion on whatever thread the owning [`HandlerStrategy`] chooses
//! to drive it on — in the bundled threaded strategy, a pool worker.

use std::sync::Arc;

use log::{debug, warn};

use crate::error::ConnectionError;
use crate::parser::{self, ParseResult, RequestParser};
use crate::request::Request;
use crate::response::{stock_response, Response};
use crate::socket::Socket;
use crate::status::Status;
use crate::strategy::HandlerStrategy;

const READ_BUFFER_SIZE: usize = 8192;

/// A function that turns a fully-parsed request into a response. Shared
/// across every connection a server accepts.
pub type Handler = dyn Fn(&Request) -> Response + Send + Sync;

/// Owns an accepted socket through its entire request/response lifecycle.
pub struct Connection {
    socket: Socket,
    buffer: [u8; READ_BUFFER_SIZE],
}

impl Connection {
    pub fn new(socket: Socket) -> Connection {
        Connection { socket, buffer: [0; READ_BUFFER_SIZE] }
    }

    /// Drives the connection to completion: reads and parses the request
    /// line and headers, reads the body if `Content-Length` declares one,
    /// asks `strategy` to run the handler, writes the response, and
    /// closes the socket.
    ///
    /// A parse failure gets a `400 Bad Request` and the connection
    /// closes; a peer that closes mid-request (EOF before the headers
    /// finished) closes silently, with nothing written back, since there
    /// is no complete request to answer.
    pub fn start(mut self, handler: Arc<Handler>, strategy: &dyn HandlerStrategy) {
        let mut request = Request::new();
        match self.read_headers(&mut request) {
            Ok(()) => {}
            Err(ConnectionError::ParseBad) => {
                warn!("malformed request line or headers; replying 400 and closing");
                let _ = self.socket.write(&stock_response(Status::BadRequest));
                self.socket.shutdown();
                return;
            }
            Err(ConnectionError::PeerClosed) | Err(ConnectionError::Io(_)) => {
                debug!("peer closed before headers were complete");
                self.socket.shutdown();
                return;
            }
        }

        if let Err(_err) = self.read_body(&mut request) {
            debug!("peer closed before the declared body was complete");
            self.socket.shutdown();
            return;
        }

        debug!("{} {} -> handler", request.method(), request.raw_uri());
        let Connection { mut socket, .. } = self;
        strategy.handle(Box::new(move || {
            let response = handler(&request);
            let _ = socket.write(&response.raw());
            socket.shutdown();
        }));
    }

    fn read_headers(&mut self, request: &mut Request) -> Result<(), ConnectionError> {
        let mut parser = RequestParser::new();
        loop {
            let n = self.socket.read_some(&mut self.buffer)?;
            if n == 0 {
                return Err(ConnectionError::PeerClosed);
            }
            let (result, consumed) = parser.parse(&self.buffer[..n], request);
            match result {
                ParseResult::Good => {
                    // Any bytes past the headers in this read belong to
                    // the body; feed them in now so they aren't lost.
                    parser::fill(&self.buffer[consumed..n], request);
                    return Ok(());
                }
                ParseResult::Bad => return Err(ConnectionError::ParseBad),
                ParseResult::Indeterminate => continue,
            }
        }
    }

    fn read_body(&mut self, request: &mut Request) -> Result<(), ConnectionError> {
        while !parser::fill(&[], request) {
            let n = self.socket.read_some(&mut self.buffer)?;
            if n == 0 {
                return Err(ConnectionError::PeerClosed);
            }
            parser::fill(&self.buffer[..n], request);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::Request;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;

    struct InlineStrategy;
    impl HandlerStrategy for InlineStrategy {
        fn start(self: Arc<Self>, connection: Connection, handler: Arc<Handler>) {
            connection.start(handler, self.as_ref());
        }

        fn handle(&self, task: Box<dyn FnOnce() + Send>) {
            task();
        }
    }

    fn spawn_pair() -> (Socket, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (Socket::from_stream(server).unwrap(), client)
    }

    #[test]
    fn writes_handler_response_for_a_complete_request() {
        let (socket, mut client) = spawn_pair();
        client.write_all(b"GET /hi HTTP/1.0\r\n\r\n").unwrap();

        let (tx, rx) = mpsc::channel();
        let handler: Arc<Handler> = Arc::new(move |req: &Request| {
            tx.send(req.raw_uri().to_string()).unwrap();
            Response::empty(Status::Ok)
        });
        thread::spawn(move || {
            Connection::new(socket).start(handler, &InlineStrategy);
        });

        assert_eq!(rx.recv().unwrap(), "/hi");
        let mut out = Vec::new();
        client.read_to_end(&mut out).unwrap();
        assert!(out.starts_with(b"HTTP/1.0 200 OK\r\n"));
    }

    #[test]
    fn malformed_request_gets_400_and_close() {
        let (socket, mut client) = spawn_pair();
        client.write_all(b"GET / HTTP/1.0\r\nBad Header\r\n\r\n").unwrap();

        let handler: Arc<Handler> = Arc::new(|_: &Request| Response::empty(Status::Ok));
        thread::spawn(move || {
            Connection::new(socket).start(handler, &InlineStrategy);
        });

        let mut out = Vec::new();
        client.read_to_end(&mut out).unwrap();
        assert!(out.starts_with(b"HTTP/1.0 400 Bad request\r\n"));
    }

    #[test]
    fn peer_closing_mid_headers_closes_silently() {
        let (socket, mut client) = spawn_pair();
        client.write_all(b"GET / HTTP/1.0\r\nX-Partial: 1\r\n").unwrap();
        drop(client);

        let handler: Arc<Handler> = Arc::new(|_: &Request| Response::empty(Status::Ok));
        let handle = thread::spawn(move || {
            Connection::new(socket).start(handler, &InlineStrategy);
        });
        handle.join().unwrap();
    }

    #[test]
    fn reads_declared_body_before_handling() {
        let (socket, mut client) = spawn_pair();
        client
            .write_all(b"POST /items HTTP/1.0\r\nContent-Length: 5\r\n\r\nhello")
            .unwrap();

        let (tx, rx) = mpsc::channel();
        let handler: Arc<Handler> = Arc::new(move |req: &Request| {
            tx.send(req.body().to_vec()).unwrap();
            Response::empty(Status::Ok)
        });
        thread::spawn(move || {
            Connection::new(socket).start(handler, &InlineStrategy);
        });

        assert_eq!(rx.recv().unwrap(), b"hello");
    }
}
