//! A thread-per-connection HTTP/1.0 server runtime.
//!
//! The pieces, leaves first: an octet-at-a-time [`parser`] turns bytes
//! into a [`request::Request`]; a [`connection::Connection`] drives one
//! accepted socket through read/parse/body-fill/handle/write/close; a
//! [`reactor::Reactor`] demultiplexes the listening socket and the
//! process shutdown signals so the accept loop never blocks forever in
//! a single `accept()`; and a [`pool::ThreadPool`] runs the handler for
//! each connection. [`server::Server`] wires all of it together.
//!
//! See [`Server`] for the entry point.

pub mod acceptor;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod headers;
pub mod method;
pub mod parser;
pub mod pool;
pub mod reactor;
pub mod request;
pub mod response;
pub mod server;
pub mod signal;
pub mod socket;
pub mod status;
pub mod strategy;
pub mod uri;
pub mod version;

pub use connection::{Connection, Handler};
pub use request::Request;
pub use response::Response;
pub use server::Server;
pub use status::Status;
pub use strategy::{HandlerStrategy, ThreadedStrategy};
pub use uri::Uri;
