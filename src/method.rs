//! Recognised method tokens.
//!
//! These are provided for convenience when matching on
//! [`Request::method`](crate::request::Request::method); the parser itself
//! does not validate the method token against this list, or against
//! anything else — any non-control, non-special byte sequence is
//! accepted as a method.

pub const OPTIONS: &str = "OPTIONS";
pub const GET: &str = "GET";
pub const HEAD: &str = "HEAD";
pub const POST: &str = "POST";
pub const PUT: &str = "PUT";
pub const TRACE: &str = "TRACE";
pub const CONNECT: &str = "CONNECT";
pub const DELETE: &str = "DELETE";
