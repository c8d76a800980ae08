use crate::headers::HeaderList;
use crate::status::Status;
use crate::version::Version;

/// An HTTP response: a status, an ordered header list, and a body.
///
/// Construction auto-appends `Content-Length` and `Content-Type` headers
/// only when the body is non-empty: a `Response` built with an empty
/// body carries neither header.
#[derive(Clone, Debug)]
pub struct Response {
    status: Status,
    headers: HeaderList,
    body: Vec<u8>,
}

impl Response {
    /// Builds a response with the given status, body and media type.
    /// `media_type` is ignored (and `Content-Type` omitted) when `body`
    /// is empty.
    pub fn new(status: Status, body: impl Into<Vec<u8>>, media_type: &str) -> Response {
        let body = body.into();
        let mut headers = HeaderList::new();
        if !body.is_empty() {
            headers.push("Content-Length", body.len().to_string());
            headers.push("Content-Type", media_type.to_string());
        }
        Response { status, headers, body }
    }

    /// Builds a response with no body and no auto-appended headers.
    pub fn empty(status: Status) -> Response {
        Response { status, headers: HeaderList::new(), body: Vec::new() }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn headers_mut(&mut self) -> &mut HeaderList {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response to wire bytes: status line, each header as
    /// `name: value\r\n`, a blank line, then the body unchanged.
    ///
    /// A handler may legitimately return any [`Status`] member, including
    /// ones with no stock reason phrase (e.g. `MethodNotAllowed`); this is
    /// called unconditionally on whatever a handler returns, so it must
    /// never panic on the request-handling path. A status with no stock
    /// phrase falls back to an empty reason, same as [`stock_response`];
    /// callers that want a specific phrase for such a status should use
    /// [`raw_with_reason`](Response::raw_with_reason) instead.
    pub fn raw(&self) -> Vec<u8> {
        self.raw_with_reason(self.status.reason().unwrap_or(""))
    }

    /// Serializes the response to wire bytes using an explicit reason
    /// phrase, for statuses outside the stock set.
    pub fn raw_with_reason(&self, reason: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(
            format!("{} {} {}\r\n", Version::HTTP_10, self.status.code(), reason).as_bytes(),
        );
        for (name, value) in self.headers.iter() {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

/// A status-line-only response, used for protocol failures encountered
/// before a real response body is known (e.g. a `400 Bad Request` from the
/// parser, or a hard error surfaced by [`HandlerStrategy::respond`](crate::strategy::HandlerStrategy::respond)).
pub fn stock_response(status: Status) -> Vec<u8> {
    let reason = status.reason().unwrap_or("");
    format!("{} {} {}\r\n", Version::HTTP_10, status.code(), reason).into_bytes()
}
