use crate::headers::HeaderList;
use crate::uri::Uri;
use crate::version::Version;

/// A fully- or partially-parsed HTTP request.
///
/// `Request` is built incrementally by [`RequestParser`](crate::parser::RequestParser)
/// and [`fill`](crate::parser::fill) as bytes arrive; callers only ever see
/// one once parsing has reached `Good` and (if applicable) the body is
/// complete, at which point it is immutable in the sense that nothing
/// further mutates it before the handler runs.
#[derive(Clone, Debug, Default)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) uri: String,
    pub(crate) version: Version,
    pub(crate) headers: HeaderList,
    pub(crate) body: Vec<u8>,
}

impl Request {
    pub fn new() -> Request {
        Request::default()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> Uri {
        Uri::new(self.uri.clone())
    }

    pub fn raw_uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
