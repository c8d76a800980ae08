use std::fmt::{self, Display};

/// An HTTP version, as a major/minor pair.
///
/// Only HTTP/1.0 is produced by [`RequestParser`](crate::parser::RequestParser)
/// in the wire sense (the server only ever emits `HTTP/1.0` status lines),
/// but the type itself is not restricted to that pair so that a parsed
/// request line of `HTTP/1.1` or `HTTP/0.9` can still be represented and
/// inspected rather than rejected at the version-parsing stage.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    pub fn new(major: u16, minor: u16) -> Version {
        Version { major, minor }
    }

    /// The version this server's responses are always written with.
    pub const HTTP_10: Version = Version { major: 1, minor: 0 };
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod test {
    use super::Version;

    #[test]
    fn formats_as_wire_text() {
        assert_eq!(Version::new(1, 0).to_string(), "HTTP/1.0");
        assert_eq!(Version::new(1, 1).to_string(), "HTTP/1.1");
    }

    #[test]
    fn orders_by_major_then_minor() {
        assert!(Version::new(1, 0) < Version::new(1, 1));
        assert!(Version::new(0, 9) < Version::new(1, 0));
    }
}
