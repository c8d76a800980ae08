//! Endpoint resolution: host/port → concrete addresses suitable for
//! `bind`/`connect`.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::error::TcpError;

/// A resolved (host, port) pair: the ordered list of concrete addresses a
/// resolver returned, ready to hand to [`Acceptor::bind`](crate::acceptor::Acceptor::bind).
pub struct Endpoint {
    addrs: Vec<SocketAddr>,
}

impl Endpoint {
    /// Resolves `host:port` using the platform resolver. Fails with
    /// [`TcpError::Endpoint`] if resolution produces no addresses at all.
    pub fn resolve(host: &str, port: u16) -> Result<Endpoint, TcpError> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(TcpError::Endpoint)?
            .collect();
        if addrs.is_empty() {
            return Err(TcpError::Endpoint(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("no addresses for {}:{}", host, port),
            )));
        }
        Ok(Endpoint { addrs })
    }

    /// The first resolved address, the one [`Acceptor::bind`](crate::acceptor::Acceptor::bind)
    /// uses by default.
    pub fn primary(&self) -> SocketAddr {
        self.addrs[0]
    }

    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }
}

#[cfg(test)]
mod test {
    use super::Endpoint;

    #[test]
    fn resolves_localhost() {
        let endpoint = Endpoint::resolve("127.0.0.1", 0).unwrap();
        assert!(!endpoint.addrs().is_empty());
        assert!(endpoint.primary().is_ipv4());
    }
}
