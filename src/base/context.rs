//! Ergonomic error context helpers.
//!
//! Provides extension traits for converting IO errors into `NetError`
//! variants while keeping the underlying cause in the logs.

use crate::base::neterror::NetError;
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Map a connect/read/write failure to [`NetError::Network`].
    ///
    /// # Example
    /// ```ignore
    /// use fetchnet::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await
    ///     .connection_context("example.com", 443)?;
    /// ```
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError>;

    /// Map a DNS resolution failure to [`NetError::Network`].
    fn dns_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::debug!(host = %host, port, error = %e, "connection failed");
            NetError::Network
        })
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::debug!(domain = %domain, error = %e, "DNS resolution failed");
            NetError::Network
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_connection_context() {
        let result: Result<(), io::Error> =
            Err(Error::new(ErrorKind::ConnectionRefused, "refused"));
        let err = result.connection_context("example.com", 443).unwrap_err();

        assert_eq!(err, NetError::Network);
        assert_eq!(err.to_string(), "Network Error");
    }

    #[test]
    fn test_dns_context() {
        let result: Result<(), io::Error> = Err(Error::new(ErrorKind::NotFound, "no such host"));
        let err = result.dns_context("unknown.example.com").unwrap_err();

        assert!(err.is_network());
    }

    #[test]
    fn test_ok_passes_through() {
        let result: Result<u8, io::Error> = Ok(7);
        assert_eq!(result.connection_context("example.com", 80).unwrap(), 7);
    }
}
