//! Common test utilities for pshs integration tests
//!
//! Each suite starts the real `pshs` binary in a temporary directory and
//! talks to it over HTTP(S).

#![allow(dead_code)] // Not every suite uses every helper
#![allow(unused_imports)]

pub mod assertions;
pub mod client;
pub mod network;
pub mod server;
pub mod ssl;

pub use assertions::ResponseAssertions;
pub use client::TestClient;
pub use network::NetworkTestHelper;
pub use server::TestServer;
pub use ssl::SslTestHelper;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_port_availability() {
        let port = NetworkTestHelper::get_available_port_from(3200)
            .await
            .unwrap();
        assert!(port >= 3200);
    }

    #[test]
    fn test_ssl_certificate_generation() {
        let (cert_pem, key_pem) = SslTestHelper::generate_test_certificate().unwrap();
        assert!(cert_pem.contains("BEGIN CERTIFICATE"));
        assert!(key_pem.contains("PRIVATE KEY"));
    }
}
