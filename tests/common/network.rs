//! Port management for test servers

use port_scanner::scan_port_addr;

pub struct NetworkTestHelper;

impl NetworkTestHelper {
    /// Check if a port is available
    pub async fn is_port_available(port: u16) -> bool {
        !scan_port_addr(std::net::SocketAddr::from(([127, 0, 0, 1], port)))
    }

    /// Get the next available port starting from a base port
    pub async fn get_available_port_from(
        start_port: u16,
    ) -> Result<u16, Box<dyn std::error::Error>> {
        for port in start_port..=65534 {
            if Self::is_port_available(port).await {
                return Ok(port);
            }
        }
        Err("No available ports found".into())
    }
}
