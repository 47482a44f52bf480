// src/upnp.rs
// Port redirection on the local Internet gateway

use igd_next::{search_gateway, Gateway, PortMappingProtocol, SearchOptions};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(2);
const MAPPING_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " file sharing");

/// A TCP port forwarded from the gateway to this host.
///
/// The mapping is removed again when the value is dropped.
pub struct PortMapping {
    gateway: Gateway,
    port: u16,
    external_ip: IpAddr,
}

impl PortMapping {
    /// Forward `port` on the gateway to `local:port`.
    pub fn establish(local: Ipv4Addr, port: u16) -> Result<Self, String> {
        let options = SearchOptions {
            timeout: Some(SEARCH_TIMEOUT),
            ..Default::default()
        };
        let gateway =
            search_gateway(options).map_err(|e| format!("No UPnP gateway found: {}", e))?;

        let external_ip = gateway
            .get_external_ip()
            .map(IpAddr::from)
            .map_err(|e| format!("UPnP gateway did not report an external IP: {}", e))?;

        gateway
            .add_port(
                PortMappingProtocol::TCP,
                port,
                SocketAddr::new(IpAddr::V4(local), port),
                0,
                MAPPING_DESCRIPTION,
            )
            .map_err(|e| format!("UPnP port redirection failed: {}", e))?;

        log::debug!("UPnP: {}:{} -> {}:{}", external_ip, port, local, port);

        Ok(PortMapping {
            gateway,
            port,
            external_ip,
        })
    }

    pub fn external_ip(&self) -> IpAddr {
        self.external_ip
    }
}

impl Drop for PortMapping {
    fn drop(&mut self) {
        if let Err(e) = self.gateway.remove_port(PortMappingProtocol::TCP, self.port) {
            log::warn!("Removing UPnP redirection of port {} failed: {}", self.port, e);
        }
    }
}

/// Try UPnP for a host whose best address is `local`. Only addresses that
/// are not reachable from outside a LAN need redirection.
pub fn redirect_if_needed(local: IpAddr, port: u16) -> Option<PortMapping> {
    let local = match local {
        IpAddr::V4(v4) if needs_redirection(&v4) => v4,
        _ => return None,
    };

    match PortMapping::establish(local, port) {
        Ok(mapping) => Some(mapping),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

fn needs_redirection(addr: &Ipv4Addr) -> bool {
    addr.is_private() || addr.is_link_local()
}
