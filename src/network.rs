// src/network.rs
// Port selection and discovery of the address clients should use

use local_ip_address::{list_afinet_netifas, local_ip};
use port_check::is_port_reachable;
use rand::Rng;
use std::net::{IpAddr, Ipv4Addr};

use crate::registry::FileRegistry;

/// Random ports stay above the privileged range and below the usual
/// ephemeral range used for outgoing connections.
pub const RANDOM_PORT_MIN: u16 = 0x400;
pub const RANDOM_PORT_MAX: u16 = 0x7ffe;
const RANDOM_PORT_ATTEMPTS: usize = 64;

/// How public an IPv4 address is. Lower ranks are preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Locality {
    Global,
    Private,
    LinkLocal,
    Loopback,
}

fn locality(addr: &Ipv4Addr) -> Locality {
    if addr.is_loopback() {
        Locality::Loopback
    } else if addr.is_link_local() {
        Locality::LinkLocal
    } else if addr.is_private() {
        Locality::Private
    } else {
        Locality::Global
    }
}

pub struct NetworkUtils;

impl NetworkUtils {
    /// Check if a port is available on the given host
    pub fn is_port_available(host: IpAddr, port: u16) -> bool {
        // A reachable port already has a listener.
        !is_port_reachable((host, port))
    }

    /// Pick a random free port in `RANDOM_PORT_MIN..=RANDOM_PORT_MAX`.
    pub fn random_port(host: IpAddr) -> Option<u16> {
        let mut rng = rand::thread_rng();
        (0..RANDOM_PORT_ATTEMPTS)
            .map(|_| rng.gen_range(RANDOM_PORT_MIN..=RANDOM_PORT_MAX))
            .find(|&port| Self::is_port_available(host, port))
    }

    /// Use the requested port if it is free, otherwise pick a random one when
    /// none was requested.
    pub fn resolve_port(host: IpAddr, requested_port: Option<u16>) -> Result<u16, String> {
        match requested_port {
            Some(port) if Self::is_port_available(host, port) => Ok(port),
            Some(port) => Err(format!("Port {} is already in use.", port)),
            None => Self::random_port(host).ok_or_else(|| {
                format!(
                    "No free port found in the range {}-{}.",
                    RANDOM_PORT_MIN, RANDOM_PORT_MAX
                )
            }),
        }
    }

    /// Choose the most public IPv4 interface address from `candidates`.
    fn best_address<I>(candidates: I) -> Option<IpAddr>
    where
        I: IntoIterator<Item = IpAddr>,
    {
        candidates
            .into_iter()
            .filter_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .min_by_key(locality)
            .map(IpAddr::V4)
    }

    /// Address to advertise to clients for a server bound to `bind`.
    pub fn external_address(bind: IpAddr) -> Option<IpAddr> {
        if !bind.is_unspecified() {
            return Some(bind);
        }

        match list_afinet_netifas() {
            Ok(interfaces) => Self::best_address(interfaces.into_iter().map(|(_, ip)| ip)),
            Err(e) => {
                log::debug!("Listing network interfaces failed: {}", e);
                local_ip().ok()
            }
        }
    }

    /// Full URL of the index page, or of the only file when exactly one is shared.
    pub fn server_url(scheme: &str, host: IpAddr, port: u16, registry: &FileRegistry) -> String {
        let formatted_host = match host {
            IpAddr::V6(v6) => format!("[{}]", v6),
            IpAddr::V4(v4) => v4.to_string(),
        };

        let path = match registry.entries() {
            [only] => registry.href(only),
            _ => registry.index_route(),
        };

        format!("{}://{}:{}{}", scheme, formatted_host, port, path)
    }
}
