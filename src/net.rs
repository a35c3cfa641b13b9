// Local network address discovery
// Used for the startup banner so other machines on the LAN know where to connect

use std::net::{IpAddr, UdpSocket};

/// Fallback host when no outbound interface can be determined
pub const FALLBACK_HOST: &str = "localhost";

/// Best-effort LAN address of this machine.
///
/// Connecting a UDP socket sends no packets; it only asks the OS which
/// local interface would route to the target.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified() && !ip.is_loopback()).then_some(ip)
}

/// URL other hosts on the network should open
pub fn base_url(port: u16) -> String {
    let host = local_ip().map_or_else(|| FALLBACK_HOST.to_string(), |ip| ip.to_string());
    format_base_url(&host, port)
}

fn format_base_url(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("http://[{host}]:{port}")
    } else {
        format!("http://{host}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_base_url() {
        assert_eq!(format_base_url("192.168.1.10", 8080), "http://192.168.1.10:8080");
        assert_eq!(format_base_url("localhost", 9000), "http://localhost:9000");
        assert_eq!(format_base_url("fe80::1", 80), "http://[fe80::1]:80");
    }

    #[test]
    fn test_base_url_has_port() {
        let url = base_url(8123);
        assert!(url.starts_with("http://"));
        assert!(url.ends_with(":8123"));
    }
}
