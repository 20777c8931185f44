// src/middleware/client.rs

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::headers::{HeaderMapExt, UserAgent};

use crate::{config::AppState, models::session::ClientInfo};

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const REAL_IP_HEADER: &str = "x-real-ip";
// Set by the CDN in front of the site
const LOCATION_HEADER: &str = "x-client-location";

const UNKNOWN_IP: &str = "unknown";
const UNKNOWN_LOCATION: &str = "Unknown";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Nearest `X-Forwarded-For` hop that isn't one of our proxies, then `X-Real-IP`.
fn forwarded_client(headers: &HeaderMap, trusted_proxies: &[IpAddr]) -> Option<String> {
    let hop = header_str(headers, FORWARDED_FOR_HEADER).and_then(|chain| {
        chain
            .rsplit(',')
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .find(|hop| hop.parse::<IpAddr>().map_or(true, |ip| !trusted_proxies.contains(&ip)))
    });

    hop.or_else(|| header_str(headers, REAL_IP_HEADER)).map(str::to_string)
}

impl ClientInfo {
    /// The socket peer is the client unless it is a trusted proxy, in which case
    /// the proxy headers name the client.
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>, trusted_proxies: &[IpAddr]) -> Self {
        let ip = match peer.map(|addr| addr.ip()) {
            Some(peer_ip) if trusted_proxies.contains(&peer_ip) => {
                forwarded_client(headers, trusted_proxies).unwrap_or_else(|| peer_ip.to_string())
            }
            Some(peer_ip) => peer_ip.to_string(),
            None => UNKNOWN_IP.to_string(),
        };

        let user_agent = headers.typed_get::<UserAgent>().map(|ua| ua.as_str().to_string());

        let location = header_str(headers, LOCATION_HEADER)
            .unwrap_or(UNKNOWN_LOCATION)
            .to_string();

        Self { ip, user_agent, location }
    }
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Only present when served with `into_make_service_with_connect_info`
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientInfo::from_headers(&parts.headers, peer, &state.config.trusted_proxies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn peer(addr: &str) -> Option<SocketAddr> {
        Some(addr.parse().unwrap())
    }

    fn proxies(ips: &[&str]) -> Vec<IpAddr> {
        ips.iter().map(|ip| ip.parse().unwrap()).collect()
    }

    #[test]
    fn untrusted_peer_is_the_client_whatever_the_headers_say() {
        let socket = peer("198.51.100.1:50000");
        let keys: Vec<String> = ["1.1.1.1", "2.2.2.2", "203.0.113.50"]
            .iter()
            .map(|spoofed| {
                let mut map = HeaderMap::new();
                map.insert("x-forwarded-for", HeaderValue::from_str(spoofed).unwrap());
                map.insert("x-real-ip", HeaderValue::from_str(spoofed).unwrap());
                ClientInfo::from_headers(&map, socket, &[]).key().to_string()
            })
            .collect();
        assert_eq!(keys, vec!["198.51.100.1"; 3]);
    }

    #[test]
    fn trusted_proxy_forwards_the_nearest_untrusted_hop() {
        let info = ClientInfo::from_headers(
            &headers(&[("x-forwarded-for", "1.1.1.1, 203.0.113.7, 10.0.0.2"), ("x-real-ip", "10.0.0.9")]),
            peer("10.0.0.1:443"),
            &proxies(&["10.0.0.1", "10.0.0.2"]),
        );
        // The leftmost entry was written by the client and is skipped
        assert_eq!(info.key(), "203.0.113.7");
    }

    #[test]
    fn trusted_proxy_falls_back_to_real_ip_then_itself() {
        let trusted = proxies(&["10.0.0.1"]);
        let info = ClientInfo::from_headers(&headers(&[("x-real-ip", "198.51.100.4")]), peer("10.0.0.1:443"), &trusted);
        assert_eq!(info.ip, "198.51.100.4");

        let info = ClientInfo::from_headers(&HeaderMap::new(), peer("10.0.0.1:443"), &trusted);
        assert_eq!(info.ip, "10.0.0.1");
    }

    #[test]
    fn missing_peer_is_unknown() {
        let info = ClientInfo::from_headers(&headers(&[("x-forwarded-for", "203.0.113.7")]), None, &[]);
        assert_eq!(info.ip, "unknown");
    }

    #[test]
    fn reads_user_agent_and_location() {
        let info = ClientInfo::from_headers(
            &headers(&[("user-agent", "Mozilla/5.0 (X11; Linux x86_64)"), ("x-client-location", "Pune, IN")]),
            None,
            &[],
        );
        assert_eq!(info.user_agent.as_deref(), Some("Mozilla/5.0 (X11; Linux x86_64)"));
        assert_eq!(info.location, "Pune, IN");
    }

    #[test]
    fn missing_location_is_unknown() {
        let info = ClientInfo::from_headers(&HeaderMap::new(), None, &[]);
        assert_eq!(info.location, "Unknown");
        assert_eq!(info.user_agent, None);
    }
}
