use super::probe::{Probe, ProbeResponse};
use async_trait::async_trait;
use url::Url;

/// Considers a URL reachable when its host resolves. Cheaper than an HTTP
/// request and not subject to servers rejecting unknown clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct DnsProbe;

impl DnsProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for DnsProbe {
    async fn probe(&self, url: &Url) -> ProbeResponse {
        let host = match url.host_str() {
            Some(host) => host.trim_start_matches('[').trim_end_matches(']'),
            None => return ProbeResponse::TransportFailure(format!("{} has no host", url)),
        };
        let port = url.port_or_known_default().unwrap_or(443);

        match tokio::net::lookup_host((host, port)).await {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => {
                    log::debug!("{} resolved to {}", host, addr.ip());
                    ProbeResponse::Resolved
                }
                None => ProbeResponse::TransportFailure(format!("{} has no addresses", host)),
            },
            Err(e) => ProbeResponse::TransportFailure(format!("DNS lookup for {} failed: {}", host, e)),
        }
    }
}
