use super::probe::{Probe, ProbeError, ProbeResponse};
use crate::app::NavigatorSettings;
use async_trait::async_trait;
use reqwest::{Client, Method};
use url::Url;

/// Probes a URL with `HEAD`, falling back to `GET` for servers that refuse
/// or mishandle `HEAD`.
pub struct HttpProbe {
    client: Client,
    get_fallback: bool,
}

impl HttpProbe {
    pub fn new(settings: &NavigatorSettings) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            get_fallback: settings.get_fallback,
        })
    }

    async fn request(&self, method: Method, url: &Url) -> Result<u16, reqwest::Error> {
        let response = self.client.request(method.clone(), url.as_str()).send().await?;
        let status = response.status();
        log::debug!(
            "{} {} -> {} (final url {})",
            method,
            url,
            status,
            response.url()
        );
        Ok(status.as_u16())
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, url: &Url) -> ProbeResponse {
        let head = self.request(Method::HEAD, url).await;
        let head_status = head.as_ref().ok().copied();
        match head {
            Ok(status) if status < 400 => return ProbeResponse::Status(status),
            Ok(status) if !self.get_fallback => return ProbeResponse::Status(status),
            Err(e) if !self.get_fallback => return ProbeResponse::TransportFailure(e.to_string()),
            Ok(status) => log::debug!("HEAD {} returned {}, retrying with GET", url, status),
            Err(e) => log::debug!("HEAD {} failed ({}), retrying with GET", url, e),
        }

        fallback_response(head_status, self.request(Method::GET, url).await)
    }
}

/// Combine a failed or refused HEAD with the GET retry. A status the server
/// already gave for HEAD wins over a GET that could not be sent.
fn fallback_response(head_status: Option<u16>, get: Result<u16, reqwest::Error>) -> ProbeResponse {
    match (get, head_status) {
        (Ok(status), _) => ProbeResponse::Status(status),
        (Err(e), Some(status)) => {
            log::debug!("GET retry failed ({}), keeping HEAD status {}", e, status);
            ProbeResponse::Status(status)
        }
        (Err(e), None) => ProbeResponse::TransportFailure(e.to_string()),
    }
}
