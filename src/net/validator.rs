use super::probe::{Probe, ProbeResponse};
use crate::app::page::canonicalize;
use crate::app::{NavigatorSettings, TransportFailurePolicy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use url::Url;

/// Token to abandon an in-flight validation
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not missed
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    RejectedInvalidFormat,
    RejectedUnreachable,
    RejectedTimeout,
}

/// Decides whether a navigation target exists.
///
/// Internal pages are always accepted. External targets get one probe with a
/// hard deadline.
pub struct TargetValidator {
    probe: Arc<dyn Probe>,
    timeout: Duration,
    transport_failure: TransportFailurePolicy,
}

impl TargetValidator {
    pub fn new(probe: Arc<dyn Probe>, settings: &NavigatorSettings) -> Self {
        Self {
            probe,
            timeout: settings.probe_timeout,
            transport_failure: settings.transport_failure,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn validate(&self, raw: &str) -> ValidationOutcome {
        let page = match canonicalize(raw) {
            Ok(page) => page,
            Err(_) => return ValidationOutcome::RejectedInvalidFormat,
        };

        if page.is_internal() {
            return ValidationOutcome::Accepted;
        }

        let url = match Url::parse(page.canonical()) {
            Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => url,
            Ok(url) => {
                log::info!("Rejecting {}: no host", url);
                return ValidationOutcome::RejectedInvalidFormat;
            }
            Err(e) => {
                log::info!("Rejecting {}: {}", page, e);
                return ValidationOutcome::RejectedInvalidFormat;
            }
        };

        let start = Instant::now();
        let response = match tokio::time::timeout(self.timeout, self.probe.probe(&url)).await {
            Ok(response) => response,
            Err(_) => {
                log::info!("Probe for {} timed out after {:?}", url, self.timeout);
                return ValidationOutcome::RejectedTimeout;
            }
        };
        log::debug!(
            "Probe for {} finished in {:.0}ms: {:?}",
            url,
            start.elapsed().as_secs_f32() * 1000.0,
            response
        );

        match response {
            ProbeResponse::Status(status) if status < 400 => ValidationOutcome::Accepted,
            ProbeResponse::Status(status) => {
                log::info!("{} answered with status {}", url, status);
                ValidationOutcome::RejectedUnreachable
            }
            ProbeResponse::Resolved => ValidationOutcome::Accepted,
            ProbeResponse::TransportFailure(reason) => match self.transport_failure {
                TransportFailurePolicy::Reject => {
                    log::info!("{} is unreachable: {}", url, reason);
                    ValidationOutcome::RejectedUnreachable
                }
                TransportFailurePolicy::Accept => {
                    log::warn!("{} could not be probed ({}), accepting anyway", url, reason);
                    ValidationOutcome::Accepted
                }
            },
        }
    }

    /// Like [`validate`](Self::validate), but gives up as soon as `cancel`
    /// fires. The probe future is dropped, which aborts any request in
    /// flight. Returns `None` when cancelled.
    pub async fn validate_with_cancel(
        &self,
        raw: &str,
        cancel: &CancelToken,
    ) -> Option<ValidationOutcome> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("Validation of {:?} abandoned", raw);
                None
            }
            outcome = self.validate(raw) => Some(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Answers every probe with a fixed response after an optional delay
    struct FixedProbe {
        response: ProbeResponse,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FixedProbe {
        fn new(response: ProbeResponse) -> Arc<Self> {
            Self::delayed(response, Duration::ZERO)
        }

        fn delayed(response: ProbeResponse, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                response,
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Probe for FixedProbe {
        async fn probe(&self, _url: &Url) -> ProbeResponse {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.response.clone()
        }
    }

    fn validator(probe: Arc<FixedProbe>) -> TargetValidator {
        TargetValidator::new(probe, &NavigatorSettings::default())
    }

    #[tokio::test]
    async fn test_internal_pages_skip_the_probe() {
        let probe = FixedProbe::new(ProbeResponse::Status(500));
        let validator = validator(probe.clone());

        assert_eq!(validator.validate("about").await, ValidationOutcome::Accepted);
        assert_eq!(validator.validate(" Settings ").await, ValidationOutcome::Accepted);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_format() {
        let probe = FixedProbe::new(ProbeResponse::Status(200));
        let validator = validator(probe.clone());

        assert_eq!(validator.validate("   ").await, ValidationOutcome::RejectedInvalidFormat);
        assert_eq!(validator.validate("/").await, ValidationOutcome::RejectedInvalidFormat);
        assert_eq!(
            validator.validate("exa mple.com").await,
            ValidationOutcome::RejectedInvalidFormat
        );
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_codes() {
        let ok = validator(FixedProbe::new(ProbeResponse::Status(200)));
        assert_eq!(ok.validate("example.com").await, ValidationOutcome::Accepted);

        let redirect = validator(FixedProbe::new(ProbeResponse::Status(301)));
        assert_eq!(redirect.validate("example.com").await, ValidationOutcome::Accepted);

        let missing = validator(FixedProbe::new(ProbeResponse::Status(404)));
        assert_eq!(
            missing.validate("example.com").await,
            ValidationOutcome::RejectedUnreachable
        );

        let boundary = validator(FixedProbe::new(ProbeResponse::Status(400)));
        assert_eq!(
            boundary.validate("example.com").await,
            ValidationOutcome::RejectedUnreachable
        );
    }

    #[tokio::test]
    async fn test_resolved_host_is_accepted() {
        let validator = validator(FixedProbe::new(ProbeResponse::Resolved));
        assert_eq!(validator.validate("example.com").await, ValidationOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_transport_failure_policy() {
        let failure = ProbeResponse::TransportFailure("connection refused".to_string());

        let strict = validator(FixedProbe::new(failure.clone()));
        assert_eq!(
            strict.validate("deadsite.invalid").await,
            ValidationOutcome::RejectedUnreachable
        );

        let settings = NavigatorSettings {
            transport_failure: TransportFailurePolicy::Accept,
            ..Default::default()
        };
        let lenient = TargetValidator::new(FixedProbe::new(failure), &settings);
        assert_eq!(
            lenient.validate("deadsite.invalid").await,
            ValidationOutcome::Accepted
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_times_out() {
        let probe = FixedProbe::delayed(ProbeResponse::Status(200), Duration::from_secs(10));
        let validator = validator(probe);
        assert_eq!(validator.timeout(), Duration::from_millis(3000));

        let start = tokio::time::Instant::now();
        assert_eq!(
            validator.validate("deadsite.invalid").await,
            ValidationOutcome::RejectedTimeout
        );
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3000));
        assert!(elapsed < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_just_inside_deadline() {
        let probe = FixedProbe::delayed(ProbeResponse::Status(200), Duration::from_millis(2999));
        assert_eq!(
            validator(probe).validate("example.com").await,
            ValidationOutcome::Accepted
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons_validation() {
        let probe = FixedProbe::delayed(ProbeResponse::Status(200), Duration::from_secs(1));
        let validator = Arc::new(validator(probe));
        let cancel = CancelToken::new();

        let task = {
            let validator = Arc::clone(&validator);
            let cancel = cancel.clone();
            tokio::spawn(async move { validator.validate_with_cancel("example.com", &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        assert_eq!(task.await.unwrap(), None);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let validator = validator(FixedProbe::new(ProbeResponse::Status(200)));
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(validator.validate_with_cancel("example.com", &cancel).await, None);

        let fresh = CancelToken::new();
        assert_eq!(
            validator.validate_with_cancel("example.com", &fresh).await,
            Some(ValidationOutcome::Accepted)
        );
    }

    #[tokio::test]
    async fn test_http_probe_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let settings = NavigatorSettings {
            probe_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let probe = Arc::new(crate::net::HttpProbe::new(&settings).unwrap());
        let validator = TargetValidator::new(probe, &settings);

        assert_eq!(
            validator.validate(&server.uri()).await,
            ValidationOutcome::RejectedTimeout
        );
    }
}
