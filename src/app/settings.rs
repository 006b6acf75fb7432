use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

pub const DEFAULT_USER_AGENT: &str = "NavStackValidator/1.0";

/// What to do when a probe cannot reach the target at all (DNS failure,
/// refused connection, TLS error). A status code response is never affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportFailurePolicy {
    #[default]
    Reject,
    /// Treat the failure as "blocked but probably exists"
    Accept,
}

impl FromStr for TransportFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "accept" => Ok(Self::Accept),
            other => Err(format!("unknown transport failure policy: {}", other)),
        }
    }
}

impl fmt::Display for TransportFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::Accept => f.write_str("accept"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavigatorSettings {
    /// Hard deadline for a single reachability probe
    pub probe_timeout: Duration,
    pub transport_failure: TransportFailurePolicy,
    pub user_agent: String,
    /// Retry with GET when HEAD fails or is refused
    pub get_fallback: bool,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            transport_failure: TransportFailurePolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            get_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = NavigatorSettings::default();
        assert_eq!(settings.probe_timeout, Duration::from_millis(3000));
        assert_eq!(settings.transport_failure, TransportFailurePolicy::Reject);
        assert!(settings.get_fallback);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("accept".parse::<TransportFailurePolicy>(), Ok(TransportFailurePolicy::Accept));
        assert_eq!("REJECT".parse::<TransportFailurePolicy>(), Ok(TransportFailurePolicy::Reject));
        assert!("maybe".parse::<TransportFailurePolicy>().is_err());
    }
}
