pub mod dns;
pub mod http;
pub mod probe;
pub mod validator;

pub use dns::DnsProbe;
pub use http::HttpProbe;
pub use probe::{Probe, ProbeError, ProbeResponse};
pub use validator::{CancelToken, TargetValidator, ValidationOutcome};
