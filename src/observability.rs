use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("parlor.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("parlor.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("parlor.client.request_duration_seconds");

pub(crate) static SESSION_STARTS: Counter = Counter::new("parlor.session.starts");
pub(crate) static SESSION_RESTARTS: Counter = Counter::new("parlor.session.restarts");
pub(crate) static SESSION_ENDS: Counter = Counter::new("parlor.session.ends");
pub(crate) static STALE_OUTCOMES: Counter = Counter::new("parlor.session.stale_outcomes");

pub(crate) static MESSAGES_RENDERED: Counter = Counter::new("parlor.view.messages_rendered");
pub(crate) static INPUT_REJECTED: Counter = Counter::new("parlor.input.rejected");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_STARTS);
    collector.register_counter(&SESSION_RESTARTS);
    collector.register_counter(&SESSION_ENDS);
    collector.register_counter(&STALE_OUTCOMES);

    collector.register_counter(&MESSAGES_RENDERED);
    collector.register_counter(&INPUT_REJECTED);
}
