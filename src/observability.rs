use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("vietbot.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("vietbot.client.request_errors");
pub(crate) static CLIENT_TRANSPORT_ERRORS: Counter =
    Counter::new("vietbot.client.transport_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("vietbot.client.request_duration_seconds");

pub(crate) static AUTH_RESUMES: Counter = Counter::new("vietbot.auth.resumes");
pub(crate) static AUTH_RESUME_REJECTIONS: Counter = Counter::new("vietbot.auth.resume_rejections");
pub(crate) static AUTH_LOGINS: Counter = Counter::new("vietbot.auth.logins");
pub(crate) static AUTH_LOGIN_FAILURES: Counter = Counter::new("vietbot.auth.login_failures");
pub(crate) static AUTH_REGISTRATIONS: Counter = Counter::new("vietbot.auth.registrations");
pub(crate) static AUTH_LOGOUTS: Counter = Counter::new("vietbot.auth.logouts");

pub(crate) static CHAT_SESSIONS_STARTED: Counter = Counter::new("vietbot.chat.sessions_started");
pub(crate) static CHAT_MESSAGES: Counter = Counter::new("vietbot.chat.messages");
pub(crate) static CHAT_SEND_FAILURES: Counter = Counter::new("vietbot.chat.send_failures");
pub(crate) static CHAT_RATINGS: Counter = Counter::new("vietbot.chat.ratings");
pub(crate) static CHAT_DRAFT_SAVES: Counter = Counter::new("vietbot.chat.draft_saves");
pub(crate) static CHAT_RESPONSE_LATENCY: Moments =
    Moments::new("vietbot.chat.response_latency_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_TRANSPORT_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&AUTH_RESUMES);
    collector.register_counter(&AUTH_RESUME_REJECTIONS);
    collector.register_counter(&AUTH_LOGINS);
    collector.register_counter(&AUTH_LOGIN_FAILURES);
    collector.register_counter(&AUTH_REGISTRATIONS);
    collector.register_counter(&AUTH_LOGOUTS);

    collector.register_counter(&CHAT_SESSIONS_STARTED);
    collector.register_counter(&CHAT_MESSAGES);
    collector.register_counter(&CHAT_SEND_FAILURES);
    collector.register_counter(&CHAT_RATINGS);
    collector.register_counter(&CHAT_DRAFT_SAVES);
    collector.register_moments(&CHAT_RESPONSE_LATENCY);
}
