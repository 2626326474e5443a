use folio_page_core::contact::{
    MSG_KEY_MISSING, MSG_NETWORK_ERROR, MSG_NOT_CONFIGURED, MSG_SENDING, MSG_SUCCESS,
};
use folio_page_core::{
    Change, Endpoint, EndpointResponse, Engine, Inputs, PageConfig, PageError, StatusTone,
    SubmissionRequest, SubmissionState, TransportError,
};
use folio_test_fixtures::{configs, responses};

/// Stub endpoint that replays one canned outcome and counts calls.
struct StubEndpoint {
    outcome: Result<EndpointResponse, TransportError>,
    calls: Vec<SubmissionRequest>,
}

impl StubEndpoint {
    fn fixture(name: &str) -> Self {
        let stub = responses::load(name).unwrap();
        Self {
            outcome: Ok(EndpointResponse::new(stub.status, stub.body)),
            calls: Vec::new(),
        }
    }

    fn unreachable() -> Self {
        Self {
            outcome: Err(TransportError::Network("connection refused".into())),
            calls: Vec::new(),
        }
    }
}

impl Endpoint for StubEndpoint {
    fn post(&mut self, request: &SubmissionRequest) -> Result<EndpointResponse, TransportError> {
        self.calls.push(request.clone());
        self.outcome.clone()
    }
}

fn engine(config: &str) -> Engine {
    let cfg: PageConfig = configs::load(config).unwrap();
    Engine::new(cfg).unwrap()
}

fn form() -> Vec<(String, String)> {
    vec![
        ("name".into(), "Ada".into()),
        ("email".into(), "ada@example.com".into()),
        ("message".into(), "Hello".into()),
    ]
}

fn assert_cleared_after_7000(e: &mut Engine) {
    assert!(e.update(6999, Inputs::default()).last_status().is_none());
    let out = e.update(1, Inputs::default());
    assert_eq!(out.last_status(), Some(("", StatusTone::Neutral)));
}

#[test]
fn placeholder_key_reports_configuration_error_without_network_calls() {
    let mut e = engine("placeholder-key");
    let mut endpoint = StubEndpoint::fixture("success");

    let mount = e.mount_contact();
    assert_eq!(mount.last_status(), Some((MSG_NOT_CONFIGURED, StatusTone::Error)));
    assert_cleared_after_7000(&mut e);

    let out = e.submit_contact_with(form(), &mut endpoint).unwrap();
    assert_eq!(out.last_status(), Some((MSG_KEY_MISSING, StatusTone::Error)));
    assert!(out.dispatched().is_none());
    assert!(endpoint.calls.is_empty());
    assert_eq!(e.submission_state(), SubmissionState::Error);

    assert_cleared_after_7000(&mut e);
    assert_eq!(e.submission_state(), SubmissionState::Idle);
    assert_eq!(e.pending_timers(), 0);
}

#[test]
fn success_reports_and_resets_then_clears() {
    let mut e = engine("configured");
    let mut endpoint = StubEndpoint::fixture("success");

    let out = e.submit_contact_with(form(), &mut endpoint).unwrap();
    let statuses: Vec<_> = out
        .changes
        .iter()
        .filter_map(|c| match c {
            Change::Status { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(statuses, vec![MSG_SENDING, MSG_SUCCESS]);
    assert!(out.changes.contains(&Change::ResetForm));
    assert_eq!(e.submission_state(), SubmissionState::Success);

    assert_eq!(endpoint.calls.len(), 1);
    let req = &endpoint.calls[0];
    assert_eq!(req.endpoint, "https://api.web3forms.com/submit");
    assert_eq!(req.field("message"), Some("Hello"));
    assert_eq!(
        req.field("access_key"),
        Some("15fed34b-85c8-45f2-9219-cf6881d73e19")
    );

    assert_cleared_after_7000(&mut e);
    assert_eq!(e.submission_state(), SubmissionState::Idle);
}

#[test]
fn endpoint_message_is_shown_verbatim() {
    let mut e = engine("configured");
    let mut endpoint = StubEndpoint::fixture("invalid-email");

    let out = e.submit_contact_with(form(), &mut endpoint).unwrap();
    assert_eq!(out.last_status(), Some(("Invalid email", StatusTone::Error)));
    assert!(!out.changes.contains(&Change::ResetForm));
    assert_cleared_after_7000(&mut e);
}

#[test]
fn error_without_message_uses_generic_text() {
    let mut e = engine("configured");
    let mut endpoint = StubEndpoint::fixture("server-error");
    let out = e.submit_contact_with(form(), &mut endpoint).unwrap();
    assert_eq!(
        out.last_status(),
        Some(("An error occurred. Please try again.", StatusTone::Error))
    );
}

#[test]
fn network_failure_uses_network_message() {
    let mut e = engine("configured");
    let mut endpoint = StubEndpoint::unreachable();
    let out = e.submit_contact_with(form(), &mut endpoint).unwrap();
    assert_eq!(out.last_status(), Some((MSG_NETWORK_ERROR, StatusTone::Error)));
    assert_eq!(e.submission_state(), SubmissionState::Error);
    assert_cleared_after_7000(&mut e);
}

#[test]
fn resubmission_while_sending_is_rejected() {
    let mut e = engine("configured");
    let first = e.submit_contact(form()).unwrap();
    let request = first.dispatched().cloned().unwrap();

    assert_eq!(e.submit_contact(form()), Err(PageError::SubmissionInFlight));

    let out = e.complete_contact(request.id, Ok(EndpointResponse::new(200, "{}")));
    assert_eq!(out.last_status(), Some((MSG_SUCCESS, StatusTone::Success)));
    assert!(e.submit_contact(form()).is_ok());
}

#[test]
fn stale_clear_blanks_text_but_keeps_in_flight_guard() {
    let mut e = engine("configured");
    let mut endpoint = StubEndpoint::fixture("invalid-email");
    e.submit_contact_with(form(), &mut endpoint).unwrap();

    // A new submission starts before the previous clear fires.
    e.update(3000, Inputs::default());
    let second = e.submit_contact(form()).unwrap();
    assert!(second.dispatched().is_some());

    let out = e.update(4000, Inputs::default());
    assert_eq!(out.last_status(), Some(("", StatusTone::Neutral)));
    assert_eq!(e.submission_state(), SubmissionState::Sending);
    assert_eq!(e.submit_contact(form()), Err(PageError::SubmissionInFlight));
}
