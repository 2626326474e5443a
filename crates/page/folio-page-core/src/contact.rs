//! Contact form submission flow.
//!
//! The flow validates configuration, turns form fields into a
//! [`SubmissionRequest`], and maps the endpoint outcome to status text. It
//! never performs I/O itself: the host (or a test stub implementing
//! [`Endpoint`]) carries the request and reports the result back.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::ContactConfig;
use crate::error::PageError;
use crate::ids::SubmissionId;

pub const MSG_SENDING: &str = "Sending...";
pub const MSG_SUCCESS: &str = "Message sent successfully! 🎉";
pub const MSG_GENERIC_ERROR: &str = "An error occurred. Please try again.";
pub const MSG_NETWORK_ERROR: &str = "A network error occurred. Please check your connection.";
pub const MSG_NOT_CONFIGURED: &str =
    "Contact form is not configured. Please set your Web3Forms access key.";
pub const MSG_KEY_MISSING: &str = "Error: Web3Forms access key is missing.";

/// Form field carrying the endpoint credential.
pub const ACCESS_KEY_FIELD: &str = "access_key";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Sending,
    Success,
    Error,
}

impl SubmissionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionState::Success | SubmissionState::Error)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Pending,
    Success,
    Error,
    /// Inherit the page colour (used when clearing).
    Neutral,
}

impl StatusTone {
    pub fn css_color(self) -> Option<&'static str> {
        match self {
            StatusTone::Pending => Some("#ffd700"),
            StatusTone::Success => Some("#4caf50"),
            StatusTone::Error => Some("#f44336"),
            StatusTone::Neutral => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusUpdate {
    fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// A POST the host must perform on behalf of the flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub id: SubmissionId,
    pub endpoint: String,
    /// Form fields in order, with the access key appended last.
    pub fields: Vec<(String, String)>,
}

impl SubmissionRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: String,
}

impl EndpointResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Something that can carry a submission to the remote endpoint.
pub trait Endpoint {
    fn post(&mut self, request: &SubmissionRequest) -> Result<EndpointResponse, TransportError>;
}

#[derive(Debug, Default, Deserialize)]
struct EndpointReply {
    #[serde(default)]
    message: Option<String>,
}

/// What the host should do once a submission settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub state: SubmissionState,
    pub status: StatusUpdate,
    pub reset_form: bool,
}

#[derive(Debug)]
pub struct ContactFlow {
    config: ContactConfig,
    state: SubmissionState,
    in_flight: Option<SubmissionId>,
}

impl ContactFlow {
    pub fn new(config: ContactConfig) -> Self {
        Self {
            config,
            state: SubmissionState::Idle,
            in_flight: None,
        }
    }

    pub fn config(&self) -> &ContactConfig {
        &self.config
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn in_flight(&self) -> Option<SubmissionId> {
        self.in_flight
    }

    /// Notice shown when the form is mounted without a usable key.
    pub fn mount_notice(&self) -> Option<StatusUpdate> {
        if self.config.is_configured() {
            return None;
        }
        warn!("contact form access key is not set or is a placeholder; submissions are disabled");
        Some(StatusUpdate::new(MSG_NOT_CONFIGURED, StatusTone::Error))
    }

    /// Start a submission. On success the flow is `Sending` and the caller
    /// must deliver the request and call [`ContactFlow::settle`].
    pub fn begin(
        &mut self,
        id: SubmissionId,
        fields: Vec<(String, String)>,
    ) -> Result<(SubmissionRequest, StatusUpdate), PageError> {
        if self.state == SubmissionState::Sending {
            warn!("rejecting contact submission while {:?} is in flight", self.in_flight);
            return Err(PageError::SubmissionInFlight);
        }
        if !self.config.is_configured() {
            warn!("contact submission refused: access key missing");
            self.state = SubmissionState::Error;
            return Err(PageError::MissingAccessKey);
        }
        let mut fields: Vec<(String, String)> = fields
            .into_iter()
            .filter(|(k, _)| k != ACCESS_KEY_FIELD)
            .collect();
        fields.push((ACCESS_KEY_FIELD.to_string(), self.config.access_key.clone()));

        self.state = SubmissionState::Sending;
        self.in_flight = Some(id);
        info!("contact submission {id:?} sending to {}", self.config.endpoint);
        Ok((
            SubmissionRequest {
                id,
                endpoint: self.config.endpoint.clone(),
                fields,
            },
            StatusUpdate::new(MSG_SENDING, StatusTone::Pending),
        ))
    }

    /// Status for a refused submission (missing key).
    pub fn missing_key_status() -> StatusUpdate {
        StatusUpdate::new(MSG_KEY_MISSING, StatusTone::Error)
    }

    /// Resolve an in-flight submission. Returns `None` for a stale or unknown id.
    pub fn settle(
        &mut self,
        id: SubmissionId,
        outcome: Result<EndpointResponse, TransportError>,
    ) -> Option<Settlement> {
        if self.in_flight != Some(id) {
            warn!("ignoring result for submission {id:?}; in flight is {:?}", self.in_flight);
            return None;
        }
        self.in_flight = None;

        let settlement = match outcome.and_then(parse_reply) {
            Ok((response, _)) if response.is_success() => Settlement {
                state: SubmissionState::Success,
                status: StatusUpdate::new(MSG_SUCCESS, StatusTone::Success),
                reset_form: true,
            },
            Ok((response, reply)) => {
                error!(
                    "form submission error: status {} body {}",
                    response.status, response.body
                );
                let text = reply
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| MSG_GENERIC_ERROR.to_string());
                Settlement {
                    state: SubmissionState::Error,
                    status: StatusUpdate::new(text, StatusTone::Error),
                    reset_form: false,
                }
            }
            Err(err) => {
                error!("network or fetch error: {err}");
                Settlement {
                    state: SubmissionState::Error,
                    status: StatusUpdate::new(MSG_NETWORK_ERROR, StatusTone::Error),
                    reset_form: false,
                }
            }
        };
        self.state = settlement.state;
        Some(settlement)
    }

    /// Status text was blanked. Only a settled flow returns to idle; an
    /// in-flight submission keeps its guard.
    pub fn status_cleared(&mut self) {
        if self.state.is_terminal() {
            self.state = SubmissionState::Idle;
        }
    }
}

/// A body that is not JSON counts as a transport failure.
fn parse_reply(
    response: EndpointResponse,
) -> Result<(EndpointResponse, EndpointReply), TransportError> {
    let reply: EndpointReply = serde_json::from_str(&response.body)
        .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;
    Ok((response, reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> ContactFlow {
        ContactFlow::new(ContactConfig::with_access_key("key-123"))
    }

    fn fields() -> Vec<(String, String)> {
        vec![
            ("name".into(), "Ada".into()),
            ("email".into(), "ada@example.com".into()),
        ]
    }

    #[test]
    fn begin_appends_access_key() {
        let mut flow = configured();
        let (req, status) = flow.begin(SubmissionId(0), fields()).unwrap();
        assert_eq!(req.endpoint, "https://api.web3forms.com/submit");
        assert_eq!(req.fields.last().unwrap(), &("access_key".to_string(), "key-123".to_string()));
        assert_eq!(req.field("name"), Some("Ada"));
        assert_eq!(status.text, MSG_SENDING);
        assert_eq!(flow.state(), SubmissionState::Sending);
    }

    #[test]
    fn host_supplied_access_key_is_replaced() {
        let mut flow = configured();
        let (req, _) = flow
            .begin(
                SubmissionId(0),
                vec![("access_key".into(), "spoofed".into())],
            )
            .unwrap();
        assert_eq!(req.fields, vec![("access_key".into(), "key-123".into())]);
    }

    #[test]
    fn second_begin_while_sending_is_rejected() {
        let mut flow = configured();
        flow.begin(SubmissionId(0), fields()).unwrap();
        assert_eq!(
            flow.begin(SubmissionId(1), fields()),
            Err(PageError::SubmissionInFlight)
        );
        assert_eq!(flow.in_flight(), Some(SubmissionId(0)));
    }

    #[test]
    fn placeholder_key_refuses() {
        let mut flow = ContactFlow::new(ContactConfig::default());
        assert!(flow.mount_notice().is_some());
        assert_eq!(
            flow.begin(SubmissionId(0), fields()),
            Err(PageError::MissingAccessKey)
        );
        assert_eq!(flow.state(), SubmissionState::Error);
    }

    #[test]
    fn error_status_without_message_falls_back() {
        let mut flow = configured();
        flow.begin(SubmissionId(0), fields()).unwrap();
        let s = flow
            .settle(SubmissionId(0), Ok(EndpointResponse::new(500, "{}")))
            .unwrap();
        assert_eq!(s.status.text, MSG_GENERIC_ERROR);
        assert!(!s.reset_form);
    }

    #[test]
    fn non_json_body_is_a_network_error() {
        let mut flow = configured();
        flow.begin(SubmissionId(0), fields()).unwrap();
        let s = flow
            .settle(SubmissionId(0), Ok(EndpointResponse::new(200, "<html>")))
            .unwrap();
        assert_eq!(s.status.text, MSG_NETWORK_ERROR);
        assert_eq!(s.state, SubmissionState::Error);
    }

    #[test]
    fn stale_settlement_is_ignored() {
        let mut flow = configured();
        flow.begin(SubmissionId(3), fields()).unwrap();
        assert!(flow
            .settle(SubmissionId(2), Ok(EndpointResponse::new(200, "{}")))
            .is_none());
        assert_eq!(flow.state(), SubmissionState::Sending);
    }

    #[test]
    fn clearing_only_resets_settled_state() {
        let mut flow = configured();
        flow.begin(SubmissionId(0), fields()).unwrap();
        flow.status_cleared();
        assert_eq!(flow.state(), SubmissionState::Sending);
        flow.settle(SubmissionId(0), Err(TransportError::Network("down".into())));
        flow.status_cleared();
        assert_eq!(flow.state(), SubmissionState::Idle);
    }
}
