//! Contact form submission phases.
//!
//! Pure transitions only; the async driver lives in `folio-client`.
//!
//! ```text
//!   Idle ──submit──▶ Submitting ──success:true──▶ Success ──dwell──▶ Idle
//!                        │
//!                        ├──success:false──▶ Error ──submit──▶ Submitting
//!                        └──transport err──▶ Error
//! ```
//!
//! Error has no timed exit; it holds until the next submit.

use serde::{Deserialize, Serialize};

use crate::constants::{
    NETWORK_ERROR_MESSAGE, REJECTED_MESSAGE, SEND_LABEL, SENDING_LABEL, SUCCESS_MESSAGE,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

/// JSON body returned by the contact endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointResponse {
    pub success: bool,
    /// Endpoint-provided detail; only used for diagnostics.
    #[serde(default)]
    pub message: Option<String>,
}

/// How a `submit` call ended, from the caller's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Endpoint accepted the message.
    Sent,
    /// Endpoint answered with `success: false`.
    Rejected,
    /// The request never produced a usable response.
    NetworkError,
    /// Another submission was already in flight; nothing was sent.
    Ignored,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionState {
    pub phase: Phase,
    pub message: Option<String>,
    /// Number of submissions that have entered `Submitting`.
    pub attempt: u64,
}

impl SubmissionState {
    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Enter `Submitting`. Returns the new attempt number, or `None` when a
    /// submission is already in flight.
    pub fn begin(&mut self) -> Option<u64> {
        if self.is_busy() {
            return None;
        }
        self.attempt += 1;
        self.phase = Phase::Submitting;
        self.message = None;
        Some(self.attempt)
    }

    /// Settle `attempt` with the endpoint's answer, or `None` when the
    /// transport failed. Stale attempts are ignored.
    pub fn settle(&mut self, attempt: u64, response: Option<&EndpointResponse>) -> SubmitOutcome {
        if !self.is_busy() || attempt != self.attempt {
            return SubmitOutcome::Ignored;
        }
        let (phase, message, outcome) = match response {
            Some(r) if r.success => (Phase::Success, SUCCESS_MESSAGE, SubmitOutcome::Sent),
            Some(_) => (Phase::Error, REJECTED_MESSAGE, SubmitOutcome::Rejected),
            None => (Phase::Error, NETWORK_ERROR_MESSAGE, SubmitOutcome::NetworkError),
        };
        self.phase = phase;
        self.message = Some(message.to_string());
        outcome
    }

    /// Dwell elapsed for `attempt`. Only that attempt's Success returns to Idle.
    pub fn expire(&mut self, attempt: u64) -> bool {
        if self.phase != Phase::Success || attempt != self.attempt {
            return false;
        }
        self.phase = Phase::Idle;
        self.message = None;
        true
    }

    pub fn view(&self) -> FormView {
        let busy = self.is_busy();
        let banner = self.message.as_ref().and_then(|text| {
            let tone = match self.phase {
                Phase::Success => Tone::Success,
                Phase::Error => Tone::Error,
                _ => return None,
            };
            Some(Banner {
                tone,
                text: text.clone(),
            })
        });
        FormView {
            button_label: if busy { SENDING_LABEL } else { SEND_LABEL },
            button_disabled: busy,
            banner,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub tone: Tone,
    pub text: String,
}

/// What the form's submit button and status banner show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub button_label: &'static str,
    pub button_disabled: bool,
    pub banner: Option<Banner>,
}
