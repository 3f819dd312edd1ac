//! Payload assembly and the single-flight confirm guard.

use subscribe_client::{ApiError, SubmissionPayload, SubmitResponse};

use crate::error::FlowError;
use crate::selection::MembershipSelectionEngine;

/// Shown when the server accepts a submit without a message of its own.
const DEFAULT_SUCCESS_MESSAGE: &str = "Subscription groups updated";

/// Build the submit payload from the final selection.
///
/// The payload carries the selected set itself, not a diff: groups that were
/// deselected are simply absent. Order follows `selection`, duplicates dropped.
pub fn build_payload(entity_id: i64, selection: &[i64]) -> SubmissionPayload {
    let mut group_ids = Vec::with_capacity(selection.len());
    for id in selection {
        if !group_ids.contains(id) {
            group_ids.push(*id);
        }
    }
    SubmissionPayload {
        entity_id,
        group_ids,
    }
}

/// Result of a finished submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server accepted the assignment
    Accepted { message: String },
    /// The submit failed; the dialog stays open for a retry
    Rejected(FlowError),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Single-flight guard around the confirm action of one dialog session.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSubmitter {
    in_flight: bool,
    last_error: Option<String>,
}

impl SubscriptionSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submit is outstanding. Renderers disable the confirm trigger while set.
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Message of the last failed submit, cleared when a new submit starts.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a submit, returning the payload to send.
    ///
    /// Returns `None` while another submit is outstanding.
    pub fn begin(
        &mut self,
        entity_id: i64,
        selection: &MembershipSelectionEngine,
    ) -> Option<SubmissionPayload> {
        if self.in_flight {
            tracing::warn!(entity_id, "Submit already in flight, ignoring confirm");
            return None;
        }
        self.in_flight = true;
        self.last_error = None;
        Some(build_payload(entity_id, &selection.current()))
    }

    /// Settle the outstanding submit.
    ///
    /// A response is only a success when its code says so.
    pub fn finish(&mut self, result: Result<SubmitResponse, ApiError>) -> SubmitOutcome {
        self.in_flight = false;

        let outcome = match result {
            Ok(resp) if resp.is_success() => SubmitOutcome::Accepted {
                message: if resp.msg.is_empty() {
                    DEFAULT_SUCCESS_MESSAGE.to_string()
                } else {
                    resp.msg
                },
            },
            Ok(resp) => SubmitOutcome::Rejected(FlowError::application(resp.code, resp.msg)),
            Err(err) => SubmitOutcome::Rejected(err.into()),
        };

        if let SubmitOutcome::Rejected(err) = &outcome {
            self.last_error = Some(err.to_string());
        }
        outcome
    }
}
