//! Session state object: the request-lifecycle state machine plus its derived affordances.
//!
//! Transitions:
//!   Idle | Succeeded | Failed  --begin_submission-->  Pending
//!   Pending                    --succeed---------->   Succeeded
//!   Pending                    --fail------------->   Failed
//!
//! Nothing ever moves back to Idle. The result document lives inside `Succeeded`,
//! so a result is present exactly when the submission succeeded.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::optimizer_client::OptimizeRequest;
use crate::session::input::InputStore;

/// Generic user-facing failure text. No error detail is ever surfaced.
pub const FAILURE_MESSAGE: &str = "Connection to the optimization service failed.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded {
        optimized_text: String,
    },
    Failed,
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Pending => "pending",
            SubmissionState::Succeeded { .. } => "succeeded",
            SubmissionState::Failed => "failed",
        }
    }
}

/// Why a submission was turned into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    EmptyPrimary,
    AlreadyPending,
}

/// Transient "copied" acknowledgement. `epoch` identifies the copy action that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardConfirmation {
    pub activated_at: DateTime<Utc>,
    pub epoch: u64,
}

/// A single user-visible notification raised by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn submission_failed() -> Self {
        Self {
            message: FAILURE_MESSAGE.to_string(),
            raised_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub inputs: InputStore,
    state: SubmissionState,
    confirmation: Option<ClipboardConfirmation>,
    submissions: u64,
    copy_epoch: u64,
}

impl Session {
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn result(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Succeeded { optimized_text } => Some(optimized_text),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state == SubmissionState::Pending
    }

    pub fn can_submit(&self) -> bool {
        self.inputs.has_primary() && !self.is_busy()
    }

    pub fn can_copy(&self) -> bool {
        self.result().is_some()
    }

    pub fn confirmation(&self) -> Option<&ClipboardConfirmation> {
        self.confirmation.as_ref()
    }

    /// Number of submissions that actually entered Pending.
    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    /// Enters Pending and returns the payload to send, or the reason this is a no-op.
    /// Entering Pending drops any displayed result and any copy confirmation.
    pub fn begin_submission(&mut self) -> Result<OptimizeRequest, Rejection> {
        if self.is_busy() {
            return Err(Rejection::AlreadyPending);
        }
        if !self.inputs.has_primary() {
            return Err(Rejection::EmptyPrimary);
        }

        self.state = SubmissionState::Pending;
        self.confirmation = None;
        self.submissions += 1;
        Ok(self.inputs.to_request())
    }

    /// Pending -> Succeeded. Ignored outside Pending.
    pub fn succeed(&mut self, optimized_text: String) -> bool {
        if !self.is_busy() {
            return false;
        }
        self.state = SubmissionState::Succeeded { optimized_text };
        true
    }

    /// Pending -> Failed. Ignored outside Pending.
    pub fn fail(&mut self) -> bool {
        if !self.is_busy() {
            return false;
        }
        self.state = SubmissionState::Failed;
        true
    }

    /// Raises a fresh confirmation and returns its epoch; `None` when there is nothing to copy.
    pub fn activate_confirmation(&mut self, now: DateTime<Utc>) -> Option<u64> {
        if !self.can_copy() {
            return None;
        }
        self.copy_epoch += 1;
        self.confirmation = Some(ClipboardConfirmation {
            activated_at: now,
            epoch: self.copy_epoch,
        });
        Some(self.copy_epoch)
    }

    /// Clears the confirmation only if it still belongs to `epoch`.
    pub fn expire_confirmation(&mut self, epoch: u64) -> bool {
        match self.confirmation {
            Some(confirmation) if confirmation.epoch == epoch => {
                self.confirmation = None;
                true
            }
            _ => false,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            status: self.state().label(),
            primary: self.inputs.primary().to_string(),
            context: self.inputs.context().to_string(),
            result: self.result().map(str::to_string),
            busy: self.is_busy(),
            can_submit: self.can_submit(),
            can_copy: self.can_copy(),
            copied: self.confirmation.is_some(),
            copied_at: self.confirmation().map(|c| c.activated_at),
            submissions: self.submissions(),
        }
    }
}

/// Snapshot handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub status: &'static str,
    pub primary: String,
    pub context: String,
    pub result: Option<String>,
    pub busy: bool,
    pub can_submit: bool,
    pub can_copy: bool,
    pub copied: bool,
    pub copied_at: Option<DateTime<Utc>>,
    pub submissions: u64,
}
