//! Submission Controller: owns the session state and drives the request lifecycle.
//!
//! The state object lives inside a `watch` channel: every mutation is published to
//! subscribers (the rendering layer) and no state is held anywhere else.
//! Failure notifications go out on a separate `broadcast` channel since they are
//! events, not state.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clipboard::ClipboardWriter;
use crate::optimizer_client::{OptimizeRequest, Optimizer};
use crate::session::lifecycle::{Notification, Rejection, Session, SessionView};

/// How long the "copied" confirmation stays up after the latest copy action.
pub const COPY_CONFIRMATION_DELAY: Duration = Duration::from_secs(2);

const NOTIFICATION_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    /// Caller-contract violation turned into a no-op. No request, no notification.
    Rejected { reason: Rejection },
}

pub type SessionWatcher = watch::Receiver<Session>;

#[derive(Clone)]
pub struct SubmissionController {
    session: Arc<watch::Sender<Session>>,
    notifications: broadcast::Sender<Notification>,
    optimizer: Arc<dyn Optimizer>,
    clipboard: Arc<dyn ClipboardWriter>,
    /// The pending confirmation-reversion task and the epoch it expires.
    reversion: Arc<Mutex<Option<(u64, AbortHandle)>>>,
}

impl SubmissionController {
    pub fn new(optimizer: Arc<dyn Optimizer>, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        let (session, _rx) = watch::channel(Session::default());
        let (notifications, _rx) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            session: Arc::new(session),
            notifications,
            optimizer,
            clipboard,
            reversion: Arc::new(Mutex::new(None)),
        }
    }

    /// Yields the session on every change.
    pub fn subscribe(&self) -> SessionWatcher {
        self.session.subscribe()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn view(&self) -> SessionView {
        self.session.borrow().view()
    }

    pub fn set_primary(&self, text: String) -> SessionView {
        self.session.send_modify(|session| session.inputs.set_primary(text));
        self.view()
    }

    pub fn set_context(&self, text: String) -> SessionView {
        self.session.send_modify(|session| session.inputs.set_context(text));
        self.view()
    }

    /// Submits the current inputs and waits for the service to answer.
    ///
    /// Entering Pending is a single check-and-set on the watch channel, so two
    /// overlapping calls can never both issue a request. The call itself runs on
    /// its own task: dropping this future does not cancel it, and the session
    /// still leaves Pending when the service answers.
    pub async fn submit(&self) -> SubmitOutcome {
        let mut begun: Result<OptimizeRequest, Rejection> = Err(Rejection::AlreadyPending);
        self.session.send_if_modified(|session| {
            begun = session.begin_submission();
            begun.is_ok()
        });

        let request = match begun {
            Ok(request) => request,
            Err(reason) => {
                debug!("Submission rejected: {reason:?}");
                return SubmitOutcome::Rejected { reason };
            }
        };

        self.cancel_reversion();

        let task = tokio::spawn(run_submission(
            Arc::clone(&self.optimizer),
            Arc::clone(&self.session),
            self.notifications.clone(),
            request,
        ));

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Submission task failed: {e}");
                if self.session.send_if_modified(Session::fail) {
                    let _ = self.notifications.send(Notification::submission_failed());
                }
                SubmitOutcome::Failed
            }
        }
    }

    /// Copies the result to the clipboard and raises the confirmation.
    /// Returns `false` (and does nothing) when there is no result.
    ///
    /// The clipboard write runs on the blocking pool; its failure is logged and
    /// never changes the session.
    pub async fn copy_result(&self) -> bool {
        let Some(text) = self.raise_confirmation() else {
            debug!("Copy ignored: no result to copy");
            return false;
        };

        let clipboard = Arc::clone(&self.clipboard);
        match tokio::task::spawn_blocking(move || clipboard.write_text(&text)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Clipboard write failed: {e}"),
            Err(e) => warn!("Clipboard task failed: {e}"),
        }
        true
    }

    /// Raises a fresh confirmation and installs its reversion timer.
    ///
    /// Both happen under the `reversion` lock, so the installed timer always
    /// belongs to the newest confirmation.
    fn raise_confirmation(&self) -> Option<String> {
        let mut slot = self.reversion.lock().unwrap_or_else(PoisonError::into_inner);

        let mut copied: Option<(u64, String)> = None;
        self.session.send_if_modified(|session| {
            let Some(text) = session.result().map(str::to_string) else {
                return false;
            };
            match session.activate_confirmation(Utc::now()) {
                Some(epoch) => {
                    copied = Some((epoch, text));
                    true
                }
                None => false,
            }
        });
        let (epoch, text) = copied?;

        let task = self.spawn_reversion(epoch);
        if let Some((_, previous)) = slot.replace((epoch, task)) {
            previous.abort();
        }
        Some(text)
    }

    fn spawn_reversion(&self, epoch: u64) -> AbortHandle {
        let session = Arc::clone(&self.session);
        // Deadline is fixed at the copy action, not when the task first runs.
        let deadline = Instant::now() + COPY_CONFIRMATION_DELAY;
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if session.send_if_modified(|s| s.expire_confirmation(epoch)) {
                debug!(epoch, "Copy confirmation expired");
            }
        })
        .abort_handle()
    }

    fn cancel_reversion(&self) {
        let mut slot = self.reversion.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, previous)) = slot.take() {
            previous.abort();
        }
    }
}

/// One optimization round trip, from Pending to Succeeded or Failed.
async fn run_submission(
    optimizer: Arc<dyn Optimizer>,
    session: Arc<watch::Sender<Session>>,
    notifications: broadcast::Sender<Notification>,
    request: OptimizeRequest,
) -> SubmitOutcome {
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        cv_len = request.cv_text.len(),
        jd_len = request.job_description.len(),
        "Submitting to optimization service"
    );

    match optimizer.optimize(&request).await {
        Ok(optimized_text) => {
            info!(%request_id, "Optimization succeeded");
            session.send_if_modified(|session| session.succeed(optimized_text));
            SubmitOutcome::Succeeded
        }
        Err(e) => {
            warn!(%request_id, "Optimization failed: {e}");
            session.send_if_modified(Session::fail);
            // No receivers just means nobody is rendering right now.
            let _ = notifications.send(Notification::submission_failed());
            SubmitOutcome::Failed
        }
    }
}
