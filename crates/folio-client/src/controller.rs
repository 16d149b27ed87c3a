//! Async driver for the contact form's submission phases.

use std::sync::Arc;
use std::time::Duration;

use folio_core::{ContactForm, FormView, SubmissionState, SubmitOutcome, SUCCESS_DWELL_SECS};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};
use crate::transport::Transport;

#[derive(Clone, Debug)]
pub struct ControllerOptions {
    /// Injected into every submission as `access_key`.
    pub access_key: String,
    /// How long Success stays up before the form returns to Idle.
    pub success_dwell: Duration,
}

impl ControllerOptions {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            success_dwell: Duration::from_secs(SUCCESS_DWELL_SECS),
        }
    }

    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.success_dwell = dwell;
        self
    }
}

/// One per form. State lives in a watch channel so views can follow every
/// transition; the Success dwell runs as a spawned task that dies with the
/// controller's cancellation token.
pub struct SubmissionController<T: Transport> {
    transport: T,
    options: ControllerOptions,
    state: Arc<watch::Sender<SubmissionState>>,
    cancel: CancellationToken,
}

impl<T: Transport> SubmissionController<T> {
    pub fn new(transport: T, options: ControllerOptions) -> Self {
        let (state, _) = watch::channel(SubmissionState::default());
        Self {
            transport,
            options,
            state: Arc::new(state),
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> FormView {
        self.state.borrow().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit the form once.
    ///
    /// Returns `Ignored` without touching the network while another
    /// submission is in flight. On `Sent` the form's inputs are cleared and
    /// the dwell timer is armed.
    pub async fn submit(&self, form: &mut ContactForm) -> Result<SubmitOutcome> {
        if self.cancel.is_cancelled() {
            return Err(ClientError::Disposed);
        }
        if self.state.borrow().is_busy() {
            tracing::debug!("submission already in flight; ignoring submit");
            return Ok(SubmitOutcome::Ignored);
        }
        form.validate()?;

        let mut attempt = None;
        self.state.send_if_modified(|s| {
            attempt = s.begin();
            attempt.is_some()
        });
        let Some(attempt) = attempt else {
            return Ok(SubmitOutcome::Ignored);
        };
        tracing::debug!(attempt, "submitting contact form");
        let mut in_flight = InFlight {
            state: &self.state,
            cancel: &self.cancel,
            attempt,
            settled: false,
        };

        let body = form.encode(&self.options.access_key);
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ClientError::Disposed),
            result = self.transport.send(body) => result,
        };

        let response = match result {
            Ok(response) => {
                if !response.success {
                    tracing::warn!(
                        attempt,
                        detail = response.message.as_deref().unwrap_or(""),
                        "contact endpoint rejected submission"
                    );
                }
                Some(response)
            }
            Err(e) => {
                tracing::warn!(attempt, "contact submission failed: {e}");
                None
            }
        };

        let mut outcome = SubmitOutcome::Ignored;
        self.state.send_if_modified(|s| {
            outcome = s.settle(attempt, response.as_ref());
            outcome != SubmitOutcome::Ignored
        });
        in_flight.settled = true;

        if outcome == SubmitOutcome::Sent {
            form.clear();
            self.arm_dwell(attempt);
        }
        tracing::debug!(attempt, ?outcome, "submission settled");
        Ok(outcome)
    }

    /// Tear down: pending dwell timers and in-flight submits stop touching
    /// state. Idempotent.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn arm_dwell(&self, attempt: u64) {
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        let dwell = self.options.success_dwell;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(dwell) => {
                    if state.send_if_modified(|s| s.expire(attempt)) {
                        tracing::debug!(attempt, "success dwell elapsed; form back to idle");
                    }
                }
            }
        });
    }
}

impl<T: Transport> Drop for SubmissionController<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Settles an attempt as a network error if its `submit` future is dropped
/// before the response arrives. A disposed controller keeps its state.
struct InFlight<'a> {
    state: &'a watch::Sender<SubmissionState>,
    cancel: &'a CancellationToken,
    attempt: u64,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled || self.cancel.is_cancelled() {
            return;
        }
        let attempt = self.attempt;
        if self
            .state
            .send_if_modified(|s| s.settle(attempt, None) != SubmitOutcome::Ignored)
        {
            tracing::warn!(attempt, "submission abandoned before the endpoint answered");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use folio_core::{
        EndpointResponse, NETWORK_ERROR_MESSAGE, Phase, REJECTED_MESSAGE, SUCCESS_MESSAGE,
    };
    use tokio::sync::Notify;

    use super::*;
    use crate::error::TransportError;
    use crate::transport::FormBody;

    /// Canned transport. With a gate, each send parks until the gate opens.
    struct StubTransport {
        reply: Option<bool>,
        calls: AtomicUsize,
        bodies: std::sync::Mutex<Vec<FormBody>>,
        gate: Option<Arc<Notify>>,
    }

    impl StubTransport {
        fn replying(success: bool) -> Self {
            Self {
                reply: Some(success),
                calls: AtomicUsize::new(0),
                bodies: std::sync::Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                ..Self::replying(false)
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for StubTransport {
        fn send(
            &self,
            body: FormBody,
        ) -> impl std::future::Future<Output = std::result::Result<EndpointResponse, TransportError>>
        + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies.lock().unwrap().push(body);
            let gate = self.gate.clone();
            let reply = self.reply;
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                match reply {
                    Some(success) => Ok(EndpointResponse {
                        success,
                        message: None,
                    }),
                    None => Err(TransportError::Unavailable("offline".into())),
                }
            }
        }
    }

    fn form() -> ContactForm {
        ContactForm::new("A", "a@b.c", "hi")
    }

    fn controller(transport: StubTransport) -> SubmissionController<StubTransport> {
        SubmissionController::new(transport, ControllerOptions::new("test-key"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_phase_sequence() {
        let gate = Arc::new(Notify::new());
        let ctl = controller(StubTransport::replying(true).gated(Arc::clone(&gate)));
        let mut form = form();
        assert_eq!(ctl.state().phase, Phase::Idle);

        let (outcome, ()) = tokio::join!(ctl.submit(&mut form), async {
            tokio::task::yield_now().await;
            assert_eq!(ctl.state().phase, Phase::Submitting);
            assert!(ctl.view().button_disabled);
            gate.notify_one();
        });
        assert_eq!(outcome.unwrap(), SubmitOutcome::Sent);
        assert_eq!(ctl.state().phase, Phase::Success);
        assert_eq!(ctl.state().message.as_deref(), Some(SUCCESS_MESSAGE));
        assert!(form.is_empty());

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(ctl.state().phase, Phase::Success);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = ctl.state();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentrant_submit_is_ignored() {
        let gate = Arc::new(Notify::new());
        let ctl = controller(StubTransport::replying(true).gated(Arc::clone(&gate)));
        let mut first = form();
        let mut second = form();

        let (a, b) = tokio::join!(ctl.submit(&mut first), async {
            tokio::task::yield_now().await;
            let outcome = ctl.submit(&mut second).await;
            gate.notify_one();
            outcome
        });
        assert_eq!(a.unwrap(), SubmitOutcome::Sent);
        assert_eq!(b.unwrap(), SubmitOutcome::Ignored);
        assert_eq!(ctl.transport().calls(), 1);
        assert_eq!(second, form(), "ignored submit must not clear its inputs");
    }

    #[tokio::test]
    async fn test_transport_failure_sets_network_error() {
        let ctl = controller(StubTransport::failing());
        let mut form = form();
        let outcome = ctl.submit(&mut form).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::NetworkError);
        let state = ctl.state();
        assert_eq!(state.phase, Phase::Error);
        assert_eq!(state.message.as_deref(), Some(NETWORK_ERROR_MESSAGE));
        assert_eq!(form, self::form());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_keeps_fields_and_error_persists() {
        let ctl = controller(StubTransport::replying(false));
        let mut form = form();
        let outcome = ctl.submit(&mut form).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(form, self::form());

        tokio::time::sleep(Duration::from_secs(60)).await;
        let state = ctl.state();
        assert_eq!(state.phase, Phase::Error);
        assert_eq!(state.message.as_deref(), Some(REJECTED_MESSAGE));

        // Retry from Error is allowed.
        ctl.submit(&mut form).await.unwrap();
        assert_eq!(ctl.transport().calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_form_never_hits_network() {
        let ctl = controller(StubTransport::replying(true));
        let mut form = ContactForm::new("A", "", "hi");
        let err = ctl.submit(&mut form).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidForm(_)));
        assert_eq!(ctl.transport().calls(), 0);
        assert_eq!(ctl.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_access_key_is_appended() {
        let ctl = controller(StubTransport::replying(true));
        ctl.submit(&mut form()).await.unwrap();
        let bodies = ctl.transport().bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].last(), Some(&("access_key", "test-key".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_pending_dwell() {
        let ctl = controller(StubTransport::replying(true));
        let mut rx = ctl.subscribe();
        ctl.submit(&mut form()).await.unwrap();
        assert_eq!(ctl.state().phase, Phase::Success);
        let _ = rx.borrow_and_update();

        ctl.dispose();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ctl.state().phase, Phase::Success);
        assert!(!rx.has_changed().unwrap());

        let err = ctl.submit(&mut form()).await.unwrap_err();
        assert!(matches!(err, ClientError::Disposed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_during_flight_leaves_state_alone() {
        let gate = Arc::new(Notify::new());
        let ctl = controller(StubTransport::replying(true).gated(Arc::clone(&gate)));
        let mut form = form();

        let (outcome, ()) = tokio::join!(ctl.submit(&mut form), async {
            tokio::task::yield_now().await;
            ctl.dispose();
        });
        assert!(matches!(outcome, Err(ClientError::Disposed)));
        assert_eq!(ctl.state().phase, Phase::Submitting);
        assert!(!form.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_during_success_outlives_old_dwell() {
        let gate = Arc::new(Notify::new());
        let ctl = SubmissionController::new(
            StubTransport::replying(true).gated(Arc::clone(&gate)),
            ControllerOptions::new("k").with_dwell(Duration::from_secs(5)),
        );

        gate.notify_one();
        ctl.submit(&mut form()).await.unwrap();
        assert_eq!(ctl.state().phase, Phase::Success);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let mut second = form();
        let (outcome, ()) = tokio::join!(ctl.submit(&mut second), async {
            // Hold the second request past the first attempt's dwell deadline.
            tokio::time::sleep(Duration::from_secs(4)).await;
            assert_eq!(ctl.state().phase, Phase::Submitting);
            gate.notify_one();
        });
        assert_eq!(outcome.unwrap(), SubmitOutcome::Sent);
        assert_eq!(ctl.state().attempt, 2);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(ctl.state().phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_does_not_block_retries() {
        let gate = Arc::new(Notify::new());
        let ctl = controller(StubTransport::replying(true).gated(Arc::clone(&gate)));
        let mut form = form();

        let timed_out = tokio::time::timeout(Duration::from_secs(1), ctl.submit(&mut form)).await;
        assert!(timed_out.is_err());
        assert!(!ctl.is_disposed());
        let state = ctl.state();
        assert_eq!(state.phase, Phase::Error);
        assert_eq!(state.message.as_deref(), Some(NETWORK_ERROR_MESSAGE));
        assert!(!ctl.view().button_disabled);
        assert_eq!(form, self::form());

        gate.notify_one();
        assert_eq!(ctl.submit(&mut form).await.unwrap(), SubmitOutcome::Sent);
        assert_eq!(ctl.transport().calls(), 2);
        assert_eq!(ctl.state().attempt, 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let ctl = controller(StubTransport::replying(false));
        let mut rx = ctl.subscribe();
        assert_eq!(rx.borrow_and_update().phase, Phase::Idle);
        ctl.submit(&mut form()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase, Phase::Error);
    }
}
