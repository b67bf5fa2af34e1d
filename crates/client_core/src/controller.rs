//! Session controller: bridges UI intent to the verification service and
//! folds its asynchronous outcome events back into observable state.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use shared::{
    domain::{AnalysisRequest, SessionField, SessionGeneration, SubmissionId},
    error::AnalysisError,
    event::{EventOutcome, RawEvent, SdkEvent},
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, warn};
use verification_sdk::{SessionConfig, SessionFactory, VerificationSession};

use crate::{
    alert::AlertPresenter,
    form::FormState,
    inbox::{spawn_event_forwarder, spawn_fallback_timer, ControllerMessage},
    state::{ControllerMode, ControllerSnapshot, Phase, SubmitOutcome},
};

pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub mode: ControllerMode,
    pub fallback_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            mode: ControllerMode::default(),
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }
}

struct ActiveSession {
    handle: Arc<dyn VerificationSession>,
    generation: SessionGeneration,
    forwarder: JoinHandle<()>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

struct PendingFallback {
    submission: SubmissionId,
    timer: JoinHandle<()>,
}

pub struct AnalysisController {
    factory: Arc<dyn SessionFactory>,
    settings: ControllerSettings,
    form: FormState,
    phase: Phase,
    alert: AlertPresenter,
    session: Option<ActiveSession>,
    generations: u64,
    submissions: u64,
    in_flight: Option<PendingFallback>,
    inbox_tx: mpsc::UnboundedSender<ControllerMessage>,
    inbox_rx: mpsc::UnboundedReceiver<ControllerMessage>,
}

impl AnalysisController {
    pub fn new(factory: Arc<dyn SessionFactory>, settings: ControllerSettings) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            factory,
            settings,
            form: FormState::default(),
            phase: Phase::Uninitialized,
            alert: AlertPresenter::default(),
            session: None,
            generations: 0,
            submissions: 0,
            in_flight: None,
            inbox_tx,
            inbox_rx,
        }
    }

    /// Creates and mounts a fresh session, discarding any previous one.
    ///
    /// Failures are logged and leave the controller uninitialized; the
    /// service owns config validation.
    pub async fn initialize(&mut self, config: SessionConfig) {
        if let Some(previous) = self.session.take() {
            info!(
                generation = previous.generation.0,
                "discarding previous verification session"
            );
        }

        self.generations += 1;
        let generation = SessionGeneration(self.generations);

        let handle = match self.factory.create_session(config).await {
            Ok(handle) => handle,
            Err(err) => {
                error!("failed to create verification session: {err:#}");
                self.reset_uninitialized();
                return;
            }
        };

        // Subscribe before mounting so events raised during mount are kept.
        let forwarder = spawn_event_forwarder(
            generation,
            handle.subscribe_events(),
            self.inbox_tx.clone(),
        );
        let active = ActiveSession {
            handle,
            generation,
            forwarder,
        };

        if let Err(err) = active.handle.mount() {
            error!("failed to mount verification session: {err:#}");
            self.reset_uninitialized();
            return;
        }

        self.session = Some(active);
        if self.phase == Phase::Uninitialized {
            self.phase = Phase::Ready;
        }
        info!(generation = generation.0, "verification session ready");
    }

    fn reset_uninitialized(&mut self) {
        if let Some(pending) = self.in_flight.take() {
            pending.timer.abort();
        }
        self.phase = Phase::Uninitialized;
    }

    /// UI submit command: builds the request from the form and honours
    /// `can_submit`.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.session.is_none() {
            self.report(AnalysisError::NotInitialized);
            return SubmitOutcome::NotInitialized;
        }
        if !self.form.has_cpf() {
            debug!("submit ignored: cpf is empty");
            return SubmitOutcome::MissingCpf;
        }
        if self.phase == Phase::Submitting {
            debug!("submit ignored: analysis already in flight");
            return SubmitOutcome::AlreadyInFlight;
        }
        let request = self.form.to_request();
        self.submit_request(request)
    }

    pub fn submit_request(&mut self, request: AnalysisRequest) -> SubmitOutcome {
        let Some(active) = self.session.as_ref() else {
            self.report(AnalysisError::NotInitialized);
            return SubmitOutcome::NotInitialized;
        };

        if self.phase == Phase::Submitting {
            match self.settings.mode {
                ControllerMode::Guarded => {
                    warn!("rejecting submission while another analysis is in flight");
                    return SubmitOutcome::AlreadyInFlight;
                }
                ControllerMode::Compat => {
                    warn!("submitting while another analysis is in flight");
                }
            }
        }

        let handle = Arc::clone(&active.handle);
        if let Err(err) = send_request(handle.as_ref(), &request) {
            error!("failed to send analysis request: {err:#}");
            self.report(AnalysisError::Internal(err.to_string()));
            return SubmitOutcome::SendFailed;
        }

        self.submissions += 1;
        let submission = SubmissionId(self.submissions);
        self.phase = Phase::Submitting;

        let timer = spawn_fallback_timer(
            submission,
            self.settings.fallback_delay,
            self.inbox_tx.clone(),
        );
        if let Some(previous) = self.in_flight.replace(PendingFallback { submission, timer }) {
            debug!(
                previous = previous.submission.0,
                "earlier fallback timer left armed"
            );
        }

        info!(
            submission = submission.0,
            has_ref_id = request.ref_id.is_some(),
            mode = self.settings.mode.as_str(),
            "analysis submitted"
        );
        SubmitOutcome::Started
    }

    /// Applies one outcome event. Unknown ids change nothing.
    pub fn handle_event(&mut self, raw: RawEvent) {
        let event = SdkEvent::from(raw);
        let outcome = event.outcome();
        debug!(event_id = event.event_id(), ?outcome, "dispatching verification event");

        match &outcome {
            EventOutcome::Ignored => return,
            EventOutcome::Failed(err) => {
                warn!(
                    category = ?err.category(),
                    remote = err.is_remote(),
                    "analysis failed: {err}"
                );
            }
            EventOutcome::Advisory(condition) => {
                info!("advisory condition reported: {condition}");
            }
            EventOutcome::Succeeded => {}
        }

        if outcome.is_terminal() {
            self.finish_submission(event.event_id());
        }
        if let Some(message) = outcome.alert_message() {
            self.alert.show(message);
        }
    }

    fn finish_submission(&mut self, event_id: &str) {
        if self.phase == Phase::Uninitialized {
            debug!(event_id, "terminal event without a session; phase unchanged");
            return;
        }
        if self.phase != Phase::Submitting {
            warn!(event_id, "terminal event arrived after the submission had ended");
        }
        if let Some(pending) = self.in_flight.take() {
            if self.settings.mode == ControllerMode::Guarded {
                pending.timer.abort();
            }
        }
        self.phase = Phase::Ready;
    }

    fn on_fallback_elapsed(&mut self, submission: SubmissionId) {
        let is_current = self
            .in_flight
            .as_ref()
            .is_some_and(|pending| pending.submission == submission);

        match self.settings.mode {
            ControllerMode::Guarded => {
                if !is_current {
                    debug!(submission = submission.0, "stale fallback ignored");
                    return;
                }
                self.in_flight = None;
                warn!(
                    submission = submission.0,
                    "no outcome before fallback delay; returning to ready"
                );
                self.phase = Phase::Ready;
            }
            ControllerMode::Compat => {
                if is_current {
                    self.in_flight = None;
                }
                if self.phase == Phase::Uninitialized {
                    return;
                }
                if self.phase == Phase::Submitting {
                    debug!(submission = submission.0, "fallback reset while submitting");
                }
                self.phase = Phase::Ready;
            }
        }
    }

    fn apply(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::Event { generation, event } => {
                let current = self.session.as_ref().map(|active| active.generation);
                if current != Some(generation) {
                    debug!(
                        generation = generation.0,
                        event_id = %event.event_id,
                        "dropping event from discarded session"
                    );
                    return;
                }
                self.handle_event(event);
            }
            ControllerMessage::FallbackElapsed { submission } => {
                self.on_fallback_elapsed(submission);
            }
        }
    }

    /// Waits for and applies the next queued message.
    ///
    /// The controller holds its own inbox sender, so the inbox never closes
    /// while the controller is alive.
    pub async fn process_next(&mut self) {
        if let Some(message) = self.inbox_rx.recv().await {
            self.apply(message);
        }
    }

    /// Applies everything already queued without waiting.
    pub fn drain_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.inbox_rx.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    fn report(&mut self, err: AnalysisError) {
        warn!(category = ?err.category(), remote = err.is_remote(), "{err}");
        self.alert.show(err.to_string());
    }

    pub fn acknowledge_alert(&mut self) {
        self.alert.acknowledge();
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn can_submit(&self) -> bool {
        self.form.can_submit(self.phase)
    }

    pub fn alert_visible(&self) -> bool {
        self.alert.is_visible()
    }

    pub fn alert_message(&self) -> Option<&str> {
        self.alert.last_message()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            cpf: self.form.cpf().to_string(),
            email: self.form.email().to_string(),
            ref_id_geoloc: self.form.ref_id_geoloc().to_string(),
            phase: self.phase,
            can_submit: self.can_submit(),
            alert_visible: self.alert.is_visible(),
            alert_message: self.alert.last_message().unwrap_or_default().to_string(),
        }
    }
}

fn send_request(session: &dyn VerificationSession, request: &AnalysisRequest) -> Result<()> {
    for (field, value) in [
        (SessionField::Cpf, &request.cpf),
        (SessionField::Email, &request.email),
    ] {
        debug!(field = field.as_str(), empty = value.is_empty(), "setting session field");
        session.set_field(field, value)?;
    }
    session.submit_analysis(request.ref_id.as_deref())
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
