use super::page::{canonicalize, PageError, PageRef};
use super::session::NavigationSession;
use super::settings::NavigatorSettings;
use crate::net::{CancelToken, HttpProbe, Probe, ProbeError, TargetValidator, ValidationOutcome};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Back => f.write_str("back"),
            Direction::Forward => f.write_str("forward"),
        }
    }
}

/// Why a navigation did not happen. The session is unchanged in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Please enter a page name or URL")]
    EmptyInput,
    #[error("Already on {0}")]
    AlreadyOnPage(PageRef),
    #[error("{0} is already in the back history")]
    DuplicateInHistory(PageRef),
    #[error("Another navigation is still being checked")]
    NavigationInProgress,
    #[error("Invalid URL")]
    InvalidFormat,
    #[error("Page not found or network error")]
    Unreachable,
    #[error("Page did not respond in time")]
    Timeout,
    #[error("No {0} history")]
    NoHistory(Direction),
}

impl NavigationError {
    /// Whether the UI should play its "bounce" feedback for this rejection
    pub fn should_bounce(&self) -> bool {
        !matches!(self, NavigationError::NavigationInProgress)
    }
}

impl From<PageError> for NavigationError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::EmptyInput => NavigationError::EmptyInput,
        }
    }
}

fn outcome_result(outcome: ValidationOutcome) -> Result<(), NavigationError> {
    match outcome {
        ValidationOutcome::Accepted => Ok(()),
        ValidationOutcome::RejectedInvalidFormat => Err(NavigationError::InvalidFormat),
        ValidationOutcome::RejectedUnreachable => Err(NavigationError::Unreachable),
        ValidationOutcome::RejectedTimeout => Err(NavigationError::Timeout),
    }
}

pub type NavigationResult = Result<PageRef, NavigationError>;

/// Result of a spawned validation, tagged with the `navigate` call it
/// belongs to. `outcome` is `None` when the validation was abandoned.
#[derive(Debug)]
struct ValidationReport {
    generation: u64,
    outcome: Option<ValidationOutcome>,
}

struct PendingNavigation {
    generation: u64,
    target: PageRef,
    cancel: CancelToken,
}

enum NavigationState {
    Idle,
    Validating(PendingNavigation),
}

/// Owns the navigation session and gates every new navigation behind an
/// asynchronous validation.
///
/// Validations run as Tokio tasks, so `navigate` must be called from within a
/// runtime context. At most one validation is outstanding at a time.
pub struct NavigationController {
    session: NavigationSession,
    state: NavigationState,
    generation: u64,
    validator: Arc<TargetValidator>,
    report_tx: mpsc::UnboundedSender<ValidationReport>,
    report_rx: mpsc::UnboundedReceiver<ValidationReport>,
    snapshot_tx: watch::Sender<NavigationSession>,
}

impl NavigationController {
    pub fn new(settings: &NavigatorSettings, probe: Arc<dyn Probe>) -> Self {
        let session = NavigationSession::new();
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(session.clone());

        Self {
            session,
            state: NavigationState::Idle,
            generation: 0,
            validator: Arc::new(TargetValidator::new(probe, settings)),
            report_tx,
            report_rx,
            snapshot_tx,
        }
    }

    pub fn with_http_probe(settings: &NavigatorSettings) -> Result<Self, ProbeError> {
        let probe = HttpProbe::new(settings)?;
        Ok(Self::new(settings, Arc::new(probe)))
    }

    /// Start navigating to `raw`.
    ///
    /// Cheap rejections (empty input, same page, page already in the back
    /// history, validation in progress) are returned immediately. Otherwise a
    /// validation is started and the canonical target is returned; use
    /// [`settle`](Self::settle) or [`poll_validation`](Self::poll_validation)
    /// to learn how it ended.
    pub fn navigate(&mut self, raw: &str) -> Result<PageRef, NavigationError> {
        if let NavigationState::Validating(pending) = &self.state {
            log::debug!(
                "Rejecting navigation to {:?}: still validating {}",
                raw,
                pending.target
            );
            return Err(NavigationError::NavigationInProgress);
        }

        let target = canonicalize(raw)?;
        self.check_target(&target)?;

        self.generation += 1;
        let generation = self.generation;
        let cancel = CancelToken::new();

        let validator = Arc::clone(&self.validator);
        let report_tx = self.report_tx.clone();
        let task_cancel = cancel.clone();
        let raw = raw.to_string();
        tokio::spawn(async move {
            let outcome = validator.validate_with_cancel(&raw, &task_cancel).await;
            // The receiver lives as long as the controller
            let _ = report_tx.send(ValidationReport { generation, outcome });
        });

        log::info!("Validating {} (generation {})", target, generation);
        self.state = NavigationState::Validating(PendingNavigation {
            generation,
            target: target.clone(),
            cancel,
        });

        Ok(target)
    }

    /// Wait for the outstanding validation and apply it.
    ///
    /// Returns `None` when nothing is pending, or when the pending navigation
    /// was abandoned by [`clear`](Self::clear).
    pub async fn settle(&mut self) -> Option<NavigationResult> {
        while self.is_validating() {
            let report = self.report_rx.recv().await?;
            if let Some(result) = self.apply_report(report) {
                return Some(result);
            }
        }
        None
    }

    /// Non-blocking variant of [`settle`](Self::settle) for frame-driven UIs
    pub fn poll_validation(&mut self) -> Option<NavigationResult> {
        while let Ok(report) = self.report_rx.try_recv() {
            if let Some(result) = self.apply_report(report) {
                return Some(result);
            }
        }
        None
    }

    pub fn go_back(&mut self) -> NavigationResult {
        let next = self
            .session
            .step_back()
            .ok_or(NavigationError::NoHistory(Direction::Back))?;
        Ok(self.commit(next))
    }

    pub fn go_forward(&mut self) -> NavigationResult {
        let next = self
            .session
            .step_forward()
            .ok_or(NavigationError::NoHistory(Direction::Forward))?;
        Ok(self.commit(next))
    }

    /// Reset to the initial session. A pending validation is abandoned and
    /// its result, if it still arrives, is ignored.
    pub fn clear(&mut self) {
        if let NavigationState::Validating(pending) =
            std::mem::replace(&mut self.state, NavigationState::Idle)
        {
            log::info!("Abandoning validation of {}", pending.target);
            pending.cancel.cancel();
        }
        self.generation += 1;
        self.commit(NavigationSession::new());
        log::info!("History cleared");
    }

    pub fn session(&self) -> NavigationSession {
        self.session.clone()
    }

    pub fn current_page(&self) -> &PageRef {
        self.session.current_page()
    }

    pub fn visit_log(&self) -> &[PageRef] {
        self.session.visit_log()
    }

    pub fn can_go_back(&self) -> bool {
        self.session.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.session.can_go_forward()
    }

    pub fn is_validating(&self) -> bool {
        matches!(self.state, NavigationState::Validating(_))
    }

    /// The target currently being validated, if any
    pub fn pending_target(&self) -> Option<&PageRef> {
        match &self.state {
            NavigationState::Validating(pending) => Some(&pending.target),
            NavigationState::Idle => None,
        }
    }

    /// Receive a fresh session snapshot after every transition
    pub fn subscribe(&self) -> watch::Receiver<NavigationSession> {
        self.snapshot_tx.subscribe()
    }

    fn check_target(&self, target: &PageRef) -> Result<(), NavigationError> {
        if target == self.session.current_page() {
            return Err(NavigationError::AlreadyOnPage(target.clone()));
        }
        if self.session.back_stack().contains(target) {
            return Err(NavigationError::DuplicateInHistory(target.clone()));
        }
        Ok(())
    }

    fn apply_report(&mut self, report: ValidationReport) -> Option<NavigationResult> {
        let pending = match std::mem::replace(&mut self.state, NavigationState::Idle) {
            NavigationState::Validating(pending) if pending.generation == report.generation => {
                pending
            }
            other => {
                self.state = other;
                log::debug!(
                    "Discarding stale validation result (generation {})",
                    report.generation
                );
                return None;
            }
        };

        let outcome = report.outcome?;
        log::info!("Validation of {} finished: {:?}", pending.target, outcome);

        // History may have been traversed while the probe was running
        let result = outcome_result(outcome)
            .and_then(|()| self.check_target(&pending.target))
            .map(|()| {
                let next = self.session.advance(pending.target);
                self.commit(next)
            });

        if let Err(e) = &result {
            log::info!("Navigation rejected: {}", e);
        }
        Some(result)
    }

    fn commit(&mut self, next: NavigationSession) -> PageRef {
        self.session = next;
        self.snapshot_tx.send_replace(self.session.clone());
        self.session.current_page().clone()
    }
}

impl Drop for NavigationController {
    fn drop(&mut self) {
        if let NavigationState::Validating(pending) = &self.state {
            pending.cancel.cancel();
        }
    }
}
