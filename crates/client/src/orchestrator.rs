//! Request orchestrator — the only writer of widget state.
//!
//! Rendering surfaces call [`Orchestrator::submit`], [`Orchestrator::toggle_open`],
//! [`Orchestrator::clear_transcript`] and [`Orchestrator::set_draft_input`],
//! and read everything else through [`Orchestrator::snapshot`]. Each call is
//! turned into an [`Action`] and run through the reducer; the network attempt
//! is the only point where a submit suspends.
//!
//! The state lock is held for one reducer step at a time and never across
//! an `.await`. Re-entrancy is prevented by the busy flag, not by the lock:
//! a second submit while a cycle is in flight is rejected by the reducer.

use chrono::Utc;
use parley_config::AppConfig;
use parley_core::error::ServiceError;
use parley_core::event::{EventBus, WidgetEvent};
use parley_core::identity::ConversationId;
use parley_core::message::Message;
use parley_core::service::{AnsweringService, DEFAULT_ERROR_TEMPLATE};
use parley_core::widget::{Action, Effect, WidgetState, reduce};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::fallback::FallbackChain;

/// How a call to [`Orchestrator::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input, or a cycle was already in flight. Nothing changed.
    Ignored,
    /// The service answered; carries the appended assistant message.
    Answered(Message),
    /// Every attempt failed; carries the appended error message.
    Failed(Message),
}

/// Drives request cycles and owns the widget state.
pub struct Orchestrator {
    state: Mutex<WidgetState>,
    service: Arc<dyn AnsweringService>,
    events: Arc<EventBus>,
    error_template: String,
}

impl Orchestrator {
    pub fn new(conversation_id: ConversationId, service: Arc<dyn AnsweringService>) -> Self {
        Self {
            state: Mutex::new(WidgetState::new(conversation_id)),
            service,
            events: Arc::new(EventBus::default()),
            error_template: DEFAULT_ERROR_TEMPLATE.into(),
        }
    }

    /// Build a widget from configuration: fresh conversation id, primary →
    /// fallback chain, configured error wording and initial visibility.
    pub fn from_config(config: &AppConfig) -> parley_core::Result<Self> {
        config.validate()?;
        let chain = FallbackChain::from_config(config)?;
        let id = ConversationId::generate(&config.widget.conversation_prefix);
        info!(conversation_id = %id, "Widget created");

        let orchestrator =
            Self::new(id, Arc::new(chain)).with_error_template(&config.widget.error_template);
        if config.widget.start_open {
            orchestrator.toggle_open();
        }
        Ok(orchestrator)
    }

    /// Set the wording of failure messages; `{error}` is replaced by the
    /// failure description.
    pub fn with_error_template(mut self, template: impl Into<String>) -> Self {
        self.error_template = template.into();
        self
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current widget state for rendering.
    pub fn snapshot(&self) -> WidgetState {
        self.lock().clone()
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.lock().conversation_id.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages().to_vec()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn draft_input(&self) -> String {
        self.lock().draft_input.clone()
    }

    pub fn toggle_open(&self) {
        self.apply(Action::ToggleOpen);
    }

    /// Empty the transcript. The conversation id is kept.
    pub fn clear_transcript(&self) {
        self.apply(Action::ClearTranscript);
    }

    pub fn set_draft_input(&self, text: impl Into<String>) {
        self.apply(Action::SetDraft(text.into()));
    }

    /// Submit whatever is currently in the draft.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.draft_input();
        self.submit(draft).await
    }

    /// Run one request cycle for `question`.
    ///
    /// Returns [`SubmitOutcome::Ignored`] without touching anything when the
    /// question is blank or another cycle is in flight. Otherwise the user
    /// message is appended before the first attempt starts and exactly one
    /// assistant message is appended once the attempts are over.
    pub async fn submit(&self, question: impl Into<String>) -> SubmitOutcome {
        let question = question.into();
        let request = match self.apply(Action::Submit { question }).effect {
            Effect::Dispatch(request) => request,
            Effect::None => {
                debug!("Submit ignored (blank input or cycle in flight)");
                return SubmitOutcome::Ignored;
            }
        };

        // Clears busy if this future is dropped or unwinds before resolving.
        let release = ReleaseOnDrop::arm(self);

        info!(conversation_id = %request.conversation_id, "Request cycle started");
        match self.service.query(request).await {
            Ok(answer) => {
                let step = self.apply(Action::ResolveOk(answer));
                release.disarm();
                info!("Request cycle answered");
                step.appended
                    .map_or(SubmitOutcome::Ignored, SubmitOutcome::Answered)
            }
            Err(e) => {
                warn!(error = %e, "Request cycle failed");
                let step = self.apply(Action::ResolveError(self.describe_failure(&e)));
                release.disarm();
                step.appended
                    .map_or(SubmitOutcome::Ignored, SubmitOutcome::Failed)
            }
        }
    }

    fn describe_failure(&self, error: &ServiceError) -> String {
        self.error_template.replace("{error}", &error.to_string())
    }

    /// Run one reducer step and publish what changed.
    fn apply(&self, action: Action) -> Step {
        let (before, after, step) = {
            let mut state = self.lock();
            let transition = reduce(&state, action);
            let before = Summary::of(&state);
            *state = transition.state;
            let after = Summary::of(&state);
            let appended = if after.len > before.len {
                state.transcript.last().cloned()
            } else {
                None
            };
            let step = Step {
                effect: transition.effect,
                appended,
            };
            (before, after, step)
        };
        self.publish_changes(&before, &after);
        step
    }

    fn publish_changes(&self, before: &Summary, after: &Summary) {
        let timestamp = Utc::now();

        if after.len < before.len {
            self.events.publish(WidgetEvent::TranscriptCleared { timestamp });
        }
        if after.len > before.len {
            if let Some((role, is_error)) = after.last {
                self.events.publish(WidgetEvent::MessageAppended {
                    index: after.len - 1,
                    role,
                    is_error,
                    timestamp,
                });
            }
        }
        if after.busy != before.busy {
            self.events.publish(WidgetEvent::BusyChanged {
                busy: after.busy,
                timestamp,
            });
        }
        if after.open != before.open {
            self.events.publish(WidgetEvent::VisibilityChanged {
                open: after.open,
                timestamp,
            });
        }
    }
}

/// What one reducer step did.
struct Step {
    effect: Effect,
    /// The message this step appended, if any
    appended: Option<Message>,
}

/// The observable bits of a state, compared before and after each step.
struct Summary {
    len: usize,
    last: Option<(parley_core::message::Role, bool)>,
    busy: bool,
    open: bool,
}

impl Summary {
    fn of(state: &WidgetState) -> Self {
        Self {
            len: state.transcript.len(),
            last: state.transcript.last().map(|m| (m.role, m.is_error)),
            busy: state.busy,
            open: state.open,
        }
    }
}

/// Releases busy for a cycle that never got to resolve.
///
/// Once the resolve step has run, busy may already belong to the next
/// cycle, so the guard must be disarmed and never fire.
struct ReleaseOnDrop<'a> {
    widget: &'a Orchestrator,
    armed: bool,
}

impl<'a> ReleaseOnDrop<'a> {
    fn arm(widget: &'a Orchestrator) -> Self {
        Self {
            widget,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.widget.apply(Action::Release);
        }
    }
}
