//! Widget state and its reducer.
//!
//! All widget state (visibility, busy flag, draft, transcript, identity)
//! lives in one [`WidgetState`] value. Every change goes through
//! [`reduce`], a pure function from the current state and an [`Action`] to
//! the next state plus an [`Effect`] the caller must carry out. The reducer
//! never performs I/O; when a submit is accepted it hands back
//! [`Effect::Dispatch`] and the caller reports the result with
//! [`Action::ResolveOk`] or [`Action::ResolveError`].
//!
//! ```text
//! Idle --Submit--> Submitting --ResolveOk/ResolveError/Release--> Idle
//! ```

use serde::Serialize;

use crate::identity::ConversationId;
use crate::message::Message;
use crate::service::{Answer, QueryRequest};
use crate::transcript::Transcript;

/// Where the request cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// Everything a rendering surface may read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetState {
    pub conversation_id: ConversationId,
    pub open: bool,
    pub busy: bool,
    pub draft_input: String,
    pub transcript: Transcript,
}

impl WidgetState {
    /// A closed, idle widget with an empty transcript.
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            open: false,
            busy: false,
            draft_input: String::new(),
            transcript: Transcript::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.busy {
            Phase::Submitting
        } else {
            Phase::Idle
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.all()
    }

    /// Whether a submit of `question` would be accepted right now.
    pub fn can_submit(&self, question: &str) -> bool {
        self.phase() == Phase::Idle && !question.trim().is_empty()
    }
}

/// A discrete event fed to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user asked a question.
    Submit { question: String },
    /// An attempt produced an answer.
    ResolveOk(Answer),
    /// Every attempt failed; the payload is the user-facing text.
    ResolveError(String),
    /// Clear the busy flag without writing a message. Used when a cycle is
    /// abandoned before it could resolve.
    Release,
    ToggleOpen,
    ClearTranscript,
    SetDraft(String),
}

/// Work the caller has to do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Send this request to the answering service.
    Dispatch(QueryRequest),
}

/// The result of one reducer step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: WidgetState,
    pub effect: Effect,
}

impl Transition {
    fn stay(state: WidgetState) -> Self {
        Self {
            state,
            effect: Effect::None,
        }
    }
}

/// Compute the next state for `action`.
///
/// Rejected actions (submit while busy, blank submit, resolve while idle)
/// return an unchanged copy of `state` with [`Effect::None`].
pub fn reduce(state: &WidgetState, action: Action) -> Transition {
    let mut next = state.clone();

    match action {
        Action::Submit { question } => {
            if !state.can_submit(&question) {
                return Transition::stay(next);
            }
            next.transcript.append(Message::user(question.clone()));
            next.draft_input.clear();
            next.busy = true;
            let request = QueryRequest::new(next.conversation_id.clone(), question);
            Transition {
                state: next,
                effect: Effect::Dispatch(request),
            }
        }
        Action::ResolveOk(answer) => {
            if state.busy {
                next.transcript
                    .append(Message::assistant(answer.text).with_sources(answer.sources));
                next.busy = false;
            }
            Transition::stay(next)
        }
        Action::ResolveError(content) => {
            if state.busy {
                next.transcript.append(Message::error(content));
                next.busy = false;
            }
            Transition::stay(next)
        }
        Action::Release => {
            next.busy = false;
            Transition::stay(next)
        }
        Action::ToggleOpen => {
            next.open = !state.open;
            Transition::stay(next)
        }
        Action::ClearTranscript => {
            next.transcript.clear();
            Transition::stay(next)
        }
        Action::SetDraft(text) => {
            next.draft_input = text;
            Transition::stay(next)
        }
    }
}
