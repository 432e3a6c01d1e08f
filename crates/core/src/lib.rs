//! # Parley Core
//!
//! Domain types, the widget state machine, and error definitions for the
//! Parley assistant widget. This crate does no I/O of its own: it defines
//! the model that the client and the rendering surfaces work against.
//!
//! ## Layout
//!
//! - [`identity`] — one conversation id per widget lifetime
//! - [`message`] / [`transcript`] — the ordered, append-only message log
//! - [`widget`] — the pure reducer driving `Idle → Submitting → Idle`
//! - [`service`] — the answering-service trait and its response contract
//! - [`event`] — change notifications for rendering surfaces

pub mod error;
pub mod event;
pub mod identity;
pub mod message;
pub mod service;
pub mod transcript;
pub mod widget;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, ServiceError};
pub use event::{EventBus, WidgetEvent};
pub use identity::ConversationId;
pub use message::{Message, Role, SourceDocument};
pub use service::{Answer, AnsweringService, QueryRequest, ResponseContract};
pub use transcript::Transcript;
pub use widget::{Action, Effect, Phase, Transition, WidgetState};
