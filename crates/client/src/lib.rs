//! Answering-service client and request orchestrator for Parley.
//!
//! All services implement the `parley_core::AnsweringService` trait.
//! [`HttpAnsweringService`] talks to one endpoint, [`FallbackChain`] tries
//! several in order, and [`Orchestrator`] owns the widget state and drives
//! one request cycle per accepted submit.

pub mod fallback;
pub mod http;
pub mod orchestrator;

pub use fallback::FallbackChain;
pub use http::HttpAnsweringService;
pub use orchestrator::{Orchestrator, SubmitOutcome};
