//! Error taxonomy for the core engine.
//!
//! `GenFailure` covers everything the text-generation capability can do
//! wrong; it is absorbed at the engine boundary and converted into a
//! deterministic fallback value, never shown to callers. `EngineError` is
//! the small set of caller mistakes we do propagate.

use thiserror::Error;

/// Failure of the external text-generation capability.
///
/// Always converted into fallback content (quiz, paragraph, or the
/// "translation unavailable" sentinel) inside the engine.
#[derive(Debug, Error)]
pub enum GenFailure {
  /// No API key configured; generation is disabled for this process.
  #[error("text generation is not configured")]
  Disabled,

  /// Transport-level failure (DNS, connect, TLS, ...).
  #[error("request failed: {0}")]
  Transport(String),

  /// The backend answered with a non-success HTTP status.
  #[error("backend HTTP {status}: {message}")]
  Http { status: u16, message: String },

  /// The bounded wait elapsed before the backend answered.
  #[error("generation timed out")]
  Timeout,

  /// The backend answered but the completion was empty.
  #[error("empty completion")]
  EmptyCompletion,
}

/// Caller-side validation failures. These are the only errors that leave
/// the engine; generation failures never do.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
  /// A quiz was requested for an empty word selection.
  #[error("no words selected for quiz generation")]
  EmptySelection,
}
