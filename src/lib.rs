//! Wordpath · Language-Learning Core Engine
//!
//! - Progression/scoring engine (activity counts -> level + percent)
//! - Quiz generation pipeline with deterministic fallback
//! - Definition + paragraph pipelines (same fallback shape)
//! - Optional OpenAI-compatible integration (via environment variables)
//!
//! Important env variables:
//!   OPENAI_API_KEY      : enables text generation if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_FAST_MODEL   : default "gpt-4o-mini"
//!   OPENAI_STRONG_MODEL : default "gpt-4o"
//!   GEN_TIMEOUT_SECS    : outbound call timeout, default 20
//!   ENGINE_CONFIG_PATH  : path to TOML config (prompts + bank extensions)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

pub mod telemetry;
pub mod util;
pub mod error;
pub mod domain;
pub mod config;
pub mod banks;
pub mod progress;
pub mod openai;
pub mod quiz;
pub mod lexicon;
pub mod paragraphs;
pub mod engine;

pub use domain::{
  difficulty_for_word, ActivityCounts, CefrLevel, Difficulty, MatchPair, MatchingPayload,
  ParagraphCounts, ProgressResult, ProgressStats, QuizAttemptResult, QuizQuestion, QuizSource,
  QuizSpec, QuizType, VocabularyWord, WordCounts,
};
pub use engine::Engine;
pub use error::{EngineError, GenFailure};
pub use lexicon::DEFINITION_UNAVAILABLE;
pub use progress::{compute_progress, estimate_avg_score_percent};
pub use quiz::score_attempt;
