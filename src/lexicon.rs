//! Word-definition pipeline.
//!
//! A curated override table short-circuits generation for words the model
//! keeps getting wrong (false friends, mostly). Everything else goes to
//! the fast model with a dictionary-style prompt; replies that fail the
//! sanity checks collapse to a fixed sentinel instead of an error.

use tracing::{debug, error, instrument, warn};

use crate::engine::Engine;
use crate::openai::GenOptions;
use crate::util::fill_template;

/// Sentinel returned when no usable definition could be produced.
pub const DEFINITION_UNAVAILABLE: &str = "translation unavailable";

const DEFINITION_MAX_TOKENS: u32 = 60;

/// Regenerate the definition for a single word, optionally with the
/// sentence it appeared in. Never fails outward; quality degrades to the
/// sentinel instead.
#[instrument(level = "info", skip(engine, context), fields(%word, has_context = context.is_some()))]
pub async fn regenerate_definition(engine: &Engine, word: &str, context: Option<&str>) -> String {
  if let Some(def) = engine.override_for(word) {
    debug!(target: "wordpath_core", %word, "Definition served from override table");
    return def;
  }

  if let Some(oa) = &engine.openai {
    let mut user = fill_template(&engine.prompts.definition_user_template, &[("word", word)]);
    if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
      user.push_str(&fill_template(&engine.prompts.definition_context_suffix, &[("context", ctx)]));
    }
    let opts = GenOptions { max_tokens: Some(DEFINITION_MAX_TOKENS), temperature: 0.2 };
    match oa.generate(&oa.fast_model, &engine.prompts.definition_system, &user, &opts).await {
      Ok(text) => {
        let text = text.trim().to_string();
        if is_usable_definition(word, &text) {
          return text;
        }
        warn!(target: "wordpath_core", %word, reply = %text, "Nonsense definition rejected; using sentinel");
      }
      Err(e) => {
        error!(target: "wordpath_core", %word, error = %e, "Definition generation failed; using sentinel");
      }
    }
  }

  DEFINITION_UNAVAILABLE.to_string()
}

/// Sanity checks for a generated definition. Rejects trivial output and
/// the nonsense shapes we have actually seen from the model: leading
/// lowercase-letter-comma fragments ("e, ..."), truncated tails, and the
/// headword echoed back.
pub fn is_usable_definition(word: &str, text: &str) -> bool {
  let t = text.trim();
  if t.chars().count() < 2 {
    return false;
  }

  let mut chars = t.chars();
  let first = chars.next().unwrap_or(' ');
  let second = chars.next().unwrap_or(' ');
  if first.is_lowercase() && first.is_alphabetic() && second == ',' {
    return false;
  }

  if t.ends_with('-') || t.ends_with(',') {
    return false;
  }
  if t.contains('(') && !t.contains(')') {
    return false;
  }

  if t.to_lowercase() == word.trim().to_lowercase() {
    return false;
  }

  true
}
