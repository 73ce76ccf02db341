//! Practice-paragraph pipeline.
//!
//! Same shape as the definition pipeline: prompt the strong model, sanity
//! check the reply, and fall back to the static per-level/topic text bank
//! when generation is unavailable or unusable.

use tracing::{error, instrument, warn};

use crate::banks;
use crate::domain::CefrLevel;
use crate::engine::Engine;
use crate::openai::GenOptions;
use crate::util::fill_template;

const PARAGRAPH_MAX_TOKENS: u32 = 400;

/// Shorter replies than this are not a paragraph, whatever the model says.
const MIN_PARAGRAPH_CHARS: usize = 40;

/// Generate one practice paragraph for the given CEFR level and optional
/// topic. Never fails outward; quality degrades to bank content instead.
#[instrument(level = "info", skip(engine), fields(%level, topic = topic.unwrap_or("")))]
pub async fn generate_paragraph(engine: &Engine, level: CefrLevel, topic: Option<&str>) -> String {
  let topic = topic.map(str::trim).filter(|t| !t.is_empty());

  if let Some(oa) = &engine.openai {
    let mut user =
      fill_template(&engine.prompts.paragraph_user_template, &[("level", level.as_str())]);
    if let Some(t) = topic {
      user.push_str(&fill_template(&engine.prompts.paragraph_topic_suffix, &[("topic", t)]));
    }
    let opts = GenOptions { max_tokens: Some(PARAGRAPH_MAX_TOKENS), temperature: 0.8 };
    match oa.generate(&oa.strong_model, &engine.prompts.paragraph_system, &user, &opts).await {
      Ok(text) => {
        let text = text.trim().to_string();
        if is_plausible_paragraph(&text) {
          return text;
        }
        warn!(target: "wordpath_core", %level, reply_len = text.len(), "Degenerate paragraph rejected; using bank");
      }
      Err(e) => {
        error!(target: "wordpath_core", %level, error = %e, "Paragraph generation failed; using bank");
      }
    }
  }

  // Config-supplied bank entries win over the built-in texts.
  if let Some(text) = engine.extra_paragraph(level, topic) {
    return text;
  }
  banks::fallback_paragraph(level, topic).to_string()
}

fn is_plausible_paragraph(text: &str) -> bool {
  text.chars().count() >= MIN_PARAGRAPH_CHARS && text.contains(' ')
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::EngineConfig;

  fn offline_engine() -> Engine {
    Engine::new(None, EngineConfig::default())
  }

  #[tokio::test]
  async fn offline_paragraphs_come_from_the_bank() {
    let engine = offline_engine();
    let text = generate_paragraph(&engine, CefrLevel::B1, None).await;
    assert_eq!(text, banks::fallback_paragraph(CefrLevel::B1, None));
    assert!(text.chars().count() >= MIN_PARAGRAPH_CHARS);
  }

  #[tokio::test]
  async fn topic_selects_the_matching_bank_entry() {
    let engine = offline_engine();
    let text = generate_paragraph(&engine, CefrLevel::A2, Some("Reisen")).await;
    assert!(text.contains("Meer"));
    // unknown topics fall back to the level default
    let other = generate_paragraph(&engine, CefrLevel::A2, Some("Quantenphysik")).await;
    assert_eq!(other, banks::fallback_paragraph(CefrLevel::A2, None));
  }

  #[test]
  fn plausibility_rejects_trivial_replies() {
    assert!(!is_plausible_paragraph("Ok."));
    assert!(!is_plausible_paragraph("EinWortOhneLeerzeichenAberSehrSehrSehrSehrLang"));
    assert!(is_plausible_paragraph(banks::fallback_paragraph(CefrLevel::A2, None)));
  }
}
