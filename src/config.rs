//! Loading engine configuration (prompts + optional bank extensions) from TOML.
//!
//! See `EngineConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Extra definition overrides merged over the built-in table.
  #[serde(default)]
  pub overrides: Vec<OverrideCfg>,
  /// Extra fallback paragraphs consulted before the built-in bank.
  #[serde(default)]
  pub paragraphs: Vec<ParagraphCfg>,
}

/// Definition override entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct OverrideCfg {
  pub word: String,
  pub definition: String,
}

/// Fallback paragraph entry accepted in TOML configuration.
/// `level` is a CEFR code ("A2".."C1"); `topic` may be empty for the
/// level default.
#[derive(Clone, Debug, Deserialize)]
pub struct ParagraphCfg {
  pub level: String,
  #[serde(default)]
  pub topic: String,
  pub text: String,
}

/// Prompts used by the generation pipelines. Defaults are sensible for
/// German practice content. Override them in TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Quiz generation
  pub quiz_system: String,
  pub quiz_multiple_choice_template: String,
  pub quiz_fill_blank_template: String,
  pub quiz_matching_template: String,
  // Word definitions
  pub definition_system: String,
  pub definition_user_template: String,
  pub definition_context_suffix: String,
  // Practice paragraphs
  pub paragraph_system: String,
  pub paragraph_user_template: String,
  pub paragraph_topic_suffix: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_system: "You are a German vocabulary quiz generator. Respond ONLY with strict JSON, no prose and no markdown fences.".into(),
      quiz_multiple_choice_template: "Create a multiple choice quiz for these {count} German words with their meanings:\n{words}\nReturn JSON: {\"questions\": [{\"question\": string, \"options\": {\"A\": string, \"B\": string, \"C\": string, \"D\": string}, \"correctAnswer\": letter}]}. Exactly one question per word, in the given order.".into(),
      quiz_fill_blank_template: "Create a fill-in-the-blank quiz for these {count} German words with their meanings:\n{words}\nReturn JSON: {\"questions\": [{\"sentence\": string containing _____, \"correctAnswer\": word}]}. Exactly one sentence per word, in the given order; the blank replaces the word.".into(),
      quiz_matching_template: "Create a matching quiz for these {count} German words with their meanings:\n{words}\nReturn JSON: {\"words\": [string], \"definitions\": [string], \"matches\": [{\"word\": string, \"definition\": string}]}. Use every word exactly once.".into(),
      definition_system: "You are a concise German-English dictionary. Output ONLY the English meaning, no examples and no extra notes.".into(),
      definition_user_template: "Give the English meaning of the German word '{word}'. Answer with the meaning only, at most one short line.".into(),
      definition_context_suffix: "\nThe word appeared in this context: {context}".into(),
      paragraph_system: "You write short German practice paragraphs for language learners. Output ONLY the paragraph text.".into(),
      paragraph_user_template: "Write one German practice paragraph of 4-6 sentences at CEFR level {level}. Use vocabulary and grammar typical for that level.".into(),
      paragraph_topic_suffix: "\nThe paragraph should be about: {topic}".into(),
    }
  }
}

/// Attempt to load `EngineConfig` from ENGINE_CONFIG_PATH. On any
/// parsing/IO error, returns None and the engine runs with defaults.
pub fn load_engine_config_from_env() -> Option<EngineConfig> {
  let path = std::env::var("ENGINE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<EngineConfig>(&s) {
      Ok(cfg) => {
        info!(target: "wordpath_core", %path, "Loaded engine config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "wordpath_core", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "wordpath_core", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn config_parses_with_partial_prompts_absent() {
    let cfg: EngineConfig = toml::from_str(
      r#"
        [[overrides]]
        word = "Igel"
        definition = "hedgehog"

        [[paragraphs]]
        level = "B1"
        topic = "sport"
        text = "Am Wochenende spiele ich Fußball im Verein."
      "#,
    )
    .expect("config");
    assert_eq!(cfg.overrides.len(), 1);
    assert_eq!(cfg.paragraphs[0].level, "B1");
    // prompts fall back wholesale to defaults when the table is absent
    assert!(cfg.prompts.quiz_system.contains("JSON"));
  }
}
