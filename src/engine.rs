//! Engine facade: prompts, optional generation client, and the merged
//! lookup banks.
//!
//! This module owns:
//!   - the prompts struct (from TOML or defaults)
//!   - the optional OpenAI-compatible client
//!   - config-supplied bank extensions (definition overrides, paragraphs)
//!
//! It is the single boundary where generation failures are substituted
//! with fallback content; the pipelines in `quiz`, `lexicon`, and
//! `paragraphs` do the work. There is no shared mutable state: every
//! operation computes independently from its inputs, so one engine value
//! can be cloned and used from any number of concurrent requests.

use std::collections::HashMap;

use tracing::{error, info, instrument};

use crate::banks;
use crate::config::{load_engine_config_from_env, EngineConfig, Prompts};
use crate::domain::{
    ActivityCounts, CefrLevel, ProgressResult, QuizAttemptResult, QuizSpec, QuizType,
    VocabularyWord,
};
use crate::error::EngineError;
use crate::openai::OpenAi;
use crate::{lexicon, paragraphs, progress, quiz};

#[derive(Clone)]
pub struct Engine {
    pub openai: Option<OpenAi>,
    pub prompts: Prompts,
    /// Config-supplied definition overrides, lowercased word -> definition.
    /// Consulted before the built-in table.
    overrides: HashMap<String, String>,
    /// Config-supplied fallback paragraphs: (level, lowercased topic, text).
    extra_paragraphs: Vec<(CefrLevel, String, String)>,
}

impl Engine {
    /// Build the engine from env: load TOML config if provided, merge bank
    /// extensions, init the generation client if an API key is present.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let cfg = load_engine_config_from_env().unwrap_or_default();
        Self::new(OpenAi::from_env(), cfg)
    }

    /// Build the engine from explicit parts. `openai: None` runs every
    /// pipeline on its deterministic fallback path.
    pub fn new(openai: Option<OpenAi>, cfg: EngineConfig) -> Self {
        let mut overrides = HashMap::new();
        for o in &cfg.overrides {
            let key = o.word.trim().to_lowercase();
            if key.is_empty() || o.definition.trim().is_empty() {
                error!(target: "wordpath_core", word = %o.word, "Skipping override entry: empty word or definition");
                continue;
            }
            overrides.insert(key, o.definition.clone());
        }

        let mut extra_paragraphs = Vec::new();
        for p in &cfg.paragraphs {
            match p.level.parse::<CefrLevel>() {
                Ok(level) => {
                    extra_paragraphs.push((level, p.topic.trim().to_lowercase(), p.text.clone()))
                }
                Err(e) => {
                    error!(target: "wordpath_core", level = %p.level, error = %e, "Skipping paragraph entry: bad level");
                }
            }
        }

        if let Some(oa) = &openai {
            info!(
                target: "wordpath_core",
                base_url = %oa.base_url,
                fast_model = %oa.fast_model,
                strong_model = %oa.strong_model,
                timeout = ?oa.timeout,
                "Text generation enabled."
            );
        } else {
            info!(target: "wordpath_core", "Text generation disabled (no OPENAI_API_KEY). Serving fallback content.");
        }
        info!(
            target: "wordpath_core",
            bank_version = banks::BANK_VERSION,
            config_overrides = overrides.len(),
            config_paragraphs = extra_paragraphs.len(),
            "Engine banks ready"
        );

        Self { openai, prompts: cfg.prompts, overrides, extra_paragraphs }
    }

    /// Definition override for a word, if any. Config entries take
    /// precedence over the built-in table; both match case-insensitively.
    pub fn override_for(&self, word: &str) -> Option<String> {
        let key = word.trim().to_lowercase();
        if let Some(def) = self.overrides.get(&key) {
            return Some(def.clone());
        }
        banks::builtin_override(&key).map(|d| d.to_string())
    }

    /// Config-supplied fallback paragraph for a level/topic, if any.
    pub(crate) fn extra_paragraph(&self, level: CefrLevel, topic: Option<&str>) -> Option<String> {
        let wanted = topic.map(|t| t.trim().to_lowercase()).unwrap_or_default();
        self.extra_paragraphs
            .iter()
            .find(|(l, t, _)| *l == level && *t == wanted)
            .map(|(_, _, text)| text.clone())
    }

    // --- Core operations (spec'd in-process interface) ---

    pub async fn generate_quiz(
        &self,
        words: &[VocabularyWord],
        quiz_type: QuizType,
    ) -> Result<QuizSpec, EngineError> {
        quiz::generate_quiz(self, words, quiz_type).await
    }

    pub fn score_attempt(&self, spec: &QuizSpec, submitted: &[String]) -> QuizAttemptResult {
        quiz::score_attempt(spec, submitted)
    }

    pub async fn regenerate_definition(&self, word: &str, context: Option<&str>) -> String {
        lexicon::regenerate_definition(self, word, context).await
    }

    pub async fn generate_paragraph(&self, level: CefrLevel, topic: Option<&str>) -> String {
        paragraphs::generate_paragraph(self, level, topic).await
    }

    pub fn compute_progress(&self, counts: &ActivityCounts) -> ProgressResult {
        progress::compute_progress(counts)
    }
}
