//! Domain models exchanged with the caller: vocabulary words, quiz specs,
//! attempt results, activity counts, and progress results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The unit exchanged between vocabulary lookup, quiz generation, and
/// saved-word persistence. The persistence side is owned by the caller;
/// this crate only reads it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabularyWord {
  pub word: String,
  pub definition: String,
}

/// Word difficulty bucket, derived from character length of the word.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

/// Bucket a word by its character length: <=5 beginner, 6..=10
/// intermediate, >10 advanced. The caller aggregates these into
/// [`ActivityCounts`] when it walks the user's saved words.
pub fn difficulty_for_word(word: &str) -> Difficulty {
  match word.chars().count() {
    0..=5 => Difficulty::Beginner,
    6..=10 => Difficulty::Intermediate,
    _ => Difficulty::Advanced,
  }
}

/// CEFR level of a practice paragraph.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CefrLevel {
  A2,
  B1,
  B2,
  C1,
}

impl CefrLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      CefrLevel::A2 => "A2",
      CefrLevel::B1 => "B1",
      CefrLevel::B2 => "B2",
      CefrLevel::C1 => "C1",
    }
  }
}

impl std::fmt::Display for CefrLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for CefrLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "A2" => Ok(CefrLevel::A2),
      "B1" => Ok(CefrLevel::B1),
      "B2" => Ok(CefrLevel::B2),
      "C1" => Ok(CefrLevel::C1),
      other => Err(format!("Unknown CEFR level: {}", other)),
    }
  }
}

/// What kind of quiz is presented to the user?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
  MultipleChoice,
  FillBlank,
  Matching,
}

/// Where did the quiz content come from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuizSource {
  Generated, // parsed from a model completion
  Fallback,  // built deterministically from the word list
}

/// One quiz question. Multiple-choice questions fill `question` +
/// `options`; fill-blank questions fill `sentence` and leave `options`
/// empty. `correct_answer` is an option letter for multiple choice and
/// the target word for fill-blank.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub sentence: String,
  #[serde(default)]
  pub options: BTreeMap<String, String>,
  #[serde(rename = "correctAnswer")]
  pub correct_answer: String,
}

/// A single word/definition pairing of a matching quiz.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchPair {
  pub word: String,
  pub definition: String,
}

/// Payload of a matching quiz: parallel word/definition lists plus the
/// authoritative pairings. Invariant: `words.len() == definitions.len()`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchingPayload {
  pub words: Vec<String>,
  pub definitions: Vec<String>,
  pub matches: Vec<MatchPair>,
}

/// Stored quiz specification. Created once by the quiz pipeline and
/// immutable afterwards, except for the display title.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizSpec {
  pub id: String,
  #[serde(rename = "type")]
  pub quiz_type: QuizType,
  pub source: QuizSource,
  pub title: String,

  // multiple_choice / fill_blank
  #[serde(default)]
  pub questions: Vec<QuizQuestion>,
  // matching
  #[serde(default)]
  pub matching: Option<MatchingPayload>,
}

impl QuizSpec {
  /// The only mutation a created quiz supports.
  pub fn set_title(&mut self, title: impl Into<String>) {
    self.title = title.into();
  }

  /// Number of scoreable positions in this quiz.
  pub fn total_questions(&self) -> usize {
    match self.quiz_type {
      QuizType::Matching => self.matching.as_ref().map(|m| m.matches.len()).unwrap_or(0),
      _ => self.questions.len(),
    }
  }

  /// Expected answer at position `i`, if the quiz has one there.
  /// Multiple choice: the option letter. Fill-blank: the word.
  /// Matching: the definition paired with the i-th match entry.
  pub fn expected_answer(&self, i: usize) -> Option<&str> {
    match self.quiz_type {
      QuizType::Matching => self
        .matching
        .as_ref()
        .and_then(|m| m.matches.get(i))
        .map(|p| p.definition.as_str()),
      _ => self.questions.get(i).map(|q| q.correct_answer.as_str()),
    }
  }
}

/// Outcome of scoring one submitted attempt. Each attempt is an
/// independent immutable record; the caller owns its lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptResult {
  pub score: u32,
  pub total_questions: u32,
  pub per_question_correct: Vec<bool>,
}

/// Saved words bucketed by difficulty.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordCounts {
  pub beginner: u32,
  pub intermediate: u32,
  pub advanced: u32,
}

impl WordCounts {
  pub fn total(&self) -> u32 {
    self.beginner + self.intermediate + self.advanced
  }
}

/// Paragraphs read, bucketed by CEFR level.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub struct ParagraphCounts {
  pub a2: u32,
  pub b1: u32,
  pub b2: u32,
  pub c1: u32,
}

impl ParagraphCounts {
  pub fn total(&self) -> u32 {
    self.a2 + self.b1 + self.b2 + self.c1
  }
}

/// Aggregated learning activity, recomputed fresh on every progress
/// request by the caller. Never cached or mutated in place.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
  pub words_by_difficulty: WordCounts,
  pub quiz_attempts: u32,
  pub quiz_avg_score_percent: f32,
  pub paragraphs_by_level: ParagraphCounts,
}

/// Point subtotals surfaced alongside the level, for the profile screen.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
  pub total_words: u32,
  pub words_by_difficulty: WordCounts,
  pub quiz_attempts: u32,
  pub quiz_avg_score_percent: f32,
  pub paragraphs_read: u32,
  pub word_points: u32,
  pub quiz_points: u32,
  pub paragraph_points: u32,
}

/// Gamified progression result.
///
/// `current_level_points` is the base of the current progress bar (the
/// threshold preceding the user's level, 0 at level 1) and
/// `next_level_points` its end, so `current_level_points <= points` and
/// `percent_to_next` stays in 0..=100.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResult {
  pub level: u32,
  pub level_name: String,
  pub points: u32,
  pub next_level: u32,
  pub next_level_name: String,
  pub next_level_points: u32,
  pub current_level_points: u32,
  pub percent_to_next: u32,
  pub stats: ProgressStats,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn difficulty_buckets_by_char_length() {
    assert_eq!(difficulty_for_word("Hund"), Difficulty::Beginner);
    assert_eq!(difficulty_for_word("Apfel"), Difficulty::Beginner);
    assert_eq!(difficulty_for_word("Fenster"), Difficulty::Intermediate);
    assert_eq!(difficulty_for_word("Überraschung"), Difficulty::Advanced);
    // chars, not bytes: umlauts don't push a short word up a bucket
    assert_eq!(difficulty_for_word("Müsli"), Difficulty::Beginner);
  }

  #[test]
  fn cefr_level_round_trips_from_str() {
    for lvl in [CefrLevel::A2, CefrLevel::B1, CefrLevel::B2, CefrLevel::C1] {
      assert_eq!(lvl.as_str().parse::<CefrLevel>().unwrap(), lvl);
    }
    assert!("D7".parse::<CefrLevel>().is_err());
  }

  #[test]
  fn quiz_spec_title_is_the_only_mutation() {
    let mut spec = QuizSpec {
      id: "q1".into(),
      quiz_type: QuizType::FillBlank,
      source: QuizSource::Fallback,
      title: "Untitled".into(),
      questions: vec![],
      matching: None,
    };
    spec.set_title("Week 3 review");
    assert_eq!(spec.title, "Week 3 review");
  }
}
