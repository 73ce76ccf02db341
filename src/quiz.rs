//! Quiz generation and scoring.
//!
//! Flow:
//! 1) Build a strict-JSON prompt from the selected words.
//! 2) Call the text-generation backend (strong model).
//! 3) Extract the first balanced `{...}` region and normalize the payload
//!    into the stable quiz schema, validating the count invariants.
//! 4) On any call or normalization failure, build the deterministic
//!    fallback quiz from the word list instead. The caller always gets a
//!    usable quiz; only an empty selection is rejected.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::banks::PLACEHOLDER_DISTRACTORS;
use crate::config::Prompts;
use crate::domain::{
  MatchPair, MatchingPayload, QuizAttemptResult, QuizQuestion, QuizSource, QuizSpec, QuizType,
  VocabularyWord,
};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::openai::GenOptions;
use crate::util::{extract_json_object, fill_template, trunc_for_log};

const QUIZ_MAX_TOKENS: u32 = 1200;

/// Generate a quiz for the selected words.
///
/// Empty selections are rejected; everything else succeeds, falling back
/// to locally built content when generation or parsing fails.
#[instrument(level = "info", skip(engine, words), fields(word_count = words.len(), ?quiz_type))]
pub async fn generate_quiz(
  engine: &Engine,
  words: &[VocabularyWord],
  quiz_type: QuizType,
) -> Result<QuizSpec, EngineError> {
  if words.is_empty() {
    return Err(EngineError::EmptySelection);
  }

  if let Some(oa) = &engine.openai {
    let user = build_quiz_prompt(&engine.prompts, words, quiz_type);
    let opts = GenOptions { max_tokens: Some(QUIZ_MAX_TOKENS), temperature: 0.7 };
    match oa.generate(&oa.strong_model, &engine.prompts.quiz_system, &user, &opts).await {
      Ok(text) => match parse_quiz_response(&text, words, quiz_type) {
        Ok(spec) => {
          info!(target: "quiz", id = %spec.id, "Generated quiz accepted");
          return Ok(spec);
        }
        Err(e) => {
          warn!(target: "quiz", error = %e, raw = %trunc_for_log(&text, 160), "Unusable quiz payload; using fallback");
        }
      },
      Err(e) => {
        error!(target: "quiz", error = %e, "Generation failed; using fallback");
      }
    }
  }

  Ok(fallback_quiz(words, quiz_type))
}

/// Score one submitted attempt against a stored quiz.
///
/// Positional, exact, case-sensitive comparison. The total is the quiz's
/// stored question count, so unanswered trailing indices simply never
/// match and extra submitted answers are ignored.
pub fn score_attempt(quiz: &QuizSpec, submitted: &[String]) -> QuizAttemptResult {
  let total = quiz.total_questions();
  let mut per_question_correct = Vec::with_capacity(total);
  let mut score = 0u32;

  for i in 0..total {
    let ok = match (quiz.expected_answer(i), submitted.get(i)) {
      (Some(expected), Some(got)) => expected == got.as_str(),
      _ => false,
    };
    if ok {
      score += 1;
    }
    per_question_correct.push(ok);
  }

  QuizAttemptResult { score, total_questions: total as u32, per_question_correct }
}

// -------- Prompt building --------

fn word_list_block(words: &[VocabularyWord]) -> String {
  words
    .iter()
    .map(|w| format!("- {} = {}", w.word, w.definition))
    .collect::<Vec<_>>()
    .join("\n")
}

fn build_quiz_prompt(prompts: &Prompts, words: &[VocabularyWord], quiz_type: QuizType) -> String {
  let tpl = match quiz_type {
    QuizType::MultipleChoice => &prompts.quiz_multiple_choice_template,
    QuizType::FillBlank => &prompts.quiz_fill_blank_template,
    QuizType::Matching => &prompts.quiz_matching_template,
  };
  fill_template(
    tpl,
    &[
      ("count", &words.len().to_string()),
      ("words", &word_list_block(words)),
    ],
  )
}

// -------- Parsing & normalization --------

/// Loose mirror of whatever the model returned; the aliases cover the
/// field spellings seen in the wild.
#[derive(Deserialize)]
struct RawQuiz {
  #[serde(default)]
  questions: Vec<RawQuestion>,
  #[serde(default)]
  words: Vec<String>,
  #[serde(default)]
  definitions: Vec<String>,
  #[serde(default)]
  matches: Vec<RawMatch>,
}

#[derive(Deserialize)]
struct RawQuestion {
  #[serde(default, alias = "prompt")]
  question: Option<String>,
  #[serde(default, alias = "text", alias = "cloze")]
  sentence: Option<String>,
  #[serde(default)]
  options: Option<RawOptions>,
  #[serde(default, alias = "correctAnswer", alias = "answer", alias = "correct")]
  correct_answer: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOptions {
  Map(BTreeMap<String, String>),
  List(Vec<String>),
}

#[derive(Deserialize)]
struct RawMatch {
  word: String,
  definition: String,
}

/// Parse a model completion into a QuizSpec, or explain why it can't be.
pub fn parse_quiz_response(
  text: &str,
  words: &[VocabularyWord],
  quiz_type: QuizType,
) -> Result<QuizSpec, String> {
  let candidate = match serde_json::from_str::<serde_json::Value>(text) {
    Ok(_) => text,
    Err(_) => extract_json_object(text).ok_or("no balanced JSON object in completion")?,
  };
  let raw: RawQuiz =
    serde_json::from_str(candidate).map_err(|e| format!("JSON parse error: {}", e))?;

  match quiz_type {
    QuizType::MultipleChoice => {
      let questions = normalize_choice_questions(words, raw.questions)?;
      Ok(new_spec(quiz_type, QuizSource::Generated, words.len(), questions, None))
    }
    QuizType::FillBlank => {
      let questions = normalize_cloze_questions(words, raw.questions)?;
      Ok(new_spec(quiz_type, QuizSource::Generated, words.len(), questions, None))
    }
    QuizType::Matching => {
      let matching = normalize_matching(raw)?;
      Ok(new_spec(quiz_type, QuizSource::Generated, words.len(), vec![], Some(matching)))
    }
  }
}

fn normalize_choice_questions(
  words: &[VocabularyWord],
  raw: Vec<RawQuestion>,
) -> Result<Vec<QuizQuestion>, String> {
  if raw.len() != words.len() {
    return Err(format!("expected {} questions, got {}", words.len(), raw.len()));
  }

  let mut out = Vec::with_capacity(raw.len());
  for (i, rq) in raw.into_iter().enumerate() {
    let question = rq
      .question
      .or(rq.sentence)
      .filter(|q| !q.trim().is_empty())
      .ok_or(format!("question {} has no text", i))?;

    let options = match rq.options {
      Some(RawOptions::Map(m)) => m
        .into_iter()
        .map(|(k, v)| (k.trim().to_uppercase(), v))
        .collect::<BTreeMap<_, _>>(),
      Some(RawOptions::List(list)) => list
        .into_iter()
        .enumerate()
        .map(|(j, v)| (letter_for(j), v))
        .collect(),
      None => BTreeMap::new(),
    };
    if options.len() < 2 {
      return Err(format!("question {} has fewer than two options", i));
    }

    let raw_answer = rq
      .correct_answer
      .filter(|a| !a.trim().is_empty())
      .ok_or(format!("question {} has no correct answer", i))?;
    let correct_answer = resolve_answer_letter(&options, &raw_answer)
      .ok_or(format!("question {}: answer '{}' matches no option", i, raw_answer))?;

    out.push(QuizQuestion {
      question: question.trim().to_string(),
      sentence: String::new(),
      options,
      correct_answer,
    });
  }
  Ok(out)
}

/// Map a raw answer onto an option letter: either it already is one
/// (any case), or it is the text of exactly that option.
fn resolve_answer_letter(options: &BTreeMap<String, String>, raw: &str) -> Option<String> {
  let as_letter = raw.trim().to_uppercase();
  if options.contains_key(&as_letter) {
    return Some(as_letter);
  }
  let wanted = raw.trim().to_lowercase();
  options
    .iter()
    .find(|(_, v)| v.trim().to_lowercase() == wanted)
    .map(|(k, _)| k.clone())
}

fn normalize_cloze_questions(
  words: &[VocabularyWord],
  raw: Vec<RawQuestion>,
) -> Result<Vec<QuizQuestion>, String> {
  if raw.len() != words.len() {
    return Err(format!("expected {} sentences, got {}", words.len(), raw.len()));
  }

  let mut out = Vec::with_capacity(raw.len());
  for (i, rq) in raw.into_iter().enumerate() {
    let mut sentence = rq
      .sentence
      .or(rq.question)
      .filter(|s| !s.trim().is_empty())
      .ok_or(format!("sentence {} is missing", i))?
      .trim()
      .to_string();
    let answer = rq
      .correct_answer
      .filter(|a| !a.trim().is_empty())
      .ok_or(format!("sentence {} has no answer", i))?
      .trim()
      .to_string();

    // The blank must actually be blank: if the model wrote the word out,
    // cloze it ourselves; if neither blank nor word is present, reject.
    if !sentence.contains("___") {
      if sentence.contains(&answer) {
        sentence = sentence.replacen(&answer, "_____", 1);
      } else {
        return Err(format!("sentence {} has no blank and no answer word", i));
      }
    }

    out.push(QuizQuestion {
      question: String::new(),
      sentence,
      options: BTreeMap::new(),
      correct_answer: answer,
    });
  }
  Ok(out)
}

fn normalize_matching(raw: RawQuiz) -> Result<MatchingPayload, String> {
  if raw.words.is_empty() || raw.words.len() != raw.definitions.len() {
    return Err(format!(
      "matching arrays unbalanced: {} words vs {} definitions",
      raw.words.len(),
      raw.definitions.len()
    ));
  }

  // Keep the model's pairings only when they are complete; otherwise
  // rebuild them by position.
  let matches = if raw.matches.len() == raw.words.len() {
    raw.matches
      .into_iter()
      .map(|m| MatchPair { word: m.word, definition: m.definition })
      .collect()
  } else {
    raw
      .words
      .iter()
      .zip(raw.definitions.iter())
      .map(|(w, d)| MatchPair { word: w.clone(), definition: d.clone() })
      .collect()
  };

  Ok(MatchingPayload { words: raw.words, definitions: raw.definitions, matches })
}

// -------- Deterministic fallback --------

/// Build a quiz locally, with no external dependency. Used whenever
/// generation fails or returns malformed data.
pub fn fallback_quiz(words: &[VocabularyWord], quiz_type: QuizType) -> QuizSpec {
  match quiz_type {
    QuizType::MultipleChoice => {
      let questions = words
        .iter()
        .map(|w| {
          let mut options = BTreeMap::new();
          options.insert("A".to_string(), w.definition.clone());
          for (i, distractor) in PLACEHOLDER_DISTRACTORS.iter().take(3).enumerate() {
            options.insert(letter_for(i + 1), (*distractor).to_string());
          }
          QuizQuestion {
            question: format!("What does '{}' mean?", w.word),
            sentence: String::new(),
            options,
            correct_answer: "A".to_string(),
          }
        })
        .collect();
      new_spec(quiz_type, QuizSource::Fallback, words.len(), questions, None)
    }
    QuizType::FillBlank => {
      let questions = words
        .iter()
        .map(|w| QuizQuestion {
          question: String::new(),
          sentence: format!("The German word that means \"{}\" is _____.", w.definition),
          options: BTreeMap::new(),
          correct_answer: w.word.clone(),
        })
        .collect();
      new_spec(quiz_type, QuizSource::Fallback, words.len(), questions, None)
    }
    QuizType::Matching => {
      let matching = MatchingPayload {
        words: words.iter().map(|w| w.word.clone()).collect(),
        definitions: words.iter().map(|w| w.definition.clone()).collect(),
        matches: words
          .iter()
          .map(|w| MatchPair { word: w.word.clone(), definition: w.definition.clone() })
          .collect(),
      };
      new_spec(quiz_type, QuizSource::Fallback, words.len(), vec![], Some(matching))
    }
  }
}

fn new_spec(
  quiz_type: QuizType,
  source: QuizSource,
  word_count: usize,
  questions: Vec<QuizQuestion>,
  matching: Option<MatchingPayload>,
) -> QuizSpec {
  QuizSpec {
    id: Uuid::new_v4().to_string(),
    quiz_type,
    source,
    title: default_title(quiz_type, word_count),
    questions,
    matching,
  }
}

fn default_title(quiz_type: QuizType, word_count: usize) -> String {
  let kind = match quiz_type {
    QuizType::MultipleChoice => "Multiple choice",
    QuizType::FillBlank => "Fill in the blank",
    QuizType::Matching => "Matching",
  };
  format!("{} · {} words", kind, word_count)
}

fn letter_for(i: usize) -> String {
  ((b'A' + (i as u8 % 26)) as char).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::EngineConfig;

  fn words(n: usize) -> Vec<VocabularyWord> {
    let bank = [
      ("Herbst", "autumn"),
      ("Fenster", "window"),
      ("Schmetterling", "butterfly"),
      ("Brot", "bread"),
    ];
    bank[..n]
      .iter()
      .map(|(w, d)| VocabularyWord { word: (*w).into(), definition: (*d).into() })
      .collect()
  }

  fn offline_engine() -> Engine {
    Engine::new(None, EngineConfig::default())
  }

  #[tokio::test]
  async fn empty_selection_is_rejected() {
    let err = generate_quiz(&offline_engine(), &[], QuizType::Matching).await.unwrap_err();
    assert_eq!(err, EngineError::EmptySelection);
  }

  #[tokio::test]
  async fn offline_fill_blank_falls_back_with_one_cloze_per_word() {
    let ws = words(3);
    let quiz = generate_quiz(&offline_engine(), &ws, QuizType::FillBlank).await.unwrap();
    assert_eq!(quiz.source, QuizSource::Fallback);
    assert_eq!(quiz.questions.len(), 3);
    for (q, w) in quiz.questions.iter().zip(&ws) {
      assert_eq!(q.correct_answer, w.word);
      assert!(q.sentence.contains("_____"));
    }
  }

  #[tokio::test]
  async fn offline_multiple_choice_puts_the_definition_at_a() {
    let ws = words(2);
    let quiz = generate_quiz(&offline_engine(), &ws, QuizType::MultipleChoice).await.unwrap();
    assert_eq!(quiz.questions.len(), 2);
    for (q, w) in quiz.questions.iter().zip(&ws) {
      assert_eq!(q.correct_answer, "A");
      assert_eq!(q.options.len(), 4);
      assert_eq!(q.options.get("A"), Some(&w.definition));
    }
  }

  #[tokio::test]
  async fn offline_matching_preserves_input_order() {
    let ws = words(4);
    let quiz = generate_quiz(&offline_engine(), &ws, QuizType::Matching).await.unwrap();
    let m = quiz.matching.as_ref().expect("matching payload");
    assert_eq!(m.words.len(), m.definitions.len());
    assert_eq!(m.words[0], "Herbst");
    assert_eq!(m.matches[2].definition, "butterfly");
    assert_eq!(quiz.total_questions(), 4);
  }

  #[test]
  fn parse_accepts_prose_wrapped_json() {
    let ws = words(1);
    let text = "Here you go!\n```json\n{\"questions\":[{\"question\":\"What does 'Herbst' mean?\",\"options\":{\"a\":\"autumn\",\"b\":\"spring\"},\"correctAnswer\":\"a\"}]}\n```";
    let spec = parse_quiz_response(text, &ws, QuizType::MultipleChoice).expect("spec");
    assert_eq!(spec.source, QuizSource::Generated);
    assert_eq!(spec.questions[0].correct_answer, "A");
    assert_eq!(spec.questions[0].options.get("A"), Some(&"autumn".to_string()));
  }

  #[test]
  fn parse_assigns_letters_to_option_arrays_and_maps_answer_text() {
    let ws = words(1);
    let text = r#"{"questions":[{"prompt":"Pick the meaning of 'Herbst'","options":["spring","autumn","winter"],"answer":"autumn"}]}"#;
    let spec = parse_quiz_response(text, &ws, QuizType::MultipleChoice).expect("spec");
    let q = &spec.questions[0];
    assert_eq!(q.options.get("B"), Some(&"autumn".to_string()));
    assert_eq!(q.correct_answer, "B");
  }

  #[test]
  fn parse_rejects_question_count_mismatch() {
    let ws = words(2);
    let text = r#"{"questions":[{"question":"only one","options":{"A":"x","B":"y"},"correctAnswer":"A"}]}"#;
    assert!(parse_quiz_response(text, &ws, QuizType::MultipleChoice).is_err());
  }

  #[test]
  fn parse_clozes_sentences_that_spell_the_word_out() {
    let ws = words(1);
    let text = r#"{"questions":[{"sentence":"Im Herbst fallen die Blätter.","correctAnswer":"Herbst"}]}"#;
    let spec = parse_quiz_response(text, &ws, QuizType::FillBlank).expect("spec");
    assert_eq!(spec.questions[0].sentence, "Im _____ fallen die Blätter.");
  }

  #[test]
  fn parse_rebuilds_missing_matches_by_position() {
    let ws = words(2);
    let text = r#"{"words":["Herbst","Fenster"],"definitions":["autumn","window"]}"#;
    let spec = parse_quiz_response(text, &ws, QuizType::Matching).expect("spec");
    let m = spec.matching.unwrap();
    assert_eq!(m.matches.len(), 2);
    assert_eq!(m.matches[1].word, "Fenster");
    assert_eq!(m.matches[1].definition, "window");
  }

  #[test]
  fn parse_rejects_unbalanced_matching_arrays() {
    let ws = words(2);
    let text = r#"{"words":["Herbst","Fenster"],"definitions":["autumn"]}"#;
    assert!(parse_quiz_response(text, &ws, QuizType::Matching).is_err());
  }

  #[test]
  fn scoring_counts_exact_positional_matches_only() {
    let quiz = QuizSpec {
      id: "q".into(),
      quiz_type: QuizType::MultipleChoice,
      source: QuizSource::Fallback,
      title: String::new(),
      questions: vec![
        QuizQuestion {
          question: "q1".into(),
          sentence: String::new(),
          options: BTreeMap::new(),
          correct_answer: "A".into(),
        },
        QuizQuestion {
          question: "q2".into(),
          sentence: String::new(),
          options: BTreeMap::new(),
          correct_answer: "B".into(),
        },
      ],
      matching: None,
    };
    let res = score_attempt(&quiz, &["A".to_string(), "C".to_string()]);
    assert_eq!(res.score, 1);
    assert_eq!(res.total_questions, 2);
    assert_eq!(res.per_question_correct, vec![true, false]);
  }

  #[test]
  fn scoring_is_case_sensitive_and_ignores_extra_answers() {
    let quiz = fallback_quiz(&words(2), QuizType::FillBlank);
    // "herbst" != "Herbst": no credit
    let res = score_attempt(
      &quiz,
      &["herbst".to_string(), "Fenster".to_string(), "extra".to_string()],
    );
    assert_eq!(res.score, 1);
    assert_eq!(res.total_questions, 2);
  }

  #[test]
  fn scoring_leaves_unanswered_tail_incorrect() {
    let quiz = fallback_quiz(&words(3), QuizType::Matching);
    let res = score_attempt(&quiz, &["autumn".to_string()]);
    assert_eq!(res.score, 1);
    assert_eq!(res.total_questions, 3);
    assert_eq!(res.per_question_correct, vec![true, false, false]);
  }
}
