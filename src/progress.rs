//! Progression/scoring engine: converts aggregated learning activity into
//! a level, level name, and percentage toward the next level.
//!
//! Pure and deterministic: no I/O, no failure modes. Missing/zero counts
//! yield level 1.

use tracing::instrument;

use crate::domain::{ActivityCounts, ProgressResult, ProgressStats};

/// One rung of the progression ladder.
pub struct Level {
  pub threshold: u32,
  pub name: &'static str,
}

/// The full ladder: 34 ascending point thresholds, each with a unique
/// display name. Process-wide constant, never user data.
pub static LEVELS: &[Level] = &[
  Level { threshold: 1, name: "Newcomer" },
  Level { threshold: 50, name: "Word Collector" },
  Level { threshold: 100, name: "Phrase Finder" },
  Level { threshold: 150, name: "Eager Student" },
  Level { threshold: 200, name: "Vocabulary Scout" },
  Level { threshold: 250, name: "Sentence Builder" },
  Level { threshold: 350, name: "Grammar Apprentice" },
  Level { threshold: 450, name: "Diligent Learner" },
  Level { threshold: 600, name: "Paragraph Reader" },
  Level { threshold: 750, name: "Quiz Taker" },
  Level { threshold: 900, name: "Word Wrangler" },
  Level { threshold: 1100, name: "Language Explorer" },
  Level { threshold: 1300, name: "Phrase Juggler" },
  Level { threshold: 1500, name: "Confident Speaker" },
  Level { threshold: 1750, name: "Story Reader" },
  Level { threshold: 2000, name: "Idiom Hunter" },
  Level { threshold: 2250, name: "Conversation Starter" },
  Level { threshold: 2500, name: "Grammar Adept" },
  Level { threshold: 2800, name: "Vocabulary Veteran" },
  Level { threshold: 3100, name: "Fluent Reader" },
  Level { threshold: 3400, name: "Language Artisan" },
  Level { threshold: 3700, name: "Word Alchemist" },
  Level { threshold: 4100, name: "Quiz Champion" },
  Level { threshold: 4500, name: "Paragraph Devourer" },
  Level { threshold: 4900, name: "Language Strategist" },
  Level { threshold: 5300, name: "Eloquent Speaker" },
  Level { threshold: 5800, name: "Grammar Virtuoso" },
  Level { threshold: 6300, name: "Lexicon Master" },
  Level { threshold: 6800, name: "Language Sage" },
  Level { threshold: 7400, name: "Polyglot Candidate" },
  Level { threshold: 8000, name: "Near-Native" },
  Level { threshold: 8600, name: "Language Virtuoso" },
  Level { threshold: 9300, name: "Word Legend" },
  Level { threshold: 9999, name: "Grand Polyglot" },
];

/// Raw points for the given activity counts.
///
/// words: 1/2/3 per beginner/intermediate/advanced word;
/// quizzes: 5 per attempt plus floor(avg% / 10 * 2);
/// paragraphs: 5/10/15/20 per A2/B1/B2/C1 paragraph read.
pub fn points_for(counts: &ActivityCounts) -> u32 {
  word_points(counts) + quiz_points(counts) + paragraph_points(counts)
}

fn word_points(counts: &ActivityCounts) -> u32 {
  let w = &counts.words_by_difficulty;
  w.beginner + 2 * w.intermediate + 3 * w.advanced
}

fn quiz_points(counts: &ActivityCounts) -> u32 {
  let avg = counts.quiz_avg_score_percent.max(0.0);
  5 * counts.quiz_attempts + ((avg as f64 / 10.0) * 2.0).floor() as u32
}

fn paragraph_points(counts: &ActivityCounts) -> u32 {
  let p = &counts.paragraphs_by_level;
  5 * p.a2 + 10 * p.b1 + 15 * p.b2 + 20 * p.c1
}

/// Index of the rung for a point total: the last threshold not exceeding
/// `points`. Zero points still lands on the first rung.
fn level_index_for(points: u32) -> usize {
  LEVELS
    .iter()
    .rposition(|l| l.threshold <= points)
    .unwrap_or(0)
}

/// Display name for a rung, defaulting to "Level {n}" on a table miss.
/// Every rung has a name, but the lookup stays defensive.
fn level_name(idx: usize) -> String {
  match LEVELS.get(idx) {
    Some(l) => l.name.to_string(),
    None => format!("Level {}", idx + 1),
  }
}

/// Compute the gamified progress for one user's activity counts.
///
/// The current rung is the last threshold <= points; the progress bar
/// runs from the preceding threshold (0 at the first rung) to the next
/// one. At the top rung the engine plateaus: next == current, percent 0.
#[instrument(level = "debug", skip_all, fields(points = tracing::field::Empty))]
pub fn compute_progress(counts: &ActivityCounts) -> ProgressResult {
  let points = points_for(counts);
  tracing::Span::current().record("points", points);

  let idx = level_index_for(points);
  let at_top = idx + 1 >= LEVELS.len();
  let next_idx = if at_top { idx } else { idx + 1 };

  let prev_threshold = if idx == 0 { 0 } else { LEVELS[idx - 1].threshold };
  let next_threshold = LEVELS[next_idx].threshold;

  let percent_to_next = if at_top || next_threshold <= prev_threshold {
    0
  } else {
    let span = (next_threshold - prev_threshold) as f64;
    let gained = points.saturating_sub(prev_threshold) as f64;
    ((gained / span * 100.0).round() as u32).min(100)
  };

  ProgressResult {
    level: idx as u32 + 1,
    level_name: level_name(idx),
    points,
    next_level: next_idx as u32 + 1,
    next_level_name: level_name(next_idx),
    next_level_points: next_threshold,
    current_level_points: prev_threshold,
    percent_to_next,
    stats: ProgressStats {
      total_words: counts.words_by_difficulty.total(),
      words_by_difficulty: counts.words_by_difficulty,
      quiz_attempts: counts.quiz_attempts,
      quiz_avg_score_percent: counts.quiz_avg_score_percent,
      paragraphs_read: counts.paragraphs_by_level.total(),
      word_points: word_points(counts),
      quiz_points: quiz_points(counts),
      paragraph_points: paragraph_points(counts),
    },
  }
}

/// Average quiz score as a percentage, assuming ten questions per attempt.
///
/// The original system never recorded per-attempt question totals, so the
/// average is estimated from `attempts * 10` assumed questions. Callers
/// that do track true totals should compute the average themselves and
/// fill `ActivityCounts.quiz_avg_score_percent` directly.
pub fn estimate_avg_score_percent(total_correct: u32, attempts: u32) -> f32 {
  if attempts == 0 {
    return 0.0;
  }
  let assumed_questions = (attempts * 10) as f32;
  (total_correct as f32 / assumed_questions * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ParagraphCounts, WordCounts};

  fn counts(beginner: u32, intermediate: u32, advanced: u32) -> ActivityCounts {
    ActivityCounts {
      words_by_difficulty: WordCounts { beginner, intermediate, advanced },
      ..Default::default()
    }
  }

  #[test]
  fn table_is_ascending_with_unique_names() {
    assert_eq!(LEVELS.len(), 34);
    assert_eq!(LEVELS[0].threshold, 1);
    assert_eq!(LEVELS[LEVELS.len() - 1].threshold, 9999);
    for pair in LEVELS.windows(2) {
      assert!(pair[0].threshold < pair[1].threshold);
    }
    let names: std::collections::HashSet<&str> = LEVELS.iter().map(|l| l.name).collect();
    assert_eq!(names.len(), LEVELS.len());
  }

  #[test]
  fn zero_counts_yield_level_one() {
    let res = compute_progress(&ActivityCounts::default());
    assert_eq!(res.points, 0);
    assert_eq!(res.level, 1);
    assert_eq!(res.level_name, "Newcomer");
    assert_eq!(res.current_level_points, 0);
    assert_eq!(res.percent_to_next, 0);
  }

  #[test]
  fn ten_beginner_words_are_twenty_percent_to_level_two() {
    let res = compute_progress(&counts(10, 0, 0));
    assert_eq!(res.points, 10);
    assert_eq!(res.level, 1);
    assert_eq!(res.current_level_points, 0);
    assert_eq!(res.next_level_points, 50);
    assert_eq!(res.percent_to_next, 20);
  }

  #[test]
  fn point_formula_weights_every_source() {
    let c = ActivityCounts {
      words_by_difficulty: WordCounts { beginner: 3, intermediate: 2, advanced: 1 },
      quiz_attempts: 2,
      quiz_avg_score_percent: 85.0,
      paragraphs_by_level: ParagraphCounts { a2: 1, b1: 1, b2: 1, c1: 1 },
    };
    // words 3+4+3=10, quizzes 10+floor(17)=27, paragraphs 5+10+15+20=50
    assert_eq!(points_for(&c), 87);
    let stats = compute_progress(&c).stats;
    assert_eq!(stats.word_points, 10);
    assert_eq!(stats.quiz_points, 27);
    assert_eq!(stats.paragraph_points, 50);
  }

  #[test]
  fn quiz_average_floors_before_adding() {
    let mut c = ActivityCounts::default();
    c.quiz_avg_score_percent = 100.0;
    assert_eq!(points_for(&c), 20);
    c.quiz_avg_score_percent = 94.9;
    assert_eq!(points_for(&c), 18); // floor(18.98)
    c.quiz_avg_score_percent = -5.0;
    assert_eq!(points_for(&c), 0);
  }

  #[test]
  fn points_and_level_grow_monotonically() {
    let mut prev_points = 0;
    let mut prev_level = 0;
    for beginner in [0u32, 1, 10, 60, 200, 1000, 5000, 20000] {
      let res = compute_progress(&counts(beginner, 0, 0));
      assert!(res.points >= prev_points);
      assert!(res.level >= prev_level);
      prev_points = res.points;
      prev_level = res.level;
    }
  }

  #[test]
  fn every_threshold_maps_back_to_its_own_level() {
    for (i, l) in LEVELS.iter().enumerate() {
      assert_eq!(level_index_for(l.threshold), i);
      if l.threshold > 1 {
        assert_eq!(level_index_for(l.threshold - 1), i - 1);
      }
    }
  }

  #[test]
  fn top_level_plateaus_without_division() {
    let res = compute_progress(&counts(20000, 0, 0));
    assert_eq!(res.level, 34);
    assert_eq!(res.next_level, 34);
    assert_eq!(res.next_level_name, res.level_name);
    assert_eq!(res.next_level_points, 9999);
    assert_eq!(res.current_level_points, 9300);
    // The engine plateaus instead of failing: percentage pinned to 0.
    assert_eq!(res.percent_to_next, 0);
  }

  #[test]
  fn percent_never_exceeds_one_hundred() {
    for beginner in 0..2000u32 {
      let res = compute_progress(&counts(beginner, 0, 0));
      assert!(res.percent_to_next <= 100);
      assert!(res.current_level_points <= res.points);
    }
  }

  #[test]
  fn compute_progress_is_idempotent() {
    let c = ActivityCounts {
      words_by_difficulty: WordCounts { beginner: 7, intermediate: 3, advanced: 2 },
      quiz_attempts: 4,
      quiz_avg_score_percent: 62.5,
      paragraphs_by_level: ParagraphCounts { a2: 2, b1: 0, b2: 1, c1: 0 },
    };
    assert_eq!(compute_progress(&c), compute_progress(&c));
  }

  #[test]
  fn estimated_average_assumes_ten_questions_per_attempt() {
    assert_eq!(estimate_avg_score_percent(0, 0), 0.0);
    assert_eq!(estimate_avg_score_percent(15, 2), 75.0);
    // more correct answers than assumed questions clamps at 100
    assert_eq!(estimate_avg_score_percent(45, 2), 100.0);
  }
}
