//! Static lookup data backing the deterministic fallback paths.
//!
//! These tables are data, not control flow: the pipelines consult them
//! through the small lookup functions at the bottom, so the banks can grow
//! (or be extended via TOML config) without touching pipeline logic.

use crate::domain::CefrLevel;

pub const BANK_VERSION: &str = "fallback_banks.de.v1";

/// Known-problematic words whose generated definitions kept coming back
/// wrong (mostly German/English false friends). A hit here short-circuits
/// generation entirely; matching is case-insensitive.
pub const DEFINITION_OVERRIDES: &[(&str, &str)] = &[
  ("herbst", "autumn"),
  ("gift", "poison"),
  ("see", "lake"),
  ("brief", "letter"),
  ("rat", "advice"),
  ("bald", "soon"),
  ("fast", "almost"),
  ("art", "kind, type"),
  ("chef", "boss"),
  ("handy", "mobile phone"),
  ("also", "so, therefore"),
  ("bekommen", "to receive"),
  ("spenden", "to donate"),
  ("mist", "dung; darn (exclamation)"),
  ("brav", "well-behaved"),
];

/// Distractor texts for fallback multiple-choice questions. The correct
/// definition always sits at option A; these fill B..D.
pub const PLACEHOLDER_DISTRACTORS: &[&str] = &[
  "a type of food",
  "a place in a city",
  "an action done every day",
];

pub struct ParagraphSeed {
  pub level: CefrLevel,
  pub topic: &'static str,
  pub text: &'static str,
}

/// Built-in practice paragraphs served when generation is unavailable.
/// One default per level (topic "") plus a few common topics.
pub const FALLBACK_PARAGRAPHS: &[ParagraphSeed] = &[
  ParagraphSeed {
    level: CefrLevel::A2,
    topic: "",
    text: "Ich heiße Lena und wohne in Leipzig. Jeden Morgen trinke ich \
           Kaffee und esse ein Brötchen. Danach fahre ich mit dem Fahrrad \
           zur Arbeit. Am Abend koche ich gern und sehe ein bisschen fern.",
  },
  ParagraphSeed {
    level: CefrLevel::A2,
    topic: "reisen",
    text: "Im Sommer fahre ich mit meiner Familie ans Meer. Wir nehmen den \
           Zug, weil das Auto zu langsam ist. Am Strand schwimmen wir und \
           essen Eis. Abends machen wir einen Spaziergang am Wasser.",
  },
  ParagraphSeed {
    level: CefrLevel::A2,
    topic: "essen",
    text: "Heute gehe ich auf den Markt. Ich kaufe Tomaten, Brot und Käse. \
           Der Käse aus der Region schmeckt sehr gut. Zu Hause mache ich \
           daraus ein einfaches Abendessen für meine Freunde.",
  },
  ParagraphSeed {
    level: CefrLevel::B1,
    topic: "",
    text: "Letzte Woche habe ich angefangen, jeden Tag zwanzig Minuten \
           Deutsch zu lernen. Zuerst war es schwierig, eine feste Zeit zu \
           finden, aber inzwischen gehört das Lernen zu meinem Alltag. Wenn \
           ich ein neues Wort höre, schreibe ich es sofort auf. So wächst \
           mein Wortschatz langsam, aber sicher.",
  },
  ParagraphSeed {
    level: CefrLevel::B1,
    topic: "arbeit",
    text: "Seit zwei Monaten arbeite ich in einem kleinen Büro in der \
           Innenstadt. Meine Kollegen sind freundlich und helfen mir, wenn \
           ich etwas nicht verstehe. Am Anfang waren die Besprechungen auf \
           Deutsch anstrengend, doch jetzt kann ich fast allem folgen. Nur \
           beim Telefonieren muss ich mich noch konzentrieren.",
  },
  ParagraphSeed {
    level: CefrLevel::B2,
    topic: "",
    text: "Obwohl viele Menschen behaupten, keine Zeit zum Lesen zu haben, \
           verbringen sie täglich Stunden mit ihrem Handy. Dabei ließe sich \
           ein Teil dieser Zeit leicht für ein Buch nutzen. Wer regelmäßig \
           liest, erweitert nicht nur seinen Wortschatz, sondern lernt auch, \
           komplexe Zusammenhänge schneller zu erfassen. Entscheidend ist, \
           mit Texten zu beginnen, die wirklich interessieren.",
  },
  ParagraphSeed {
    level: CefrLevel::B2,
    topic: "umwelt",
    text: "Der Klimawandel ist längst im Alltag angekommen: heiße Sommer, \
           trockene Wälder und steigende Energiepreise beschäftigen viele \
           Haushalte. Trotzdem fällt es schwer, Gewohnheiten zu ändern. \
           Fachleute betonen, dass kleine Schritte zählen, etwa öfter mit \
           der Bahn zu fahren oder regionale Produkte zu kaufen. Ob das \
           reicht, wird allerdings kontrovers diskutiert.",
  },
  ParagraphSeed {
    level: CefrLevel::C1,
    topic: "",
    text: "Wer eine Fremdsprache auf hohem Niveau beherrschen will, kommt um \
           eine gewisse Frustrationstoleranz nicht herum. Gerade auf den \
           letzten Metern schleichen sich Fehler ein, die sich hartnäckig \
           halten, weil sie die Verständigung kaum stören. Umso wichtiger \
           ist gezieltes Feedback: Es macht Schwächen sichtbar, die dem \
           Lernenden selbst längst nicht mehr auffallen, und verwandelt \
           diffuses Üben in messbaren Fortschritt.",
  },
  ParagraphSeed {
    level: CefrLevel::C1,
    topic: "gesellschaft",
    text: "Die Debatte über die Viertagewoche hat in den vergangenen Jahren \
           erheblich an Fahrt aufgenommen. Befürworter verweisen auf \
           Pilotprojekte, in denen die Produktivität trotz verkürzter \
           Arbeitszeit stabil blieb, während Kritiker vor steigenden Kosten \
           und Personalengpässen warnen. Bemerkenswert ist, wie stark die \
           Einschätzungen je nach Branche auseinandergehen; eine pauschale \
           Antwort dürfte es daher kaum geben.",
  },
];

/// Look up a built-in definition override. Returns None when the word is
/// not in the curated table.
pub fn builtin_override(word: &str) -> Option<&'static str> {
  let needle = word.trim().to_lowercase();
  DEFINITION_OVERRIDES
    .iter()
    .find(|(w, _)| *w == needle)
    .map(|(_, def)| *def)
}

/// Pick the fallback paragraph for a level and optional topic. Topic
/// matching is case-insensitive; an unknown topic falls back to the
/// level's default entry. Every level has a default, but we defend the
/// lookup anyway and fall back to the first bank entry.
pub fn fallback_paragraph(level: CefrLevel, topic: Option<&str>) -> &'static str {
  let wanted = topic.map(|t| t.trim().to_lowercase()).unwrap_or_default();

  if !wanted.is_empty() {
    if let Some(seed) = FALLBACK_PARAGRAPHS
      .iter()
      .find(|s| s.level == level && s.topic == wanted)
    {
      return seed.text;
    }
  }

  FALLBACK_PARAGRAPHS
    .iter()
    .find(|s| s.level == level && s.topic.is_empty())
    .map(|s| s.text)
    .unwrap_or(FALLBACK_PARAGRAPHS[0].text)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn overrides_match_case_insensitively() {
    assert_eq!(builtin_override("Herbst"), Some("autumn"));
    assert_eq!(builtin_override("HERBST"), Some("autumn"));
    assert_eq!(builtin_override("Haus"), None);
  }

  #[test]
  fn every_level_has_a_default_paragraph() {
    for lvl in [CefrLevel::A2, CefrLevel::B1, CefrLevel::B2, CefrLevel::C1] {
      assert!(!fallback_paragraph(lvl, None).is_empty());
    }
  }

  #[test]
  fn topic_lookup_falls_back_to_level_default() {
    let by_topic = fallback_paragraph(CefrLevel::A2, Some("Reisen"));
    assert!(by_topic.contains("Meer"));
    let unknown = fallback_paragraph(CefrLevel::A2, Some("astrophysik"));
    assert_eq!(unknown, fallback_paragraph(CefrLevel::A2, None));
  }
}
