//! Heuristic language detection.
//!
//! Scores an utterance against per-language lexicons: a decisive greeting
//! list, tiered keyword weights, and a small regex pattern bonus. Pure and
//! deterministic; identical input always yields identical output.

use std::sync::LazyLock;

use regex::Regex;

use parley_core::types::Language;

/// Weight added per high-tier keyword found.
const HIGH_WEIGHT: u32 = 10;
/// Weight added per medium-tier keyword found.
const MEDIUM_WEIGHT: u32 = 5;
/// Weight added per low-tier keyword found.
const LOW_WEIGHT: u32 = 1;
/// Bonus per matched language-specific pattern.
const PATTERN_BONUS: u32 = 3;

struct Lexicon {
    greetings: &'static [&'static str],
    high: &'static [&'static str],
    medium: &'static [&'static str],
    low: &'static [&'static str],
    patterns: Vec<Regex>,
}

static FRENCH: LazyLock<Lexicon> = LazyLock::new(|| Lexicon {
    greetings: &["bonjour", "salut", "bonsoir", "bonne soirée", "bonne journée"],
    high: &[
        "site web",
        "application mobile",
        "automatisation",
        "marketing digital",
        "que faites-vous",
    ],
    medium: &[
        "bonjour", "que", "comment", "pouvez", "aide", "besoin", "veux", "créer",
        "construire",
    ],
    low: &[
        "le", "la", "les", "un", "une", "dans", "sur", "pour", "avec", "vous", "je",
        "nous",
    ],
    patterns: compile(&[
        r"\bqu['’]",
        r"\bc['’]est",
        r"\bj['’]ai",
        r"\bn['’]",
        r"\bl['’]",
        r"tion\b",
        r"ment\b",
    ]),
});

static ENGLISH: LazyLock<Lexicon> = LazyLock::new(|| Lexicon {
    greetings: &[
        "hello",
        "hi",
        "hey",
        "good morning",
        "good evening",
        "good afternoon",
    ],
    high: &[
        "website",
        "mobile app",
        "automation",
        "digital marketing",
        "what do you do",
    ],
    medium: &[
        "hello", "what", "how", "can", "help", "need", "want", "create", "build",
    ],
    low: &[
        "the", "a", "an", "in", "on", "at", "for", "with", "you", "i", "we", "they",
    ],
    patterns: compile(&[
        r"\bi['’]m\b",
        r"\byou['’]re\b",
        r"\bit['’]s\b",
        r"\bdon['’]t\b",
        r"ing\b",
        r"['’]s\b",
    ]),
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid language pattern"))
        .collect()
}

/// Rule-based language detector over {fr, en}.
///
/// Extensible to more languages by adding a lexicon and a variant to
/// [`Language`].
pub struct LanguageDetector {
    /// Language returned on an exact score tie.
    pub default_language: Language,
}

impl LanguageDetector {
    pub fn new(default_language: Language) -> Self {
        Self { default_language }
    }

    /// Detect the language of an utterance.
    pub fn detect(&self, text: &str) -> Language {
        let lower = text.to_lowercase();
        let lower = lower.trim();

        // Greetings are decisive: return immediately on a match.
        if matches_greeting(&ENGLISH, lower) {
            return Language::En;
        }
        if matches_greeting(&FRENCH, lower) {
            return Language::Fr;
        }

        let fr = score(&FRENCH, lower);
        let en = score(&ENGLISH, lower);

        // Strictly greater wins; a tie resolves to the configured default.
        if en > fr {
            Language::En
        } else if fr > en {
            Language::Fr
        } else {
            self.default_language
        }
    }
}

fn matches_greeting(lexicon: &Lexicon, lower: &str) -> bool {
    lexicon.greetings.iter().any(|g| {
        lower == *g
            || lower.starts_with(&format!("{} ", g))
            || lower.ends_with(&format!(" {}", g))
    })
}

fn score(lexicon: &Lexicon, lower: &str) -> u32 {
    let mut score = 0;

    for word in lexicon.high {
        if lower.contains(word) {
            score += HIGH_WEIGHT;
        }
    }
    for word in lexicon.medium {
        if lower.contains(word) {
            score += MEDIUM_WEIGHT;
        }
    }
    for word in lexicon.low {
        if lower.contains(word) {
            score += LOW_WEIGHT;
        }
    }
    for pattern in &lexicon.patterns {
        if pattern.is_match(lower) {
            score += PATTERN_BONUS;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> LanguageDetector {
        LanguageDetector::new(Language::Fr)
    }

    // ---- Greetings short-circuit ----

    #[test]
    fn test_french_greeting() {
        assert_eq!(detector().detect("Bonjour"), Language::Fr);
        assert_eq!(detector().detect("salut"), Language::Fr);
        assert_eq!(detector().detect("Bonsoir tout le monde"), Language::Fr);
    }

    #[test]
    fn test_english_greeting() {
        assert_eq!(detector().detect("Hello"), Language::En);
        assert_eq!(detector().detect("hey there"), Language::En);
        assert_eq!(detector().detect("good morning"), Language::En);
    }

    #[test]
    fn test_greeting_as_suffix() {
        assert_eq!(detector().detect("I said hello"), Language::En);
    }

    // ---- Keyword scoring ----

    #[test]
    fn test_english_high_keywords() {
        assert_eq!(detector().detect("website"), Language::En);
        assert_eq!(detector().detect("automation"), Language::En);
        assert_eq!(
            detector().detect("I want a website with automation"),
            Language::En
        );
    }

    #[test]
    fn test_french_high_keywords() {
        assert_eq!(detector().detect("site web"), Language::Fr);
        assert_eq!(detector().detect("automatisation"), Language::Fr);
        assert_eq!(
            detector().detect("je veux un site web avec automatisation"),
            Language::Fr
        );
    }

    #[test]
    fn test_pricing_question_english() {
        assert_eq!(
            detector().detect("What is the price for WhatsApp automation?"),
            Language::En
        );
    }

    #[test]
    fn test_pricing_question_french() {
        assert_eq!(
            detector().detect("Quel est le prix pour l'automatisation WhatsApp ?"),
            Language::Fr
        );
    }

    // ---- Pattern bonus ----

    #[test]
    fn test_french_elision_pattern() {
        assert_eq!(detector().detect("qu'est-ce que c'est"), Language::Fr);
    }

    #[test]
    fn test_english_contraction_pattern() {
        assert_eq!(detector().detect("i'm looking, it's urgent"), Language::En);
    }

    // ---- Tie-break ----

    #[test]
    fn test_tie_defaults_to_configured_language() {
        // Nothing in either lexicon matches pure digits.
        assert_eq!(detector().detect("12345"), Language::Fr);
        let en_default = LanguageDetector::new(Language::En);
        assert_eq!(en_default.detect("12345"), Language::En);
    }

    // ---- Determinism ----

    #[test]
    fn test_deterministic_across_calls() {
        let d = detector();
        let inputs = [
            "Bonjour",
            "hello there",
            "What is the price for WhatsApp automation?",
            "je veux créer une application mobile",
            "12345",
            "",
        ];
        for input in inputs {
            let first = d.detect(input);
            for _ in 0..5 {
                assert_eq!(d.detect(input), first, "input: {:?}", input);
            }
        }
    }

    #[test]
    fn test_empty_input_uses_default() {
        assert_eq!(detector().detect(""), Language::Fr);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(detector().detect("WEBSITE AUTOMATION"), Language::En);
        assert_eq!(detector().detect("SITE WEB"), Language::Fr);
    }
}
