//! Keyword-bucket intent classification.
//!
//! Ordered membership test per language; the first matching bucket wins in
//! priority order greeting > services > pricing > contact. `General` is the
//! default bucket, never "no intent".

use parley_core::types::{Intent, Language};

struct IntentBuckets {
    greeting: &'static [&'static str],
    services: &'static [&'static str],
    pricing: &'static [&'static str],
    contact: &'static [&'static str],
}

static FRENCH: IntentBuckets = IntentBuckets {
    greeting: &["bonjour", "salut", "bonsoir"],
    services: &["service", "que faites-vous", "quels services", "votre offre"],
    pricing: &["prix", "tarif", "coût", "combien", "devis"],
    contact: &["contact", "téléphone", "email", "joindre", "rendez-vous"],
};

static ENGLISH: IntentBuckets = IntentBuckets {
    greeting: &["hello", "hi ", "hey", "good morning", "good evening"],
    services: &["service", "what do you do", "what services", "your offer"],
    pricing: &["price", "pricing", "cost", "how much", "quote", "rate"],
    contact: &["contact", "phone", "email", "reach", "appointment"],
};

/// Maps an utterance and its detected language to an intent.
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify an utterance. Pure; lowercased substring membership.
    pub fn classify(&self, text: &str, language: Language) -> Intent {
        let lower = text.to_lowercase();
        let buckets = match language {
            Language::Fr => &FRENCH,
            Language::En => &ENGLISH,
        };

        if contains_any(&lower, buckets.greeting) {
            Intent::Greeting
        } else if contains_any(&lower, buckets.services) {
            Intent::Services
        } else if contains_any(&lower, buckets.pricing) {
            Intent::Pricing
        } else if contains_any(&lower, buckets.contact) {
            Intent::Contact
        } else {
            Intent::General
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}
