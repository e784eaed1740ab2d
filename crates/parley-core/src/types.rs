//! Shared domain primitives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported reply languages.
///
/// Two-letter codes on the wire. Adding a language means adding a variant
/// here plus a lexicon in the engine crate; nothing else changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Fr,
    En,
}

impl Language {
    /// The two-letter code for this language.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language code: {}", other)),
        }
    }
}

/// User intents the classifier can produce.
///
/// `General` is the fallback bucket; classification never yields "no intent".
/// Shared here because both the retriever (category compatibility) and the
/// engine (classification, canned replies) speak in intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Greeting,
    Services,
    Pricing,
    Contact,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Services => "services",
            Intent::Pricing => "pricing",
            Intent::Contact => "contact",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(format!("unknown sender: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Fr.code(), "fr");
        assert_eq!(Language::En.code(), "en");
        assert_eq!(Language::Fr.to_string(), "fr");
    }

    #[test]
    fn test_language_round_trip() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::Fr);
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
        let lang: Language = serde_json::from_str("\"fr\"").unwrap();
        assert_eq!(lang, Language::Fr);
    }

    #[test]
    fn test_intent_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Intent::Greeting).unwrap(),
            "\"greeting\""
        );
        let intent: Intent = serde_json::from_str("\"pricing\"").unwrap();
        assert_eq!(intent, Intent::Pricing);
    }

    #[test]
    fn test_intent_display() {
        assert_eq!(Intent::General.to_string(), "general");
        assert_eq!(Intent::Services.as_str(), "services");
    }

    #[test]
    fn test_sender_round_trip() {
        assert_eq!("user".parse::<Sender>().unwrap(), Sender::User);
        assert_eq!("bot".parse::<Sender>().unwrap(), Sender::Bot);
        assert!("system".parse::<Sender>().is_err());
        assert_eq!(Sender::Bot.as_str(), "bot");
    }
}
