//! Knowledge entry records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::types::Language;

/// Fixed category taxonomy for knowledge entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Services,
    Pricing,
    Contact,
    Faq,
    UseCases,
    Technical,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Services => "services",
            Category::Pricing => "pricing",
            Category::Contact => "contact",
            Category::Faq => "faq",
            Category::UseCases => "use_cases",
            Category::Technical => "technical",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "services" => Ok(Category::Services),
            "pricing" => Ok(Category::Pricing),
            "contact" => Ok(Category::Contact),
            "faq" => Ok(Category::Faq),
            "use_cases" => Ok(Category::UseCases),
            "technical" => Ok(Category::Technical),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// A single curated knowledge entry.
///
/// Created by the out-of-band ingestion process and never mutated at
/// runtime; deactivation sets `active` to false rather than deleting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub language: Language,
    /// Non-empty set of lookup keywords, stored lowercased.
    pub keywords: Vec<String>,
    pub active: bool,
}

impl KnowledgeEntry {
    /// Build a new active entry with a fresh id. Keywords are lowercased.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: Category,
        language: Language,
        keywords: &[&str],
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            category,
            language,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            active: true,
        }
    }
}
