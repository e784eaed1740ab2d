//! Lexical knowledge retrieval.
//!
//! Ranks corpus entries against a query with a transparent additive score so
//! knowledge-base authors can predict which entry a phrasing will surface.
//! Deliberately no embeddings: retrieval stays auditable.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use parley_core::types::{Intent, Language};

use crate::entry::{Category, KnowledgeEntry};
use crate::error::KnowledgeError;
use crate::store::KnowledgeStore;

/// Points per exact query-token / entry-keyword match.
const KEYWORD_MATCH_SCORE: u32 = 10;
/// Bonus when the entry category names the classified intent exactly.
const CATEGORY_MATCH_SCORE: u32 = 5;
/// Points per query token found as a substring of title or content.
const SUBSTRING_MATCH_SCORE: u32 = 2;

/// Which intents each category may be surfaced for.
fn compatible(category: Category, intent: Intent) -> bool {
    use Category::*;
    match category {
        Services => matches!(
            intent,
            Intent::Services | Intent::General | Intent::Greeting
        ),
        Pricing => matches!(intent, Intent::Pricing),
        Contact => matches!(intent, Intent::Contact),
        Faq => matches!(
            intent,
            Intent::General | Intent::Services | Intent::Pricing
        ),
        UseCases => matches!(intent, Intent::Services | Intent::General),
        Technical => matches!(intent, Intent::Services | Intent::General),
    }
}

/// An entry exactly names an intent when its category carries the same name.
fn category_is_intent(category: Category, intent: Intent) -> bool {
    matches!(
        (category, intent),
        (Category::Services, Intent::Services)
            | (Category::Pricing, Intent::Pricing)
            | (Category::Contact, Intent::Contact)
    )
}

/// Lowercase query tokens longer than two characters.
fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect()
}

/// A scored knowledge entry. Transient; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    pub entry: KnowledgeEntry,
    pub relevance_score: u32,
    /// The intent this entry was scored against.
    pub intent: Intent,
}

/// Ranks knowledge entries for a query.
pub struct Retriever {
    store: Arc<dyn KnowledgeStore>,
    /// Maximum number of results returned per query.
    pub top_n: usize,
}

impl Retriever {
    pub fn new(store: Arc<dyn KnowledgeStore>, top_n: usize) -> Self {
        Self { store, top_n }
    }

    /// Retrieve the top-ranked entries for a query.
    ///
    /// Entries are filtered to categories compatible with `intent`, scored
    /// lexically, and sorted descending. Ties keep corpus insertion order
    /// (stable sort), so identical inputs always yield identical rankings.
    pub async fn retrieve(
        &self,
        query: &str,
        language: Language,
        intent: Intent,
    ) -> Result<Vec<RetrievalResult>, KnowledgeError> {
        let entries = self.store.query(language).await?;
        let tokens = tokenize(query);

        let mut results: Vec<RetrievalResult> = entries
            .into_iter()
            .filter(|entry| compatible(entry.category, intent))
            .filter_map(|entry| {
                let score = score_entry(&entry, &tokens, intent);
                (score > 0).then_some(RetrievalResult {
                    entry,
                    relevance_score: score,
                    intent,
                })
            })
            .collect();

        results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        results.truncate(self.top_n);

        debug!(
            query = %query,
            language = %language,
            intent = %intent,
            results = results.len(),
            "Knowledge retrieval completed"
        );
        Ok(results)
    }
}

fn score_entry(entry: &KnowledgeEntry, tokens: &[String], intent: Intent) -> u32 {
    let mut score = 0;

    for token in tokens {
        if entry.keywords.iter().any(|k| k == token) {
            score += KEYWORD_MATCH_SCORE;
        }
    }

    if category_is_intent(entry.category, intent) {
        score += CATEGORY_MATCH_SCORE;
    }

    let title = entry.title.to_lowercase();
    let content = entry.content.to_lowercase();
    for token in tokens {
        if title.contains(token.as_str()) || content.contains(token.as_str()) {
            score += SUBSTRING_MATCH_SCORE;
        }
    }

    score
}
