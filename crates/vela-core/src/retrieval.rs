//! Context selection — keyword scoring over the knowledge snippets.
//!
//! Scoring is token presence: each distinct query token that appears as a
//! literal substring of a snippet's lowercased text adds one point. No
//! stemming, no frequency weighting, no embeddings.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::Snippet;

static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Snippets always placed at the front of the context.
pub const DEFAULT_ANCHOR_IDS: &[&str] = &["KB_IDENTITY", "KB_BACKGROUND"];

/// Default cap on scored snippets.
pub const DEFAULT_MAX_CHUNKS: usize = 5;

/// Tokens shorter than this many characters never score.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 4;

/// Selector settings.
#[derive(Debug, Clone)]
pub struct Selector {
    pub anchors: Vec<String>,
    /// `None` keeps every scored snippet.
    pub max_chunks: Option<usize>,
    pub min_token_len: usize,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            anchors: DEFAULT_ANCHOR_IDS.iter().map(|s| s.to_string()).collect(),
            max_chunks: Some(DEFAULT_MAX_CHUNKS),
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }
}

/// Selected context for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieval {
    /// `[id] text` entries joined by blank lines.
    pub context: String,
    /// Snippet ids in context order.
    pub sources: Vec<String>,
}

impl Selector {
    /// Select anchors plus the best-scoring snippets for `query`.
    ///
    /// Returns `None` when nothing is selected, which callers treat as
    /// "cannot answer". Ties in score keep the order of `snippets`.
    pub fn select(&self, query: &str, snippets: &[Snippet]) -> Option<Retrieval> {
        let tokens: Vec<String> = tokenize(query)
            .into_iter()
            .filter(|t| t.chars().count() >= self.min_token_len)
            .collect();

        let mut scored: Vec<(&Snippet, usize)> = snippets
            .iter()
            .map(|s| (s, score(&tokens, &s.text)))
            .filter(|(_, n)| *n > 0)
            .collect();
        // sort_by is stable, so equal scores stay in store order
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(max) = self.max_chunks {
            scored.truncate(max);
        }

        let anchors = self
            .anchors
            .iter()
            .filter_map(|id| snippets.iter().find(|s| &s.id == id));

        let mut seen = HashSet::new();
        let selected: Vec<&Snippet> = anchors
            .chain(scored.into_iter().map(|(s, _)| s))
            .filter(|s| seen.insert(s.id.clone()))
            .collect();

        if selected.is_empty() {
            return None;
        }

        Some(Retrieval {
            context: format_context(&selected),
            sources: selected.iter().map(|s| s.id.clone()).collect(),
        })
    }
}

/// Lowercase, split on non-word runs, drop empties and duplicates.
pub fn tokenize(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut seen = HashSet::new();
    RE_NON_WORD
        .split(&lowered)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

fn score(tokens: &[String], text: &str) -> usize {
    let haystack = text.to_lowercase();
    tokens.iter().filter(|t| haystack.contains(t.as_str())).count()
}

/// Render snippets as a prompt context block.
pub fn format_context(snippets: &[&Snippet]) -> String {
    snippets
        .iter()
        .map(|s| format!("[{}] {}", s.id, s.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Vec<Snippet> {
        vec![
            Snippet::new("KB_IDENTITY", "I am Maya Okafor, a product designer."),
            Snippet::new("KB_GARDEN", "On weekends I tend a small garden of tomatoes."),
            Snippet::new("KB_CHESS", "I play chess online and love endgame puzzles."),
            Snippet::new("KB_TRAVEL", "Travel taught me patience; chess tournaments took me abroad."),
            Snippet::new("KB_BACKGROUND", "I grew up in Lagos and studied in Toronto."),
        ]
    }

    fn ids(r: &Retrieval) -> Vec<&str> {
        r.sources.iter().map(String::as_str).collect()
    }

    #[test]
    fn tokenize_lowercases_and_dedupes() {
        assert_eq!(
            tokenize("Chess, CHESS and garden!"),
            vec!["chess", "and", "garden"]
        );
    }

    #[test]
    fn tokenize_empty_query() {
        assert!(tokenize("  ?!  ").is_empty());
    }

    #[test]
    fn anchors_come_first() {
        let r = Selector::default().select("garden", &store()).unwrap();
        assert_eq!(ids(&r), vec!["KB_IDENTITY", "KB_BACKGROUND", "KB_GARDEN"]);
    }

    #[test]
    fn no_match_returns_only_anchors() {
        let r = Selector::default().select("asdkjasd", &store()).unwrap();
        assert_eq!(ids(&r), vec!["KB_IDENTITY", "KB_BACKGROUND"]);
    }

    #[test]
    fn short_tokens_never_score() {
        // "and", "the", "i" all appear in snippets but are too short
        let r = Selector::default().select("and the I a on", &store()).unwrap();
        assert_eq!(ids(&r), vec!["KB_IDENTITY", "KB_BACKGROUND"]);
    }

    #[test]
    fn higher_score_ranks_first() {
        // KB_TRAVEL matches "chess" and "travel"; KB_CHESS matches "chess" only
        let r = Selector::default().select("chess travel", &store()).unwrap();
        assert_eq!(
            ids(&r),
            vec!["KB_IDENTITY", "KB_BACKGROUND", "KB_TRAVEL", "KB_CHESS"]
        );
    }

    #[test]
    fn ties_keep_store_order() {
        let r = Selector::default().select("chess", &store()).unwrap();
        assert_eq!(
            ids(&r),
            vec!["KB_IDENTITY", "KB_BACKGROUND", "KB_CHESS", "KB_TRAVEL"]
        );
    }

    #[test]
    fn max_chunks_caps_scored_hits() {
        let selector = Selector {
            max_chunks: Some(1),
            ..Default::default()
        };
        let r = selector.select("chess", &store()).unwrap();
        assert_eq!(ids(&r), vec!["KB_IDENTITY", "KB_BACKGROUND", "KB_CHESS"]);
    }

    #[test]
    fn anchor_hit_is_not_duplicated() {
        let r = Selector::default().select("lagos chess", &store()).unwrap();
        assert_eq!(
            ids(&r),
            vec!["KB_IDENTITY", "KB_BACKGROUND", "KB_CHESS", "KB_TRAVEL"]
        );
    }

    #[test]
    fn missing_anchor_is_skipped() {
        let selector = Selector {
            anchors: vec!["KB_NOPE".into(), "KB_IDENTITY".into()],
            ..Default::default()
        };
        let r = selector.select("zzzz", &store()).unwrap();
        assert_eq!(ids(&r), vec!["KB_IDENTITY"]);
    }

    #[test]
    fn empty_selection_is_none() {
        let selector = Selector {
            anchors: Vec::new(),
            ..Default::default()
        };
        assert_eq!(selector.select("zzzz", &store()), None);
        assert_eq!(Selector::default().select("garden", &[]), None);
    }

    #[test]
    fn context_format() {
        let r = Selector::default().select("tomatoes", &store()).unwrap();
        assert_eq!(
            r.context,
            "[KB_IDENTITY] I am Maya Okafor, a product designer.\n\n\
             [KB_BACKGROUND] I grew up in Lagos and studied in Toronto.\n\n\
             [KB_GARDEN] On weekends I tend a small garden of tomatoes."
        );
    }

    #[test]
    fn selection_is_deterministic() {
        let a = Selector::default().select("chess garden travel", &store());
        let b = Selector::default().select("chess garden travel", &store());
        assert_eq!(a, b);
    }
}
