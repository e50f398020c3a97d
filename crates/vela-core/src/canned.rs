//! Canned responses — questions answered straight from a snippet.
//!
//! Rules are tried in table order against the lowercased query. The first
//! rule whose pattern matches and whose snippet exists wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Confidence, ResponseEnvelope, Snippet};

static BUILTIN: LazyLock<CannedTable> = LazyLock::new(|| {
    CannedTable::new(vec![
        (r"life\s*story|tell me about yourself\b", "KB_LIFE"),
        (
            r"super\s*power|(greatest|biggest) strength|what are you best at\??$",
            "KB_SUPERPOWER",
        ),
        (
            r"\bareas?\b.*\b(grow|improve)|\bgrow(th)? in\b|weakness(es)?",
            "KB_GROWTH",
        ),
        (
            r"misconception|misunderstand|(coworkers?|colleagues?|people) (think|assume)",
            "KB_MISCONCEPTION",
        ),
        (
            r"push (your )?(boundaries|limits)|comfort zone",
            "KB_BOUNDARIES",
        ),
    ])
    .expect("builtin canned patterns are valid")
});

/// One `(pattern, snippet id)` pair.
#[derive(Debug, Clone)]
pub struct CannedRule {
    pub pattern: Regex,
    pub snippet_id: String,
}

/// Ordered rule table.
#[derive(Debug, Clone)]
pub struct CannedTable {
    rules: Vec<CannedRule>,
}

impl CannedTable {
    /// Compile a table from `(pattern, snippet id)` pairs, keeping order.
    pub fn new<P, I>(rules: impl IntoIterator<Item = (P, I)>) -> Result<Self, regex::Error>
    where
        P: AsRef<str>,
        I: Into<String>,
    {
        let rules = rules
            .into_iter()
            .map(|(pattern, id)| {
                Ok(CannedRule {
                    pattern: Regex::new(pattern.as_ref())?,
                    snippet_id: id.into(),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// The persona's built-in table.
    pub fn builtin() -> &'static CannedTable {
        &BUILTIN
    }

    /// Snippet ids referenced by the table, in rule order.
    pub fn snippet_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.snippet_id.as_str())
    }

    /// Find the first matching rule whose snippet is present.
    pub fn find<'a>(&self, query: &str, snippets: &'a [Snippet]) -> Option<&'a Snippet> {
        let lowered = query.trim().to_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_match(&lowered))
            .find_map(|rule| snippets.iter().find(|s| s.id == rule.snippet_id))
    }

    /// Answer directly from a snippet when a rule matches.
    pub fn answer(&self, query: &str, snippets: &[Snippet]) -> Option<ResponseEnvelope> {
        self.find(query, snippets).map(|snippet| {
            ResponseEnvelope::new(
                snippet.text.clone(),
                Confidence::High,
                vec![snippet.id.clone()],
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Vec<Snippet> {
        vec![
            Snippet::new("KB_LIFE", "I grew up between two cities."),
            Snippet::new("KB_SUPERPOWER", "My superpower is calm under pressure."),
            Snippet::new("KB_GROWTH", "I want to grow in public speaking."),
        ]
    }

    #[test]
    fn life_story_question() {
        let env = CannedTable::builtin()
            .answer("What should we know about your life story?", &store())
            .unwrap();
        assert_eq!(env.answer, "I grew up between two cities.");
        assert_eq!(env.confidence, Confidence::High);
        assert_eq!(env.sources, vec!["KB_LIFE"]);
    }

    #[test]
    fn matching_ignores_case() {
        let env = CannedTable::builtin()
            .answer("WHAT IS YOUR #1 SUPERPOWER", &store())
            .unwrap();
        assert_eq!(env.sources, vec!["KB_SUPERPOWER"]);
    }

    #[test]
    fn first_rule_wins() {
        // matches both the life-story and growth rules
        let env = CannedTable::builtin()
            .answer("what areas of your life story would you like to grow in?", &store())
            .unwrap();
        assert_eq!(env.sources, vec!["KB_LIFE"]);
    }

    #[test]
    fn rule_with_missing_snippet_falls_through() {
        let snippets = vec![Snippet::new("KB_GROWTH", "growth text")];
        let env = CannedTable::builtin()
            .answer("tell me your life story and the areas you want to grow in", &snippets)
            .unwrap();
        assert_eq!(env.sources, vec!["KB_GROWTH"]);
    }

    #[test]
    fn persona_questions_match() {
        let table = CannedTable::builtin();
        let cases = [
            ("Tell me about yourself.", "KB_LIFE"),
            ("What are you best at?", "KB_SUPERPOWER"),
            ("What are the top 3 areas you'd like to grow in?", "KB_GROWTH"),
        ];
        for (query, id) in cases {
            assert_eq!(table.find(query, &store()).map(|s| s.id.as_str()), Some(id), "{query}");
        }
    }

    #[test]
    fn ordinary_questions_are_not_canned() {
        let table = CannedTable::builtin();
        for query in [
            "Where did you grow up?",
            "Tell me about your hobbies",
            "What tools are you best at using?",
        ] {
            assert!(table.find(query, &store()).is_none(), "{query}");
        }
    }

    #[test]
    fn no_match_returns_none() {
        assert!(CannedTable::builtin().answer("asdkjasd", &store()).is_none());
    }

    #[test]
    fn custom_table_keeps_order() {
        let table = CannedTable::new([("hello", "A"), ("hello world", "B")]).unwrap();
        let snippets = vec![Snippet::new("B", "b"), Snippet::new("A", "a")];
        assert_eq!(table.find("Hello World", &snippets).unwrap().id, "A");
        assert_eq!(table.snippet_ids().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(CannedTable::new([("(unclosed", "A")]).is_err());
    }
}
