//! Knowledge store — the persona's snippet set, loaded once per process.
//!
//! The snippet file is a JSON array of `{ "id", "text" }` objects. A missing
//! or unusable file falls back to the built-in snippets so the server can
//! always answer identity questions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use vela_core::types::Snippet;

/// Default snippet file, relative to the working directory.
pub const DEFAULT_KNOWLEDGE_PATH: &str = "data/knowledge.json";

/// Read-only snippet set with lazy, race-safe initialization.
///
/// The first call to [`KnowledgeBase::snippets`] reads the file; every later
/// call (from any thread) gets the same shared slice.
pub struct KnowledgeBase {
    path: Option<PathBuf>,
    snippets: OnceLock<Arc<[Snippet]>>,
}

impl KnowledgeBase {
    /// Store backed by a snippet file. Cheap; nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            snippets: OnceLock::new(),
        }
    }

    /// Store over an in-memory snippet set. Duplicate ids keep the first.
    pub fn from_snippets(snippets: Vec<Snippet>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::from(dedupe(snippets)));
        Self {
            path: None,
            snippets: cell,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.snippets.get().is_some()
    }

    /// The snippet set, loading it on first use.
    pub fn snippets(&self) -> Arc<[Snippet]> {
        self.snippets
            .get_or_init(|| {
                let snippets = match &self.path {
                    Some(path) => load_file(path),
                    None => builtin_snippets(),
                };
                Arc::from(dedupe(snippets))
            })
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Snippet> {
        self.snippets().iter().find(|s| s.id == id).cloned()
    }

    /// Ids from `ids` that have no snippet, in input order.
    pub fn missing_ids<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let snippets = self.snippets();
        ids.into_iter()
            .filter(|id| !snippets.iter().any(|s| s.id == *id))
            .map(str::to_string)
            .collect()
    }
}

/// Read and parse a snippet file, falling back to the built-in set.
pub fn load_file(path: &Path) -> Vec<Snippet> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "knowledge file not found, using built-in snippets");
            return builtin_snippets();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read knowledge file, using built-in snippets");
            return builtin_snippets();
        }
    };

    match parse_snippets(&raw) {
        Ok(snippets) if !snippets.is_empty() => {
            info!(path = %path.display(), count = snippets.len(), "loaded knowledge file");
            snippets
        }
        Ok(_) => {
            warn!(path = %path.display(), "knowledge file is empty, using built-in snippets");
            builtin_snippets()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid knowledge file, using built-in snippets");
            builtin_snippets()
        }
    }
}

/// Parse the JSON snippet array.
pub fn parse_snippets(raw: &str) -> Result<Vec<Snippet>, serde_json::Error> {
    serde_json::from_str(raw)
}

fn dedupe(snippets: Vec<Snippet>) -> Vec<Snippet> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(snippets.len());
    for snippet in snippets {
        if seen.insert(snippet.id.clone()) {
            out.push(snippet);
        } else {
            warn!(id = %snippet.id, "duplicate snippet id, keeping the first");
        }
    }
    debug!(count = out.len(), "knowledge snippets ready");
    out
}

/// Snippets compiled into the binary.
pub fn builtin_snippets() -> Vec<Snippet> {
    [
        (
            "KB_IDENTITY",
            "I'm Maya Okafor, a product designer who has spent eight years building tools for small teams. I care about software that feels calm to use.",
        ),
        (
            "KB_BACKGROUND",
            "I grew up in Lagos, moved to Toronto for university, and studied cognitive science before switching to design.",
        ),
        (
            "KB_LIFE",
            "I grew up in Lagos in a house full of radios my dad repaired, which is where my curiosity about how things work started. I moved to Toronto at eighteen, studied cognitive science, and found design when a class project turned into a tool my classmates actually used. Since then I've worked at two startups and one large company, always on products for small teams.",
        ),
        (
            "KB_SUPERPOWER",
            "My superpower is turning messy, conflicting feedback into a clear next step. People leave my reviews knowing exactly what to try next.",
        ),
        (
            "KB_GROWTH",
            "The three areas I want to grow in are public speaking to larger audiences, quantitative research methods, and delegating earlier instead of holding on to work.",
        ),
        (
            "KB_MISCONCEPTION",
            "A common misconception my coworkers have is that I'm reserved. I'm quiet in big meetings because I'm listening, but one-on-one I'm the person who won't stop asking questions.",
        ),
        (
            "KB_BOUNDARIES",
            "I push my boundaries by taking on one project each year in an area I know little about, and by running workshops even though presenting still makes me nervous.",
        ),
    ]
    .into_iter()
    .map(|(id, text)| Snippet::new(id, text))
    .collect()
}
