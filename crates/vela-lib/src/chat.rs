//! Chat pipeline — canned fast path, context selection, model call, parse.
//!
//! ```text
//! answer(text) → canned table hit?        → snippet text, high confidence
//!              → selector → no context?   → "no verified information", low
//!              → prompt → model → parser  → validated or fallback envelope
//! ```

use tracing::{debug, info, warn};

use vela_core::canned::CannedTable;
use vela_core::prompt::build_prompt;
use vela_core::response::{ParsedAnswer, parse_model_output};
use vela_core::retrieval::{Retrieval, Selector};
use vela_core::types::ResponseEnvelope;

use crate::error::ServiceError;
use crate::knowledge::KnowledgeBase;
use crate::model::ModelClient;

/// What the pipeline will do for a query, decided without any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerPlan {
    /// A canned rule matched; answer directly.
    Canned(ResponseEnvelope),
    /// Nothing to ground an answer on.
    NoContext(ResponseEnvelope),
    /// Ask the model with this prompt.
    Prompt { retrieval: Retrieval, prompt: String },
}

/// Answers chat questions about the persona.
pub struct ChatService {
    knowledge: KnowledgeBase,
    selector: Selector,
    canned: CannedTable,
    model: ModelClient,
}

impl ChatService {
    pub fn new(knowledge: KnowledgeBase, selector: Selector, model: ModelClient) -> Self {
        Self {
            knowledge,
            selector,
            canned: CannedTable::builtin().clone(),
            model,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn model(&self) -> &ModelClient {
        &self.model
    }

    /// Load the knowledge base now and warn about ids it cannot serve.
    /// Returns the snippet count.
    pub fn warm_up(&self) -> usize {
        let count = self.knowledge.snippets().len();
        let anchors = self.selector.anchors.iter().map(String::as_str);
        for id in self.knowledge.missing_ids(anchors) {
            warn!(%id, "anchor snippet missing from knowledge base");
        }
        for id in self.knowledge.missing_ids(self.canned.snippet_ids()) {
            warn!(%id, "canned rule points at a missing snippet");
        }
        info!(snippets = count, "knowledge base ready");
        count
    }

    /// Decide how `text` will be answered.
    pub fn plan(&self, text: &str) -> AnswerPlan {
        let snippets = self.knowledge.snippets();

        if let Some(envelope) = self.canned.answer(text, &snippets) {
            return AnswerPlan::Canned(envelope);
        }

        match self.selector.select(text, &snippets) {
            None => AnswerPlan::NoContext(ResponseEnvelope::no_info()),
            Some(retrieval) => {
                let prompt = build_prompt(&retrieval.context, text);
                AnswerPlan::Prompt { retrieval, prompt }
            }
        }
    }

    /// Answer one question.
    pub async fn answer(&self, text: &str) -> Result<ResponseEnvelope, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::BadRequest("text is required".into()));
        }

        match self.plan(text) {
            AnswerPlan::Canned(envelope) => {
                info!(sources = ?envelope.sources, "chat: canned answer");
                Ok(envelope)
            }
            AnswerPlan::NoContext(envelope) => {
                info!("chat: no relevant context");
                Ok(envelope)
            }
            AnswerPlan::Prompt { retrieval, prompt } => {
                debug!(sources = ?retrieval.sources, "chat: context selected");
                let raw = self.model.generate(&prompt).await?;
                let parsed = parse_model_output(&raw);
                match &parsed {
                    ParsedAnswer::Validated(env) => {
                        info!(confidence = env.confidence.as_str(), sources = ?env.sources, "chat: model answer");
                    }
                    ParsedAnswer::Fallback(_) => {
                        warn!(raw_chars = raw.len(), "chat: model output was not the expected JSON, using raw text");
                    }
                }
                Ok(parsed.into_envelope())
            }
        }
    }
}
