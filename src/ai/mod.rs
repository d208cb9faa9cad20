//! AI suggestion collaborator.
//!
//! The server never generates text itself; it calls a hosted chat-completion
//! endpoint and parses the reply into domain types. The provider sits behind
//! an object-safe trait so the HTTP surface and the MCP tools can be tested
//! with a scripted reply.

mod completion;

pub use completion::HttpCompletionProvider;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use blueprint_core::models::{DocumentKind, FeatureDraft};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("ai provider not configured (set BLUEPRINT_AI_KEY)")]
    NotConfigured,

    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed completion response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// One system + user turn, plain text reply.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError>;
}

/// Pick a provider from the environment: the HTTP endpoint when an API key
/// is present, otherwise a stub that reports itself unconfigured.
pub fn provider_from_env() -> Arc<dyn CompletionProvider> {
    match HttpCompletionProvider::from_env() {
        Some(provider) => Arc::new(provider),
        None => {
            tracing::warn!("BLUEPRINT_AI_KEY not set, AI suggestions disabled");
            Arc::new(UnconfiguredProvider)
        }
    }
}

struct UnconfiguredProvider;

#[async_trait]
impl CompletionProvider for UnconfiguredProvider {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }
}

/// Fixed-reply provider for tests and offline demos.
pub struct ScriptedProvider {
    reply: String,
}

impl ScriptedProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, AiError> {
        Ok(self.reply.clone())
    }
}

const SUGGEST_SYSTEM_PROMPT: &str = "\
You are a product planning assistant. Given a product idea, propose roadmap \
features. Reply with ONLY a JSON array; each element has the shape \
{\"title\": string, \"description\": string, \"bucket\": \"now\"|\"next\"|\"later\", \
\"priority\": \"low\"|\"medium\"|\"high\", \"tags\": [string]}. No prose, no markdown.";

/// Ask the provider for candidate roadmap features.
pub async fn suggest_features(
    provider: &dyn CompletionProvider,
    prompt: &str,
) -> Result<Vec<FeatureDraft>, AiError> {
    let raw = provider.complete(SUGGEST_SYSTEM_PROMPT, prompt).await?;
    parse_drafts(&raw)
}

/// Ask the provider to draft a planning document body (markdown).
pub async fn draft_document(
    provider: &dyn CompletionProvider,
    kind: DocumentKind,
    prompt: &str,
) -> Result<String, AiError> {
    let system = document_system_prompt(kind);
    let body = provider.complete(system, prompt).await?;
    let body = body.trim();
    if body.is_empty() {
        return Err(AiError::Malformed("empty document body".into()));
    }
    Ok(body.to_string())
}

fn document_system_prompt(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Prd => {
            "You are a product manager. Write a concise PRD in markdown: problem, \
             goals, non-goals, requirements, success metrics."
        }
        DocumentKind::Persona => {
            "You are a product researcher. Write a user persona in markdown: \
             background, goals, frustrations, key scenarios."
        }
        DocumentKind::CompetitiveAnalysis => {
            "You are a market analyst. Write a competitive analysis in markdown: \
             competitors, positioning, gaps, opportunities."
        }
        DocumentKind::WireframeBrief => {
            "You are a product designer. Write a wireframe brief in markdown: \
             screens, layout notes, primary flows."
        }
    }
}

/// Models reply with fenced code blocks often enough that the parser strips
/// them before reading the JSON.
fn parse_drafts(raw: &str) -> Result<Vec<FeatureDraft>, AiError> {
    let body = strip_code_fence(raw);
    serde_json::from_str::<Vec<FeatureDraft>>(body)
        .map_err(|e| AiError::Malformed(format!("{} in: {}", e, truncate(body, 200))))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence.
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::models::{Bucket, Priority};

    const DRAFTS: &str = r#"[
        {"title": "Onboarding flow", "description": "First-run tour", "bucket": "now", "priority": "high", "tags": ["ux"]},
        {"title": "Usage analytics", "bucket": "later", "priority": "low"}
    ]"#;

    #[test]
    fn parses_a_plain_json_array() {
        let drafts = parse_drafts(DRAFTS).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].bucket, Bucket::Now);
        assert_eq!(drafts[0].priority, Priority::High);
        assert_eq!(drafts[1].tags, Vec::<String>::new());
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{}\n```", DRAFTS);
        let drafts = parse_drafts(&fenced).unwrap();
        assert_eq!(drafts.len(), 2);
    }

    #[test]
    fn rejects_prose_replies() {
        let err = parse_drafts("Sure! Here are some ideas...").unwrap_err();
        assert!(matches!(err, AiError::Malformed(_)));
    }

    #[test]
    fn suggest_features_runs_through_a_scripted_provider() {
        let provider = ScriptedProvider::new(DRAFTS);
        let drafts = tokio_test::block_on(suggest_features(&provider, "a todo app")).unwrap();
        assert_eq!(drafts[1].title, "Usage analytics");
    }

    #[test]
    fn draft_document_rejects_empty_bodies() {
        let provider = ScriptedProvider::new("   ");
        let err = tokio_test::block_on(draft_document(&provider, DocumentKind::Prd, "a todo app"))
            .unwrap_err();
        assert!(matches!(err, AiError::Malformed(_)));
    }
}
