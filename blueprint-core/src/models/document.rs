use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generated planning artifact (PRD, persona, competitive analysis,
/// wireframe brief). Body is markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub kind: DocumentKind,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Prd,
    Persona,
    CompetitiveAnalysis,
    WireframeBrief,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prd => "prd",
            Self::Persona => "persona",
            Self::CompetitiveAnalysis => "competitive_analysis",
            Self::WireframeBrief => "wireframe_brief",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "prd" => Some(Self::Prd),
            "persona" => Some(Self::Persona),
            "competitive_analysis" => Some(Self::CompetitiveAnalysis),
            "wireframe_brief" => Some(Self::WireframeBrief),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentInput {
    pub kind: DocumentKind,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocumentInput {
    pub title: Option<String>,
    pub body: Option<String>,
}
