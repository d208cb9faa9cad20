use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position assigned to features created from an accepted AI draft.
///
/// Drafts land at the end of their bucket without a sibling scan; the next
/// board commit renumbers the bucket back to a contiguous sequence.
pub const DRAFT_POSITION: i64 = 9_999;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: Uuid,
    pub roadmap_id: Uuid,
    pub workspace_id: Uuid,
    pub owner: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub bucket: Bucket,
    pub priority: Priority,
    pub tags: Vec<String>,
    /// Sort order within the bucket. Contiguous 0..n-1 at rest; gaps appear
    /// after deletes and draft inserts until the next board commit.
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Now,
    Next,
    Later,
}

impl Bucket {
    /// Column order on the board.
    pub const ALL: [Bucket; 3] = [Bucket::Now, Bucket::Next, Bucket::Later];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Next => "next",
            Self::Later => "later",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "now" => Some(Self::Now),
            "next" => Some(Self::Next),
            "later" => Some(Self::Later),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Storage spelling. The feature table predates the wire format and keeps
    /// capitalized values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Low" | "low" => Some(Self::Low),
            "Medium" | "medium" => Some(Self::Medium),
            "High" | "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeatureInput {
    pub title: String,
    pub description: Option<String>,
    pub bucket: Bucket,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFeatureInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub bucket: Option<Bucket>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
}

/// How a new feature's position within its bucket is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeaturePlacement {
    /// Manual creation: one past the highest sibling position.
    Append,
    /// Accepted AI draft: fixed end-of-bucket sentinel.
    Sentinel,
}

/// Candidate feature produced by the AI suggestion collaborator.
///
/// Accepted drafts flow through the normal creation path with
/// [`FeaturePlacement::Sentinel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub bucket: Bucket,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<FeatureDraft> for CreateFeatureInput {
    fn from(draft: FeatureDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            bucket: draft.bucket,
            priority: Some(draft.priority),
            tags: draft.tags,
        }
    }
}
