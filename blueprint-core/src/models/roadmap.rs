use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::feature::{Bucket, Feature};

/// One roadmap per workspace, created lazily on first access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A roadmap with its features grouped by bucket, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapView {
    pub roadmap: Roadmap,
    pub now: Vec<Feature>,
    pub next: Vec<Feature>,
    pub later: Vec<Feature>,
}

impl RoadmapView {
    /// Group a display-ordered feature list into the three bucket columns.
    pub fn build(roadmap: Roadmap, features: Vec<Feature>) -> Self {
        let mut view = Self {
            roadmap,
            now: Vec::new(),
            next: Vec::new(),
            later: Vec::new(),
        };
        for feature in features {
            match feature.bucket {
                Bucket::Now => view.now.push(feature),
                Bucket::Next => view.next.push(feature),
                Bucket::Later => view.later.push(feature),
            }
        }
        view
    }
}
