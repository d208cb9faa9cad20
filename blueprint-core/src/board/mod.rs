//! Roadmap board reconciler.
//!
//! Keeps the visual ordering of feature cards across the three buckets
//! synchronized with drag gestures, then produces a commit describing the
//! final arrangement. [`RoadmapBoard`] is a pure state machine over the
//! unified, display-ordered feature list; [`BoardSession`] ties it to the
//! store with explicit two-phase semantics: mutate locally, persist the
//! commit, reload wholesale from storage on any persistence failure.

mod session;

pub use session::BoardSession;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Bucket, Feature};

/// What the pointer is over during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// Another feature card.
    Card(Uuid),
    /// A bucket's empty drop zone.
    Zone(Bucket),
}

/// Final `{bucket, position}` for one feature after a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub id: Uuid,
    pub bucket: Bucket,
    pub position: i64,
}

/// Everything a finalized drag needs persisted: the moved feature's bucket
/// write plus the renumbered placements of every feature in the affected
/// bucket(s).
#[derive(Debug, Clone, Serialize)]
pub struct BoardCommit {
    pub moved: Uuid,
    pub bucket: Bucket,
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, Default)]
pub struct RoadmapBoard {
    /// Unified list; list order is display order, buckets are interleaved
    /// freely while a drag is in flight.
    features: Vec<Feature>,
    dragging: Option<Uuid>,
    origin: Option<Bucket>,
    /// Pre-drag order, restored when a drag aborts.
    snapshot: Option<Vec<Feature>>,
}

impl RoadmapBoard {
    pub fn new(mut features: Vec<Feature>) -> Self {
        canonical_sort(&mut features);
        Self {
            features,
            dragging: None,
            origin: None,
            snapshot: None,
        }
    }

    /// Replace local state wholesale with server truth. Cancels any drag.
    pub fn replace(&mut self, mut features: Vec<Feature>) {
        canonical_sort(&mut features);
        self.features = features;
        self.dragging = None;
        self.origin = None;
        self.snapshot = None;
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Cards of one bucket, in display order.
    pub fn in_bucket(&self, bucket: Bucket) -> Vec<&Feature> {
        self.features.iter().filter(|f| f.bucket == bucket).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn index_of(&self, id: Uuid) -> Option<usize> {
        self.features.iter().position(|f| f.id == id)
    }

    /// Record which feature is being lifted. No-op for unknown ids (stale
    /// drag targets).
    pub fn begin_drag(&mut self, id: Uuid) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        self.dragging = Some(id);
        self.origin = Some(self.features[index].bucket);
        self.snapshot = Some(self.features.clone());
    }

    /// Live feedback while the pointer moves. Idempotent under repeated
    /// calls with the same target; never duplicates or drops a record.
    pub fn drag_over(&mut self, target: DragTarget) {
        let Some(drag_id) = self.dragging else {
            return;
        };
        match target {
            DragTarget::Card(target_id) => {
                if target_id == drag_id {
                    return;
                }
                let (Some(from), Some(to)) = (self.index_of(drag_id), self.index_of(target_id))
                else {
                    return;
                };
                // Only a cross-bucket hover moves anything; within a bucket
                // the card already renders where it would land.
                if self.features[from].bucket == self.features[to].bucket {
                    return;
                }
                self.splice(from, to, self.features[to].bucket);
            }
            DragTarget::Zone(bucket) => {
                let Some(from) = self.index_of(drag_id) else {
                    return;
                };
                if self.features[from].bucket != bucket {
                    self.features[from].bucket = bucket;
                }
            }
        }
    }

    /// Finalize placement. `None` aborts the drag: in-progress feedback is
    /// discarded and no commit is produced.
    pub fn end_drag(&mut self, target: Option<DragTarget>) -> Option<BoardCommit> {
        let drag_id = self.dragging.take()?;
        let origin = self.origin.take();
        let snapshot = self.snapshot.take();

        let Some(target) = target else {
            return self.abort(snapshot);
        };

        let dest = match target {
            DragTarget::Card(target_id) => {
                let (Some(from), Some(to)) = (self.index_of(drag_id), self.index_of(target_id))
                else {
                    return self.abort(snapshot);
                };
                if target_id == drag_id {
                    self.features[from].bucket
                } else {
                    let bucket = self.features[to].bucket;
                    self.splice(from, to, bucket);
                    bucket
                }
            }
            DragTarget::Zone(bucket) => {
                let Some(from) = self.index_of(drag_id) else {
                    return self.abort(snapshot);
                };
                // Adopt the bucket, keep the current relative position.
                self.features[from].bucket = bucket;
                bucket
            }
        };

        Some(self.finalize(drag_id, origin, dest))
    }

    /// Non-gesture entry point (HTTP, MCP): place a feature at `index`
    /// within `bucket`, or at the end when `index` is absent or past the
    /// last card. Equivalent to a begin/end drag pair.
    pub fn move_to(&mut self, id: Uuid, bucket: Bucket, index: Option<usize>) -> Option<BoardCommit> {
        let from = self.index_of(id)?;
        let origin = self.features[from].bucket;

        let mut lifted = self.features.remove(from);
        lifted.bucket = bucket;

        let member_indices: Vec<usize> = self
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.bucket == bucket)
            .map(|(i, _)| i)
            .collect();
        let insert_at = match index {
            Some(i) if i < member_indices.len() => member_indices[i],
            _ => member_indices
                .last()
                .map(|i| i + 1)
                .unwrap_or(self.features.len()),
        };
        self.features.insert(insert_at, lifted);

        // A direct move supersedes any gesture in flight.
        self.dragging = None;
        self.origin = None;
        self.snapshot = None;

        Some(self.finalize(id, Some(origin), bucket))
    }

    /// At rest, positions within each bucket must be the contiguous sequence
    /// 0..n-1 in display order.
    pub fn positions_contiguous(&self) -> bool {
        Bucket::ALL.iter().all(|&bucket| {
            self.features
                .iter()
                .filter(|f| f.bucket == bucket)
                .enumerate()
                .all(|(i, f)| f.position == i as i64)
        })
    }

    /// Array-move: remove at `from`, insert at `to` computed against the
    /// pre-removal list, adopting `bucket`.
    fn splice(&mut self, from: usize, to: usize, bucket: Bucket) {
        let mut lifted = self.features.remove(from);
        lifted.bucket = bucket;
        let to = to.min(self.features.len());
        self.features.insert(to, lifted);
    }

    fn abort(&mut self, snapshot: Option<Vec<Feature>>) -> Option<BoardCommit> {
        if let Some(previous) = snapshot {
            self.features = previous;
        }
        None
    }

    /// Renumber the affected bucket(s) to 0..n-1 in display order and build
    /// the commit.
    fn finalize(&mut self, moved: Uuid, origin: Option<Bucket>, dest: Bucket) -> BoardCommit {
        let mut affected = vec![dest];
        if let Some(origin) = origin {
            if origin != dest {
                affected.push(origin);
            }
        }

        let mut placements = Vec::new();
        for bucket in affected {
            let mut next = 0i64;
            for feature in self.features.iter_mut() {
                if feature.bucket == bucket {
                    feature.position = next;
                    placements.push(Placement {
                        id: feature.id,
                        bucket,
                        position: next,
                    });
                    next += 1;
                }
            }
        }

        BoardCommit {
            moved,
            bucket: dest,
            placements,
        }
    }
}

fn bucket_rank(bucket: Bucket) -> usize {
    match bucket {
        Bucket::Now => 0,
        Bucket::Next => 1,
        Bucket::Later => 2,
    }
}

fn canonical_sort(features: &mut [Feature]) {
    features.sort_by_key(|f| (bucket_rank(f.bucket), f.position));
}
