use uuid::Uuid;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Bucket, Roadmap};

use super::{BoardCommit, DragTarget, RoadmapBoard};

/// A board bound to one workspace's roadmap.
///
/// Drag operations mutate the in-memory board immediately; a finalized drag
/// is persisted as one [`BoardCommit`]. When persistence fails the session
/// discards local state and reloads from storage, so the board never drifts
/// from server truth. `&mut self` on every mutating method keeps commits
/// strictly sequential within a session.
pub struct BoardSession {
    db: Database,
    workspace_id: Uuid,
    roadmap: Roadmap,
    board: RoadmapBoard,
}

impl BoardSession {
    /// Load the board for a workspace, creating the roadmap on first access.
    pub fn open(db: Database, workspace_id: Uuid) -> Result<Self> {
        let roadmap = db.roadmap_for_workspace(workspace_id)?;
        let features = db.list_features(roadmap.id)?;
        Ok(Self {
            db,
            workspace_id,
            roadmap,
            board: RoadmapBoard::new(features),
        })
    }

    pub fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn board(&self) -> &RoadmapBoard {
        &self.board
    }

    /// Switch to another workspace: discard the in-memory list and refetch.
    pub fn on_workspace_change(&mut self, workspace_id: Uuid) -> Result<()> {
        self.workspace_id = workspace_id;
        self.roadmap = self.db.roadmap_for_workspace(workspace_id)?;
        self.reload()
    }

    pub fn begin_drag(&mut self, id: Uuid) {
        self.board.begin_drag(id);
    }

    pub fn drag_over(&mut self, target: DragTarget) {
        self.board.drag_over(target);
    }

    /// Finalize a drag and persist it. An aborted drag (`None` target, or a
    /// stale card id) issues no writes. On a storage failure the board is
    /// reloaded wholesale and the error is returned for the caller to
    /// surface.
    pub fn end_drag(&mut self, target: Option<DragTarget>) -> Result<Option<BoardCommit>> {
        let Some(commit) = self.board.end_drag(target) else {
            return Ok(None);
        };
        self.persist(commit)
    }

    /// Direct move (HTTP, MCP): place a feature at `index` within `bucket`.
    pub fn move_feature(
        &mut self,
        id: Uuid,
        bucket: Bucket,
        index: Option<usize>,
    ) -> Result<Option<BoardCommit>> {
        let Some(commit) = self.board.move_to(id, bucket, index) else {
            return Ok(None);
        };
        self.persist(commit)
    }

    fn persist(&mut self, commit: BoardCommit) -> Result<Option<BoardCommit>> {
        match self.db.apply_board_commit(&commit) {
            Ok(()) => Ok(Some(commit)),
            Err(err) => {
                tracing::warn!(workspace = %self.workspace_id, error = %err,
                    "board commit failed, reloading from storage");
                self.reload()?;
                Err(err)
            }
        }
    }

    fn reload(&mut self) -> Result<()> {
        let features = self.db.list_features(self.roadmap.id)?;
        self.board.replace(features);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bucket, CreateFeatureInput, CreateWorkspaceInput, FeaturePlacement};

    fn session_with(titles_now: &[&str], titles_next: &[&str]) -> (Database, BoardSession) {
        let db = Database::open_in_memory().expect("open db");
        db.migrate().expect("migrate");
        let ws = db
            .create_workspace(CreateWorkspaceInput {
                name: "Acme".into(),
                owner: None,
            })
            .expect("workspace");
        let roadmap = db.roadmap_for_workspace(ws.id).expect("roadmap");
        for title in titles_now {
            db.create_feature(
                roadmap.id,
                CreateFeatureInput {
                    title: (*title).into(),
                    description: None,
                    bucket: Bucket::Now,
                    priority: None,
                    tags: vec![],
                },
                FeaturePlacement::Append,
            )
            .expect("feature");
        }
        for title in titles_next {
            db.create_feature(
                roadmap.id,
                CreateFeatureInput {
                    title: (*title).into(),
                    description: None,
                    bucket: Bucket::Next,
                    priority: None,
                    tags: vec![],
                },
                FeaturePlacement::Append,
            )
            .expect("feature");
        }
        let session = BoardSession::open(db.clone(), ws.id).expect("session");
        (db, session)
    }

    fn id_of(session: &BoardSession, title: &str) -> uuid::Uuid {
        session
            .board()
            .features()
            .iter()
            .find(|f| f.title == title)
            .map(|f| f.id)
            .expect("feature by title")
    }

    #[test]
    fn drag_to_empty_zone_persists_both_buckets() {
        let (db, mut session) = session_with(&["X", "Y"], &[]);
        let x = id_of(&session, "X");

        session.begin_drag(x);
        let commit = session
            .end_drag(Some(DragTarget::Zone(Bucket::Next)))
            .expect("persisted")
            .expect("commit");
        assert_eq!(commit.bucket, Bucket::Next);

        let fresh = db.list_features(session.roadmap().id).expect("list");
        let y = fresh.iter().find(|f| f.title == "Y").unwrap();
        let x = fresh.iter().find(|f| f.title == "X").unwrap();
        assert_eq!((y.bucket, y.position), (Bucket::Now, 0));
        assert_eq!((x.bucket, x.position), (Bucket::Next, 0));
    }

    #[test]
    fn aborted_drag_issues_no_writes() {
        let (db, mut session) = session_with(&["X", "Y"], &["Z"]);
        let x = id_of(&session, "X");
        let z = id_of(&session, "Z");
        let before: Vec<(String, i64)> = db
            .list_features(session.roadmap().id)
            .unwrap()
            .into_iter()
            .map(|f| (f.title, f.position))
            .collect();

        session.begin_drag(x);
        session.drag_over(DragTarget::Card(z));
        session.drag_over(DragTarget::Zone(Bucket::Later));
        assert!(session.end_drag(None).unwrap().is_none());

        let after: Vec<(String, i64)> = db
            .list_features(session.roadmap().id)
            .unwrap()
            .into_iter()
            .map(|f| (f.title, f.position))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn failed_commit_reloads_server_truth() {
        let (db, mut session) = session_with(&["X", "Y"], &[]);
        let x = id_of(&session, "X");

        // Make every feature update fail while reads keep working.
        db.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER block_feature_updates BEFORE UPDATE ON features
                 BEGIN SELECT RAISE(ABORT, 'storage offline'); END;",
            )
            .unwrap();

        session.begin_drag(x);
        let err = session.end_drag(Some(DragTarget::Zone(Bucket::Next)));
        assert!(err.is_err());

        // Local optimistic state was replaced with what storage still holds.
        let now: Vec<&str> = session
            .board()
            .in_bucket(Bucket::Now)
            .iter()
            .map(|f| f.title.as_str())
            .collect();
        assert_eq!(now, vec!["X", "Y"]);
        assert!(session.board().in_bucket(Bucket::Next).is_empty());
    }

    #[test]
    fn workspace_change_discards_and_refetches() {
        let (db, mut session) = session_with(&["X"], &[]);
        let other = db
            .create_workspace(CreateWorkspaceInput {
                name: "Beta".into(),
                owner: None,
            })
            .unwrap();
        let other_roadmap = db.roadmap_for_workspace(other.id).unwrap();
        db.create_feature(
            other_roadmap.id,
            CreateFeatureInput {
                title: "Orbit".into(),
                description: None,
                bucket: Bucket::Later,
                priority: None,
                tags: vec![],
            },
            FeaturePlacement::Append,
        )
        .unwrap();

        session.on_workspace_change(other.id).unwrap();

        assert_eq!(session.workspace_id(), other.id);
        assert_eq!(session.board().len(), 1);
        assert_eq!(session.board().features()[0].title, "Orbit");
    }
}
