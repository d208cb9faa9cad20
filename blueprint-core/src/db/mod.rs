//! SQLite-backed store.
//!
//! `Database` is a cheap-to-clone handle over a shared connection. All access
//! goes through short synchronous statements; callers on async runtimes hold
//! the lock only for the duration of one statement batch.

mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::board::BoardCommit;
use crate::error::{Error, Result};
use crate::models::*;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database at the platform data directory, honoring the
    /// `BLUEPRINT_DB` override.
    pub fn open_default() -> Result<Self> {
        let path = default_db_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!(path = %path.display(), "opening database");
        Self::open(&path)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Apply the schema. Idempotent.
    pub fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    // === Workspaces ===

    pub fn create_workspace(&self, input: CreateWorkspaceInput) -> Result<Workspace> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("workspace name must not be empty".into()));
        }

        let workspace = Workspace {
            id: Uuid::new_v4(),
            name,
            owner: input.owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.conn()?.execute(
            "INSERT INTO workspaces (id, name, owner, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                workspace.id.to_string(),
                workspace.name,
                workspace.owner,
                workspace.created_at.to_rfc3339(),
                workspace.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(workspace)
    }

    pub fn get_workspace(&self, id: Uuid) -> Result<Option<Workspace>> {
        let workspace = self
            .conn()?
            .query_row(
                "SELECT id, name, owner, created_at, updated_at
                 FROM workspaces WHERE id = ?1",
                params![id.to_string()],
                workspace_from_row,
            )
            .optional()?;
        Ok(workspace)
    }

    pub fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, owner, created_at, updated_at
             FROM workspaces ORDER BY created_at",
        )?;
        let workspaces = stmt
            .query_map([], workspace_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(workspaces)
    }

    pub fn update_workspace(
        &self,
        id: Uuid,
        input: UpdateWorkspaceInput,
    ) -> Result<Option<Workspace>> {
        let Some(mut workspace) = self.get_workspace(id)? else {
            return Ok(None);
        };

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::Validation("workspace name must not be empty".into()));
            }
            workspace.name = name;
        }
        if let Some(owner) = input.owner {
            workspace.owner = Some(owner);
        }
        workspace.updated_at = Utc::now();

        self.conn()?.execute(
            "UPDATE workspaces SET name = ?1, owner = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                workspace.name,
                workspace.owner,
                workspace.updated_at.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        Ok(Some(workspace))
    }

    pub fn delete_workspace(&self, id: Uuid) -> Result<bool> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM workspaces WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }

    // === Roadmaps ===

    /// Fetch the workspace's roadmap, creating it on first access.
    ///
    /// The unique index on `roadmaps(workspace_id)` plus the conflict-tolerant
    /// insert makes concurrent first loads converge on a single row.
    pub fn roadmap_for_workspace(&self, workspace_id: Uuid) -> Result<Roadmap> {
        if self.get_workspace(workspace_id)?.is_none() {
            return Err(Error::NotFound("workspace"));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO roadmaps (id, workspace_id, created_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(workspace_id) DO NOTHING",
            params![
                Uuid::new_v4().to_string(),
                workspace_id.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        let roadmap = conn.query_row(
            "SELECT id, workspace_id, created_at FROM roadmaps WHERE workspace_id = ?1",
            params![workspace_id.to_string()],
            roadmap_from_row,
        )?;
        Ok(roadmap)
    }

    // === Features ===

    /// All live features of a roadmap in display order: bucket columns
    /// now, next, later, each sorted by position.
    pub fn list_features(&self, roadmap_id: Uuid) -> Result<Vec<Feature>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, roadmap_id, workspace_id, owner, title, description, bucket, priority,
                    tags, position, created_at, updated_at, deleted_at
             FROM features
             WHERE roadmap_id = ?1 AND deleted_at IS NULL
             ORDER BY CASE bucket WHEN 'now' THEN 0 WHEN 'next' THEN 1 ELSE 2 END,
                      position, created_at",
        )?;
        let features = stmt
            .query_map(params![roadmap_id.to_string()], feature_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(features)
    }

    pub fn create_feature(
        &self,
        roadmap_id: Uuid,
        input: CreateFeatureInput,
        placement: FeaturePlacement,
    ) -> Result<Feature> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("feature title must not be empty".into()));
        }

        let conn = self.conn()?;
        let (workspace_id, owner): (String, Option<String>) = conn
            .query_row(
                "SELECT w.id, w.owner FROM roadmaps r
                 JOIN workspaces w ON w.id = r.workspace_id
                 WHERE r.id = ?1",
                params![roadmap_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(Error::NotFound("roadmap"))?;

        let bucket = input.bucket;
        let position = match placement {
            FeaturePlacement::Append => conn.query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM features
                 WHERE roadmap_id = ?1 AND bucket = ?2 AND deleted_at IS NULL",
                params![roadmap_id.to_string(), bucket.as_str()],
                |row| row.get::<_, i64>(0),
            )?,
            FeaturePlacement::Sentinel => DRAFT_POSITION,
        };

        let feature = Feature {
            id: Uuid::new_v4(),
            roadmap_id,
            workspace_id: Uuid::parse_str(&workspace_id).map_err(|_| Error::NotFound("workspace"))?,
            owner,
            title,
            description: input.description,
            bucket,
            priority: input.priority.unwrap_or(Priority::Medium),
            tags: input.tags,
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        conn.execute(
            "INSERT INTO features (id, roadmap_id, workspace_id, owner, title, description,
                                   bucket, priority, tags, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                feature.id.to_string(),
                feature.roadmap_id.to_string(),
                feature.workspace_id.to_string(),
                feature.owner,
                feature.title,
                feature.description,
                feature.bucket.as_str(),
                feature.priority.as_str(),
                serde_json::to_string(&feature.tags)?,
                feature.position,
                feature.created_at.to_rfc3339(),
                feature.updated_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!(id = %feature.id, bucket = feature.bucket.as_str(), position, "feature created");
        Ok(feature)
    }

    pub fn get_feature(&self, id: Uuid) -> Result<Option<Feature>> {
        let feature = self
            .conn()?
            .query_row(
                "SELECT id, roadmap_id, workspace_id, owner, title, description, bucket, priority,
                        tags, position, created_at, updated_at, deleted_at
                 FROM features WHERE id = ?1 AND deleted_at IS NULL",
                params![id.to_string()],
                feature_from_row,
            )
            .optional()?;
        Ok(feature)
    }

    /// Partial update through the edit form. Bucket changes here do not
    /// renumber siblings; the next board commit restores contiguity.
    pub fn update_feature(&self, id: Uuid, input: UpdateFeatureInput) -> Result<Option<Feature>> {
        let Some(mut feature) = self.get_feature(id)? else {
            return Ok(None);
        };

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(Error::Validation("feature title must not be empty".into()));
            }
            feature.title = title;
        }
        if let Some(description) = input.description {
            feature.description = Some(description);
        }
        if let Some(bucket) = input.bucket {
            feature.bucket = bucket;
        }
        if let Some(priority) = input.priority {
            feature.priority = priority;
        }
        if let Some(tags) = input.tags {
            feature.tags = tags;
        }
        feature.updated_at = Utc::now();

        self.conn()?.execute(
            "UPDATE features SET title = ?1, description = ?2, bucket = ?3, priority = ?4,
                                 tags = ?5, updated_at = ?6
             WHERE id = ?7 AND deleted_at IS NULL",
            params![
                feature.title,
                feature.description,
                feature.bucket.as_str(),
                feature.priority.as_str(),
                serde_json::to_string(&feature.tags)?,
                feature.updated_at.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        Ok(Some(feature))
    }

    /// Soft delete. Remaining siblings keep their positions; gaps are
    /// tolerated because relative order, not contiguity, drives display.
    pub fn delete_feature(&self, id: Uuid) -> Result<bool> {
        let deleted = self.conn()?.execute(
            "UPDATE features SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![Utc::now().to_rfc3339(), id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    /// Persist a finalized drag: the moved feature's bucket write plus the
    /// batched sibling renumbering, in one transaction. A failure leaves
    /// storage exactly as it was, so callers recover by refetching.
    pub fn apply_board_commit(&self, commit: &BoardCommit) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            "UPDATE features SET bucket = ?1, updated_at = ?2 WHERE id = ?3 AND deleted_at IS NULL",
            params![commit.bucket.as_str(), now, commit.moved.to_string()],
        )?;

        for placement in &commit.placements {
            tx.execute(
                "UPDATE features SET bucket = ?1, position = ?2, updated_at = ?3
                 WHERE id = ?4 AND deleted_at IS NULL",
                params![
                    placement.bucket.as_str(),
                    placement.position,
                    now,
                    placement.id.to_string(),
                ],
            )?;
        }

        tx.commit()?;
        tracing::debug!(moved = %commit.moved, bucket = commit.bucket.as_str(),
            siblings = commit.placements.len(), "board commit applied");
        Ok(())
    }

    // === Documents ===

    pub fn create_document(&self, workspace_id: Uuid, input: CreateDocumentInput) -> Result<Document> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("document title must not be empty".into()));
        }
        if self.get_workspace(workspace_id)?.is_none() {
            return Err(Error::NotFound("workspace"));
        }

        let document = Document {
            id: Uuid::new_v4(),
            workspace_id,
            kind: input.kind,
            title,
            body: input.body,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.conn()?.execute(
            "INSERT INTO documents (id, workspace_id, kind, title, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                document.id.to_string(),
                document.workspace_id.to_string(),
                document.kind.as_str(),
                document.title,
                document.body,
                document.created_at.to_rfc3339(),
                document.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(document)
    }

    pub fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        let document = self
            .conn()?
            .query_row(
                "SELECT id, workspace_id, kind, title, body, created_at, updated_at
                 FROM documents WHERE id = ?1",
                params![id.to_string()],
                document_from_row,
            )
            .optional()?;
        Ok(document)
    }

    pub fn list_documents(&self, workspace_id: Uuid) -> Result<Vec<Document>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, kind, title, body, created_at, updated_at
             FROM documents WHERE workspace_id = ?1 ORDER BY created_at",
        )?;
        let documents = stmt
            .query_map(params![workspace_id.to_string()], document_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(documents)
    }

    pub fn update_document(&self, id: Uuid, input: UpdateDocumentInput) -> Result<Option<Document>> {
        let Some(mut document) = self.get_document(id)? else {
            return Ok(None);
        };

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(Error::Validation("document title must not be empty".into()));
            }
            document.title = title;
        }
        if let Some(body) = input.body {
            document.body = body;
        }
        document.updated_at = Utc::now();

        self.conn()?.execute(
            "UPDATE documents SET title = ?1, body = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                document.title,
                document.body,
                document.updated_at.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        Ok(Some(document))
    }

    pub fn delete_document(&self, id: Uuid) -> Result<bool> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM documents WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }
}

fn default_db_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("BLUEPRINT_DB") {
        return Ok(PathBuf::from(path));
    }
    let dirs = directories::ProjectDirs::from("dev", "blueprint-labs", "blueprint").ok_or_else(
        || Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory")),
    )?;
    Ok(dirs.data_dir().join("blueprint.db"))
}

// === Row mapping ===

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct ColumnError(String);

fn column_err(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(ColumnError(message)),
    )
}

fn parse_uuid(idx: usize, value: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&value).map_err(|e| column_err(idx, format!("invalid uuid: {}", e)))
}

fn parse_ts(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .map_err(|e| column_err(idx, format!("invalid timestamp: {}", e)))
}

fn workspace_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: parse_uuid(0, row.get(0)?)?,
        name: row.get(1)?,
        owner: row.get(2)?,
        created_at: parse_ts(3, row.get(3)?)?,
        updated_at: parse_ts(4, row.get(4)?)?,
    })
}

fn roadmap_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Roadmap> {
    Ok(Roadmap {
        id: parse_uuid(0, row.get(0)?)?,
        workspace_id: parse_uuid(1, row.get(1)?)?,
        created_at: parse_ts(2, row.get(2)?)?,
    })
}

fn feature_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Feature> {
    let bucket: String = row.get(6)?;
    let priority: String = row.get(7)?;
    let tags: String = row.get(8)?;
    let deleted_at: Option<String> = row.get(12)?;

    Ok(Feature {
        id: parse_uuid(0, row.get(0)?)?,
        roadmap_id: parse_uuid(1, row.get(1)?)?,
        workspace_id: parse_uuid(2, row.get(2)?)?,
        owner: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        bucket: Bucket::from_str(&bucket)
            .ok_or_else(|| column_err(6, format!("invalid bucket: {}", bucket)))?,
        priority: Priority::from_str(&priority)
            .ok_or_else(|| column_err(7, format!("invalid priority: {}", priority)))?,
        tags: serde_json::from_str(&tags)
            .map_err(|e| column_err(8, format!("invalid tags: {}", e)))?,
        position: row.get(9)?,
        created_at: parse_ts(10, row.get(10)?)?,
        updated_at: parse_ts(11, row.get(11)?)?,
        deleted_at: deleted_at.map(|v| parse_ts(12, v)).transpose()?,
    })
}

fn document_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let kind: String = row.get(2)?;
    Ok(Document {
        id: parse_uuid(0, row.get(0)?)?,
        workspace_id: parse_uuid(1, row.get(1)?)?,
        kind: DocumentKind::from_str(&kind)
            .ok_or_else(|| column_err(2, format!("invalid document kind: {}", kind)))?,
        title: row.get(3)?,
        body: row.get(4)?,
        created_at: parse_ts(5, row.get(5)?)?,
        updated_at: parse_ts(6, row.get(6)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Placement;

    fn test_db() -> Database {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.migrate().expect("migrate");
        db
    }

    fn test_workspace(db: &Database) -> Workspace {
        db.create_workspace(CreateWorkspaceInput {
            name: "Acme".into(),
            owner: Some("user-1".into()),
        })
        .expect("create workspace")
    }

    fn feature_input(title: &str, bucket: Bucket) -> CreateFeatureInput {
        CreateFeatureInput {
            title: title.into(),
            description: None,
            bucket,
            priority: None,
            tags: vec![],
        }
    }

    #[test]
    fn create_workspace_rejects_empty_name() {
        let db = test_db();
        let err = db
            .create_workspace(CreateWorkspaceInput {
                name: "   ".into(),
                owner: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn roadmap_is_created_lazily_and_once() {
        let db = test_db();
        let ws = test_workspace(&db);

        let first = db.roadmap_for_workspace(ws.id).unwrap();
        let second = db.roadmap_for_workspace(ws.id).unwrap();
        assert_eq!(first.id, second.id);

        let count: i64 = db
            .conn()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM roadmaps WHERE workspace_id = ?1",
                params![ws.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn roadmap_for_unknown_workspace_is_not_found() {
        let db = test_db();
        let err = db.roadmap_for_workspace(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound("workspace")));
    }

    #[test]
    fn create_assigns_sequential_positions_per_bucket() {
        let db = test_db();
        let ws = test_workspace(&db);
        let roadmap = db.roadmap_for_workspace(ws.id).unwrap();

        let first = db
            .create_feature(roadmap.id, feature_input("Auth", Bucket::Now), FeaturePlacement::Append)
            .unwrap();
        let second = db
            .create_feature(roadmap.id, feature_input("Billing", Bucket::Now), FeaturePlacement::Append)
            .unwrap();
        let other_bucket = db
            .create_feature(roadmap.id, feature_input("Search", Bucket::Next), FeaturePlacement::Append)
            .unwrap();

        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);
        assert_eq!(other_bucket.position, 0);
    }

    #[test]
    fn draft_acceptance_uses_the_sentinel_position() {
        let db = test_db();
        let ws = test_workspace(&db);
        let roadmap = db.roadmap_for_workspace(ws.id).unwrap();

        db.create_feature(roadmap.id, feature_input("Auth", Bucket::Now), FeaturePlacement::Append)
            .unwrap();
        let draft = db
            .create_feature(roadmap.id, feature_input("AI idea", Bucket::Now), FeaturePlacement::Sentinel)
            .unwrap();

        assert_eq!(draft.position, DRAFT_POSITION);
        // Sentinel rows still sort after their bucket's appended rows.
        let features = db.list_features(roadmap.id).unwrap();
        assert_eq!(features.last().unwrap().id, draft.id);
    }

    #[test]
    fn create_feature_rejects_empty_title_before_storage() {
        let db = test_db();
        let ws = test_workspace(&db);
        let roadmap = db.roadmap_for_workspace(ws.id).unwrap();

        let err = db
            .create_feature(roadmap.id, feature_input("  ", Bucket::Now), FeaturePlacement::Append)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(db.list_features(roadmap.id).unwrap().is_empty());
    }

    #[test]
    fn priority_and_bucket_keep_their_storage_spellings() {
        let db = test_db();
        let ws = test_workspace(&db);
        let roadmap = db.roadmap_for_workspace(ws.id).unwrap();

        let feature = db
            .create_feature(
                roadmap.id,
                CreateFeatureInput {
                    priority: Some(Priority::High),
                    ..feature_input("Auth", Bucket::Later)
                },
                FeaturePlacement::Append,
            )
            .unwrap();

        let (bucket, priority): (String, String) = db
            .conn()
            .unwrap()
            .query_row(
                "SELECT bucket, priority FROM features WHERE id = ?1",
                params![feature.id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(bucket, "later");
        assert_eq!(priority, "High");
    }

    #[test]
    fn delete_leaves_sibling_positions_untouched() {
        let db = test_db();
        let ws = test_workspace(&db);
        let roadmap = db.roadmap_for_workspace(ws.id).unwrap();

        let a = db
            .create_feature(roadmap.id, feature_input("A", Bucket::Now), FeaturePlacement::Append)
            .unwrap();
        let b = db
            .create_feature(roadmap.id, feature_input("B", Bucket::Now), FeaturePlacement::Append)
            .unwrap();
        let c = db
            .create_feature(roadmap.id, feature_input("C", Bucket::Now), FeaturePlacement::Append)
            .unwrap();

        assert!(db.delete_feature(b.id).unwrap());

        let remaining = db.list_features(roadmap.id).unwrap();
        let ids: Vec<Uuid> = remaining.iter().map(|f| f.id).collect();
        let positions: Vec<i64> = remaining.iter().map(|f| f.position).collect();
        // Relative order preserved; the position sequence keeps its gap.
        assert_eq!(ids, vec![a.id, c.id]);
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn update_feature_merges_partial_input() {
        let db = test_db();
        let ws = test_workspace(&db);
        let roadmap = db.roadmap_for_workspace(ws.id).unwrap();

        let feature = db
            .create_feature(roadmap.id, feature_input("Auth", Bucket::Now), FeaturePlacement::Append)
            .unwrap();

        let updated = db
            .update_feature(
                feature.id,
                UpdateFeatureInput {
                    title: Some("Auth v2".into()),
                    tags: Some(vec!["security".into()]),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Auth v2");
        assert_eq!(updated.tags, vec!["security".to_string()]);
        assert_eq!(updated.bucket, Bucket::Now);
        assert_eq!(updated.position, feature.position);
    }

    #[test]
    fn board_commit_is_atomic() {
        let db = test_db();
        let ws = test_workspace(&db);
        let roadmap = db.roadmap_for_workspace(ws.id).unwrap();

        let x = db
            .create_feature(roadmap.id, feature_input("X", Bucket::Now), FeaturePlacement::Append)
            .unwrap();
        let y = db
            .create_feature(roadmap.id, feature_input("Y", Bucket::Now), FeaturePlacement::Append)
            .unwrap();

        let commit = BoardCommit {
            moved: x.id,
            bucket: Bucket::Next,
            placements: vec![
                Placement { id: y.id, bucket: Bucket::Now, position: 0 },
                Placement { id: x.id, bucket: Bucket::Next, position: 0 },
            ],
        };
        db.apply_board_commit(&commit).unwrap();

        let features = db.list_features(roadmap.id).unwrap();
        let y_row = features.iter().find(|f| f.id == y.id).unwrap();
        let x_row = features.iter().find(|f| f.id == x.id).unwrap();
        assert_eq!((y_row.bucket, y_row.position), (Bucket::Now, 0));
        assert_eq!((x_row.bucket, x_row.position), (Bucket::Next, 0));
    }

    #[test]
    fn database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blueprint.db");

        {
            let db = Database::open(&path).unwrap();
            db.migrate().unwrap();
            test_workspace(&db);
        }

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        assert_eq!(db.list_workspaces().unwrap().len(), 1);
    }

    #[test]
    fn document_crud_roundtrip() {
        let db = test_db();
        let ws = test_workspace(&db);

        let doc = db
            .create_document(
                ws.id,
                CreateDocumentInput {
                    kind: DocumentKind::Prd,
                    title: "MVP PRD".into(),
                    body: "# Problem\n...".into(),
                },
            )
            .unwrap();

        let fetched = db.get_document(doc.id).unwrap().unwrap();
        assert_eq!(fetched.kind, DocumentKind::Prd);

        let updated = db
            .update_document(
                doc.id,
                UpdateDocumentInput {
                    body: Some("# Problem\nRevised".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.body, "# Problem\nRevised");

        assert!(db.delete_document(doc.id).unwrap());
        assert!(db.get_document(doc.id).unwrap().is_none());
    }

    #[test]
    fn deleting_a_workspace_cascades() {
        let db = test_db();
        let ws = test_workspace(&db);
        let roadmap = db.roadmap_for_workspace(ws.id).unwrap();
        db.create_feature(roadmap.id, feature_input("Auth", Bucket::Now), FeaturePlacement::Append)
            .unwrap();

        assert!(db.delete_workspace(ws.id).unwrap());
        let count: i64 = db
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM features", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
