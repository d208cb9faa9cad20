use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    schemars::JsonSchema,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use blueprint_core::board::BoardSession;
use blueprint_core::db::Database;
use blueprint_core::models::*;

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetRoadmapRequest {
    #[schemars(description = "The workspace ID to load the roadmap for")]
    pub workspace_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateFeatureRequest {
    #[schemars(description = "The workspace ID the feature belongs to")]
    pub workspace_id: String,
    #[schemars(description = "Feature title")]
    pub title: String,
    #[schemars(description = "Optional feature description")]
    pub description: Option<String>,
    #[schemars(description = "Target bucket: now, next or later")]
    pub bucket: String,
    #[schemars(description = "Priority: low, medium or high")]
    pub priority: Option<String>,
    #[schemars(description = "Tags for the feature")]
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MoveFeatureRequest {
    #[schemars(description = "The feature ID to move")]
    pub feature_id: String,
    #[schemars(description = "Destination bucket: now, next or later")]
    pub bucket: String,
    #[schemars(description = "Index within the destination bucket; omitted means append")]
    pub index: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteFeatureRequest {
    #[schemars(description = "The feature ID to delete")]
    pub feature_id: String,
}

#[derive(Debug, Serialize)]
pub struct MoveResult {
    pub moved: Uuid,
    pub bucket: Bucket,
    pub roadmap: RoadmapView,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }

    fn parse_bucket(s: &str) -> Result<Bucket, McpError> {
        Bucket::from_str(s)
            .ok_or_else(|| McpError::invalid_params(format!("Invalid bucket: {}", s), None))
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "Get a workspace's roadmap with features grouped by bucket")]
    async fn get_roadmap(
        &self,
        params: Parameters<GetRoadmapRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let workspace_id = Self::parse_uuid(&req.workspace_id)?;

        let roadmap = self.db.roadmap_for_workspace(workspace_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let features = self.db.list_features(roadmap.id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let json = serde_json::to_string_pretty(&RoadmapView::build(roadmap, features))
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Create a feature on a workspace's roadmap")]
    async fn create_feature(
        &self,
        params: Parameters<CreateFeatureRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let workspace_id = Self::parse_uuid(&req.workspace_id)?;
        let bucket = Self::parse_bucket(&req.bucket)?;
        let priority = match req.priority.as_deref() {
            Some(p) => Some(Priority::from_str(p).ok_or_else(|| {
                McpError::invalid_params(format!("Invalid priority: {}", p), None)
            })?),
            None => None,
        };

        let roadmap = self.db.roadmap_for_workspace(workspace_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let feature = self.db.create_feature(
            roadmap.id,
            CreateFeatureInput {
                title: req.title,
                description: req.description,
                bucket,
                priority,
                tags: req.tags,
            },
            FeaturePlacement::Append,
        )
        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Feature created with id: {}",
            feature.id
        ))]))
    }

    #[tool(description = "Move a feature to a bucket and position on the board")]
    async fn move_feature(
        &self,
        params: Parameters<MoveFeatureRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let feature_id = Self::parse_uuid(&req.feature_id)?;
        let bucket = Self::parse_bucket(&req.bucket)?;

        let feature = self.db.get_feature(feature_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
            .ok_or_else(|| McpError::invalid_params("Feature not found", None))?;

        let mut session = BoardSession::open(self.db.clone(), feature.workspace_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let commit = session
            .move_feature(feature_id, bucket, req.index.map(|i| i as usize))
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
            .ok_or_else(|| McpError::invalid_params("Feature not on the board", None))?;

        let roadmap = session.roadmap().clone();
        let features = self.db.list_features(roadmap.id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let result = MoveResult {
            moved: commit.moved,
            bucket: commit.bucket,
            roadmap: RoadmapView::build(roadmap, features),
        };

        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a feature from the roadmap")]
    async fn delete_feature(
        &self,
        params: Parameters<DeleteFeatureRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let feature_id = Self::parse_uuid(&req.feature_id)?;

        let deleted = self.db.delete_feature(feature_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        if !deleted {
            return Err(McpError::invalid_params("Feature not found", None));
        }

        Ok(CallToolResult::success(vec![Content::text("Feature deleted")]))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Blueprint MCP server for roadmap planning".into()),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
