use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::project::{self, ProjectStatus};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new project
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Project name
    pub name: String,
    /// Budget category the project draws from
    pub category_id: i32,
    /// Budget pool the project belongs to
    pub pool_id: i32,
    /// Project manager user ID
    pub manager_id: i32,
    /// Supervising user ID
    pub supervisor_id: i32,
}

/// Project response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub pool_id: i32,
    pub manager_id: i32,
    pub supervisor_id: i32,
    pub status: ProjectStatus,
    /// Sum of approved proposal amounts; written only by proposal approval
    pub approved_budget: Decimal,
    pub version: i32,
}

impl From<project::Model> for ProjectResponse {
    fn from(model: project::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category_id: model.category_id,
            pool_id: model.pool_id,
            manager_id: model.manager_id,
            supervisor_id: model.supervisor_id,
            status: model.status,
            approved_budget: model.approved_budget,
            version: model.version,
        }
    }
}

/// Create a new project
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created successfully", body = ApiResponse<ProjectResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectResponse>>), StatusCode> {
    trace!("Entering create_project function");
    debug!(
        "Creating project '{}' in category {} managed by user {}",
        request.name, request.category_id, request.manager_id
    );

    let new_project = project::ActiveModel {
        name: Set(request.name.clone()),
        category_id: Set(request.category_id),
        pool_id: Set(request.pool_id),
        manager_id: Set(request.manager_id),
        supervisor_id: Set(request.supervisor_id),
        status: Set(ProjectStatus::Draft),
        approved_budget: Set(Decimal::ZERO),
        version: Set(0),
        ..Default::default()
    };

    match new_project.insert(&state.db).await {
        Ok(project_model) => {
            info!("Project created successfully with ID: {}", project_model.id);
            let response = ApiResponse {
                data: ProjectResponse::from(project_model),
                message: "Project created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create project '{}': {}", request.name, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all projects
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "projects",
    responses(
        (status = 200, description = "Projects retrieved successfully", body = ApiResponse<Vec<ProjectResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_projects(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProjectResponse>>>, StatusCode> {
    trace!("Entering get_projects function");

    match project::Entity::find().all(&state.db).await {
        Ok(projects) => {
            debug!("Retrieved {} projects", projects.len());
            let response = ApiResponse {
                data: projects.into_iter().map(ProjectResponse::from).collect(),
                message: "Projects retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve projects: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific project by ID
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}",
    tag = "projects",
    params(
        ("project_id" = i32, Path, description = "Project ID"),
    ),
    responses(
        (status = 200, description = "Project retrieved successfully", body = ApiResponse<ProjectResponse>),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_project(
    Path(project_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProjectResponse>>, StatusCode> {
    trace!("Entering get_project function for project_id: {}", project_id);

    match project::Entity::find_by_id(project_id).one(&state.db).await {
        Ok(Some(project_model)) => {
            info!("Successfully retrieved project {}", project_id);
            let response = ApiResponse {
                data: ProjectResponse::from(project_model),
                message: "Project retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Project with ID {} not found", project_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve project {}: {}", project_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
