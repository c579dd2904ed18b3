use actix_web::{
    web::{self, Path, Query},
    HttpResponse, Responder,
};
use uuid::Uuid;

use crate::db::AppState;
use crate::project::models::{CreateProjectRequest, Project, ProjectListQuery, UpdateProjectRequest};
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Project Service",
    get,
    path = "/projects",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "List of projects", body = [Project])
    )
)]
pub async fn get_all_projects(
    query: Query<ProjectListQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data.get_all_projects().await {
        Ok(projects) => {
            let filtered: Vec<Project> = projects
                .into_iter()
                .filter(|p| {
                    query
                        .status
                        .as_deref()
                        .map(|s| p.status.eq_ignore_ascii_case(s))
                        .unwrap_or(true)
                        && query
                            .project_type
                            .as_deref()
                            .map(|t| p.project_type.eq_ignore_ascii_case(t))
                            .unwrap_or(true)
                })
                .collect();
            HttpResponse::Ok().json(filtered)
        }
        Err(e) => {
            log::error!("Failed to list projects: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to list projects"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Project Service",
    get,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project_by_id(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.get_project_by_id(&id.into_inner()).await {
        Ok(Some(project)) => HttpResponse::Ok().json(project),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Project not found")),
        Err(e) => {
            log::error!("Failed to load project: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load project"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Project Service",
    post,
    path = "/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_project(
    req: web::Json<CreateProjectRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if req.name.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Project name must not be empty"));
    }

    match data.insert_project(&req).await {
        Ok(project) => HttpResponse::Created().json(project),
        Err(e) => {
            log::error!("Failed to create project: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to create project"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Project Service",
    put,
    path = "/projects/{id}",
    request_body = UpdateProjectRequest,
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    id: Path<Uuid>,
    req: web::Json<UpdateProjectRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data.update_project(&id.into_inner(), &req).await {
        Ok(Some(project)) => HttpResponse::Ok().json(project),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Project not found")),
        Err(e) => {
            log::error!("Failed to update project: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to update project"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Project Service",
    delete,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.delete_project(&id.into_inner()).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Project not found")),
        Err(e) => {
            log::error!("Failed to delete project: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to delete project"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Project Service",
    get,
    path = "/projects/{id}/activities",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Activity log", body = [crate::activity::Activity])
    )
)]
pub async fn get_project_activities(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.get_activities_by_project(&id.into_inner()).await {
        Ok(activities) => HttpResponse::Ok().json(activities),
        Err(e) => {
            log::error!("Failed to list activities: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to list activities"))
        }
    }
}

/// Get estimate data for a project + type
#[utoipa::path(
    context_path = "/api",
    tag = "Project Service",
    get,
    path = "/projects/{id}/estimate/{project_type}",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("project_type" = String, Path, description = "Project type, e.g. anti_heeling")
    ),
    responses(
        (status = 200, description = "Estimate data blob"),
        (status = 404, description = "No estimate stored")
    )
)]
pub async fn get_estimate(
    path: Path<(Uuid, String)>,
    data: web::Data<AppState>,
) -> impl Responder {
    let (project_id, project_type) = path.into_inner();
    match data.get_estimate(&project_id, &project_type).await {
        Ok(Some(blob)) => HttpResponse::Ok().json(blob),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("No estimate stored")),
        Err(e) => {
            log::error!("Failed to load estimate: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load estimate"))
        }
    }
}

/// Store estimate data for a project + type
#[utoipa::path(
    context_path = "/api",
    tag = "Project Service",
    put,
    path = "/projects/{id}/estimate/{project_type}",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("project_type" = String, Path, description = "Project type, e.g. anti_heeling")
    ),
    responses(
        (status = 204, description = "Estimate stored"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn put_estimate(
    path: Path<(Uuid, String)>,
    body: web::Json<serde_json::Value>,
    data: web::Data<AppState>,
) -> impl Responder {
    let (project_id, project_type) = path.into_inner();

    match data.get_project_by_id(&project_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::not_found("Project not found"))
        }
        Err(e) => {
            log::error!("Failed to load project: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load project"));
        }
    }

    match data.upsert_estimate(&project_id, &project_type, &body).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            log::error!("Failed to store estimate: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to store estimate"))
        }
    }
}
