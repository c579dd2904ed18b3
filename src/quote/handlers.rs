//! Quote endpoints: item preview, document generation, persisted line items.

use actix_web::{
    web::{self, Path},
    HttpResponse, Responder,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::activity::ActivityEntry;
use crate::db::AppState;
use crate::project::models::Project;
use crate::ErrorResponse;

use super::document::{self, QuoteContext, QuoteFormat};
use super::estimate::EstimateData;
use super::items::build_items;
use super::models::{CreateLineItemRequest, LineItem, StoredLineItem};
use super::templates::TemplateSet;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateQuoteRequest {
    /// Output format; defaults to docx.
    #[serde(default)]
    pub format: QuoteFormat,
    /// Direct item override. When present the builder is bypassed entirely.
    pub items: Option<Vec<LineItem>>,
    /// Sync the generated items into project_line_items (default true).
    pub sync_line_items: Option<bool>,
    /// Name placed in the signature field of the document.
    pub prepared_by: Option<String>,
}

/// Load the project, its estimate and the template dictionary, then build
/// the item list. A failed template load degrades to hardcoded fallbacks; a
/// missing estimate row is a hard 404 per the API contract.
async fn load_and_build(
    state: &AppState,
    project_id: &Uuid,
) -> Result<(Project, Vec<LineItem>), HttpResponse> {
    let project = match state.get_project_by_id(project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => {
            return Err(
                HttpResponse::NotFound().json(ErrorResponse::not_found("Project not found"))
            )
        }
        Err(e) => {
            log::error!("Failed to load project: {:?}", e);
            return Err(HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load project")));
        }
    };

    let blob = match state.get_estimate(project_id, &project.project_type).await {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            return Err(HttpResponse::NotFound()
                .json(ErrorResponse::not_found("No estimate stored for project")))
        }
        Err(e) => {
            log::error!("Failed to load estimate: {:?}", e);
            return Err(HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load estimate")));
        }
    };
    let estimate = EstimateData::from_value(&blob);

    let templates = match state.get_template_set().await {
        Ok(set) => set,
        Err(e) => {
            log::warn!("Template dictionary unavailable, using fallbacks: {:?}", e);
            TemplateSet::empty()
        }
    };

    let items = build_items(&project, &estimate, &templates);
    Ok((project, items))
}

/// Preview the generated bill-of-materials without rendering a document
#[utoipa::path(
    context_path = "/api",
    tag = "Quote Service",
    get,
    path = "/projects/{id}/quote/items",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Computed line items", body = [LineItem]),
        (status = 404, description = "Project or estimate not found")
    )
)]
pub async fn preview_quote_items(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match load_and_build(&data, &id.into_inner()).await {
        Ok((_, items)) => HttpResponse::Ok().json(items),
        Err(response) => response,
    }
}

/// Generate a quote document and persist it as a file record
#[utoipa::path(
    context_path = "/api",
    tag = "Quote Service",
    post,
    path = "/projects/{id}/quote/generate",
    request_body = GenerateQuoteRequest,
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 201, description = "Quote generated", body = crate::files::models::ProjectFile),
        (status = 404, description = "Project or estimate not found")
    )
)]
pub async fn generate_quote(
    id: Path<Uuid>,
    req: web::Json<GenerateQuoteRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let project_id = id.into_inner();

    // A direct item override bypasses the builder (and the estimate row).
    let (project, items) = match &req.items {
        Some(items) => {
            let project = match data.get_project_by_id(&project_id).await {
                Ok(Some(project)) => project,
                Ok(None) => {
                    return HttpResponse::NotFound()
                        .json(ErrorResponse::not_found("Project not found"))
                }
                Err(e) => {
                    log::error!("Failed to load project: {:?}", e);
                    return HttpResponse::InternalServerError()
                        .json(ErrorResponse::internal_error("Failed to load project"));
                }
            };
            (project, items.clone())
        }
        None => match load_and_build(&data, &project_id).await {
            Ok(result) => result,
            Err(response) => return response,
        },
    };

    // Contact and company names are cosmetic document fields; lookups are
    // best effort.
    let mut ctx = QuoteContext {
        prepared_by: req.prepared_by.clone(),
        ..QuoteContext::default()
    };
    if let Some(contact_id) = project.contact_id {
        if let Ok(Some(contact)) = data.get_contact_by_id(&contact_id).await {
            ctx.contact_name = Some(contact.name);
        }
    }
    if let Some(company_id) = project.company_id {
        if let Ok(Some(company)) = data.get_company_by_id(&company_id).await {
            ctx.company_name = Some(company.name);
        }
    }

    let document = document::render(&project, &items, &ctx, req.format);

    if let Err(e) = data
        .storage
        .upload_file(&document.filename, &document.buffer)
        .await
    {
        log::error!("Failed to store quote document: {}", e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error("Failed to store document"));
    }

    let record = match data
        .insert_file_record(
            &project_id,
            &document.filename,
            &document.mime_type,
            document.buffer.len() as i64,
            "quote",
        )
        .await
    {
        Ok(record) => record,
        Err(e) => {
            log::error!("Failed to insert file record: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to record document"));
        }
    };

    // Optional side effects: line-item sync and the audit trail must never
    // fail the response.
    if req.sync_line_items.unwrap_or(true) {
        if let Err(e) = data.replace_auto_line_items(&project_id, &items).await {
            log::warn!("Line-item sync failed after generation: {:?}", e);
        }
    }

    data.log_activity(ActivityEntry::new(
        project_id,
        req.prepared_by.as_deref().unwrap_or("system"),
        "quote_generated",
        format!("Generated {}", record.filename),
    ))
    .await;

    HttpResponse::Created().json(record)
}

/// List persisted line items
#[utoipa::path(
    context_path = "/api",
    tag = "Quote Service",
    get,
    path = "/projects/{id}/line-items",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Persisted line items", body = [StoredLineItem])
    )
)]
pub async fn get_line_items(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.get_line_items(&id.into_inner()).await {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(e) => {
            log::error!("Failed to list line items: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to list line items"))
        }
    }
}

/// Add a manual line item
#[utoipa::path(
    context_path = "/api",
    tag = "Quote Service",
    post,
    path = "/projects/{id}/line-items",
    request_body = CreateLineItemRequest,
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 201, description = "Line item created", body = StoredLineItem),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn create_line_item(
    id: Path<Uuid>,
    req: web::Json<CreateLineItemRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let project_id = id.into_inner();

    if req.qty <= 0 || req.description.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "Line items need a positive quantity and a description",
        ));
    }

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

    match data.insert_manual_line_item(&project_id, &req).await {
        Ok(item) => HttpResponse::Created().json(item),
        Err(e) => {
            log::error!("Failed to create line item: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to create line item"))
        }
    }
}

/// Delete a line item
#[utoipa::path(
    context_path = "/api",
    tag = "Quote Service",
    delete,
    path = "/projects/{id}/line-items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("item_id" = Uuid, Path, description = "Line item ID")
    ),
    responses(
        (status = 204, description = "Line item deleted"),
        (status = 404, description = "Line item not found")
    )
)]
pub async fn delete_line_item(
    path: Path<(Uuid, Uuid)>,
    data: web::Data<AppState>,
) -> impl Responder {
    let (project_id, item_id) = path.into_inner();
    match data.delete_line_item(&project_id, &item_id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Line item not found")),
        Err(e) => {
            log::error!("Failed to delete line item: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to delete line item"))
        }
    }
}
