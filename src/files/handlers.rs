//! File endpoints: attachment upload, listing, download, deletion.

use std::io::Write;
use std::path::Path as StdPath;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{
    http::header::ContentDisposition,
    web::{self, Path},
    HttpResponse, Responder,
};
use futures::TryStreamExt;
use sanitize_filename::sanitize;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::db::AppState;
use crate::storage::ObjectStorage;
use crate::ErrorResponse;

/// Read the uploaded file out of the multipart payload and push it into
/// object storage under a collision-free name.
async fn multipart_save_with_storage(
    mut payload: Multipart,
    storage: &Arc<dyn ObjectStorage + Send + Sync>,
) -> Result<(String, String, i64), String> {
    while let Some(mut field) = payload.try_next().await.map_err(|e| e.to_string())? {
        let content_disposition = field
            .content_disposition()
            .ok_or("Content-Disposition not set")?;
        let field_name = content_disposition
            .get_name()
            .ok_or_else(|| "No field name".to_string())?;

        if field_name != "file" {
            continue;
        }

        let file_name = content_disposition
            .get_filename()
            .ok_or_else(|| "No filename".to_string())?;
        let sanitized_filename = sanitize(file_name);

        let ext = StdPath::new(&sanitized_filename)
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("");

        let unique_filename = format!(
            "{}_{}.{}",
            Uuid::new_v4(),
            sanitized_filename.replace('.', "_"),
            ext
        );

        let mut temp_file =
            NamedTempFile::new().map_err(|e| format!("Failed to create temporary file: {}", e))?;

        while let Some(chunk) = field.try_next().await.map_err(|e| e.to_string())? {
            temp_file
                .write_all(&chunk)
                .map_err(|e| format!("Failed to write chunk to temp file: {}", e))?;
        }

        let file_data = std::fs::read(temp_file.path())
            .map_err(|e| format!("Failed to read temp file: {}", e))?;
        let size = file_data.len() as i64;
        storage.upload_file(&unique_filename, &file_data).await?;

        let mime_type = mime_guess::from_path(&sanitized_filename)
            .first_or_octet_stream()
            .to_string();

        return Ok((unique_filename, mime_type, size));
    }

    Err("No file was uploaded".to_string())
}

/// Upload an attachment to a project
#[utoipa::path(
    context_path = "/api",
    tag = "File Service",
    post,
    path = "/projects/{id}/files",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 201, description = "File uploaded", body = crate::files::models::ProjectFile),
        (status = 400, description = "No file in payload"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn upload_project_file(
    id: Path<Uuid>,
    payload: Multipart,
    data: web::Data<AppState>,
) -> impl Responder {
    let project_id = id.into_inner();

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

    let (filename, mime_type, size) =
        match multipart_save_with_storage(payload, &data.storage).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Attachment upload rejected: {}", e);
                return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e));
            }
        };

    match data
        .insert_file_record(&project_id, &filename, &mime_type, size, "attachment")
        .await
    {
        Ok(record) => HttpResponse::Created().json(record),
        Err(e) => {
            log::error!("Failed to insert file record: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to record file"))
        }
    }
}

/// List a project's files
#[utoipa::path(
    context_path = "/api",
    tag = "File Service",
    get,
    path = "/projects/{id}/files",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "File records", body = [crate::files::models::ProjectFile])
    )
)]
pub async fn get_project_files(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.get_files_by_project(&id.into_inner()).await {
        Ok(files) => HttpResponse::Ok().json(files),
        Err(e) => {
            log::error!("Failed to list files: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to list files"))
        }
    }
}

/// Download a stored file
#[utoipa::path(
    context_path = "/api",
    tag = "File Service",
    get,
    path = "/files/{id}/download",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    let record = match data.get_file_by_id(&id.into_inner()).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::not_found("File not found"))
        }
        Err(e) => {
            log::error!("Failed to load file record: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load file"));
        }
    };

    match data.storage.download_file(&record.filename).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(record.mime_type.clone())
            .insert_header(ContentDisposition::attachment(record.filename.clone()))
            .body(bytes),
        Err(e) => {
            log::error!("Failed to read stored file {}: {}", record.filename, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to read file"))
        }
    }
}

/// Delete a stored file and its record
#[utoipa::path(
    context_path = "/api",
    tag = "File Service",
    delete,
    path = "/files/{id}",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    let file_id = id.into_inner();

    let record = match data.get_file_by_id(&file_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::not_found("File not found"))
        }
        Err(e) => {
            log::error!("Failed to load file record: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load file"));
        }
    };

    // Bytes first, then the record
    if let Err(e) = data.storage.delete_file(&record.filename).await {
        log::warn!("Failed to delete stored bytes for {}: {}", record.filename, e);
    }

    match data.delete_file_record(&file_id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("File not found")),
        Err(e) => {
            log::error!("Failed to delete file record: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to delete file"))
        }
    }
}
