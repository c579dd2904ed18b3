use actix_web::{
    web::{self, Path, Query},
    HttpResponse, Responder,
};
use uuid::Uuid;

use crate::company::models::{
    Company, Contact, ContactListQuery, CreateCompanyRequest, CreateContactRequest,
    UpdateCompanyRequest, UpdateContactRequest,
};
use crate::db::AppState;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    get,
    path = "/companies",
    responses(
        (status = 200, description = "List of companies", body = [Company])
    )
)]
pub async fn get_all_companies(data: web::Data<AppState>) -> impl Responder {
    match data.get_all_companies().await {
        Ok(companies) => HttpResponse::Ok().json(companies),
        Err(e) => {
            log::error!("Failed to list companies: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to list companies"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    get,
    path = "/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company found", body = Company),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_company_by_id(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.get_company_by_id(&id.into_inner()).await {
        Ok(Some(company)) => HttpResponse::Ok().json(company),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Company not found")),
        Err(e) => {
            log::error!("Failed to load company: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load company"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    post,
    path = "/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_company(
    req: web::Json<CreateCompanyRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if req.name.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Company name must not be empty"));
    }

    match data.insert_company(&req).await {
        Ok(company) => HttpResponse::Created().json(company),
        Err(e) => {
            log::error!("Failed to create company: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to create company"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    put,
    path = "/companies/{id}",
    request_body = UpdateCompanyRequest,
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 404, description = "Company not found")
    )
)]
pub async fn update_company(
    id: Path<Uuid>,
    req: web::Json<UpdateCompanyRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data.update_company(&id.into_inner(), &req).await {
        Ok(Some(company)) => HttpResponse::Ok().json(company),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Company not found")),
        Err(e) => {
            log::error!("Failed to update company: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to update company"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    delete,
    path = "/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 204, description = "Company deleted"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn delete_company(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.delete_company(&id.into_inner()).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Company not found")),
        Err(e) => {
            log::error!("Failed to delete company: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to delete company"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    get,
    path = "/contacts",
    params(ContactListQuery),
    responses(
        (status = 200, description = "List of contacts", body = [Contact])
    )
)]
pub async fn get_contacts(
    query: Query<ContactListQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data.get_contacts(query.company_id.as_ref()).await {
        Ok(contacts) => HttpResponse::Ok().json(contacts),
        Err(e) => {
            log::error!("Failed to list contacts: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to list contacts"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    post,
    path = "/contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = Contact),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_contact(
    req: web::Json<CreateContactRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    if req.name.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Contact name must not be empty"));
    }

    match data.insert_contact(&req).await {
        Ok(contact) => HttpResponse::Created().json(contact),
        Err(e) => {
            log::error!("Failed to create contact: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to create contact"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    put,
    path = "/contacts/{id}",
    request_body = UpdateContactRequest,
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact updated", body = Contact),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn update_contact(
    id: Path<Uuid>,
    req: web::Json<UpdateContactRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data.update_contact(&id.into_inner(), &req).await {
        Ok(Some(contact)) => HttpResponse::Ok().json(contact),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Contact not found")),
        Err(e) => {
            log::error!("Failed to update contact: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to update contact"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Company Service",
    delete,
    path = "/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn delete_contact(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.delete_contact(&id.into_inner()).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Contact not found")),
        Err(e) => {
            log::error!("Failed to delete contact: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to delete contact"))
        }
    }
}
