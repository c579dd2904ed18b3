use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod activity;
pub mod auth;
pub mod company;
pub mod db;
pub mod files;
pub mod project;
pub mod quote;
pub mod storage;

pub use crate::db::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

pub async fn run() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::auth::handlers::get_auth_status,
            crate::auth::handlers::login,
            crate::auth::handlers::refresh_token,
            crate::auth::handlers::me,
            crate::auth::handlers::create_user,
            crate::auth::handlers::list_users,
            crate::auth::handlers::delete_user,
            crate::project::handlers::get_all_projects,
            crate::project::handlers::get_project_by_id,
            crate::project::handlers::create_project,
            crate::project::handlers::update_project,
            crate::project::handlers::delete_project,
            crate::project::handlers::get_project_activities,
            crate::project::handlers::get_estimate,
            crate::project::handlers::put_estimate,
            crate::company::handlers::get_all_companies,
            crate::company::handlers::get_company_by_id,
            crate::company::handlers::create_company,
            crate::company::handlers::update_company,
            crate::company::handlers::delete_company,
            crate::company::handlers::get_contacts,
            crate::company::handlers::create_contact,
            crate::company::handlers::update_contact,
            crate::company::handlers::delete_contact,
            crate::quote::handlers::preview_quote_items,
            crate::quote::handlers::generate_quote,
            crate::quote::handlers::get_line_items,
            crate::quote::handlers::create_line_item,
            crate::quote::handlers::delete_line_item,
            crate::files::handlers::upload_project_file,
            crate::files::handlers::get_project_files,
            crate::files::handlers::download_file,
            crate::files::handlers::delete_file
        ),
        components(
            schemas(
                project::models::Project,
                project::models::CreateProjectRequest,
                project::models::UpdateProjectRequest,
                company::models::Company,
                company::models::Contact,
                company::models::CreateCompanyRequest,
                company::models::UpdateCompanyRequest,
                company::models::CreateContactRequest,
                company::models::UpdateContactRequest,
                quote::models::LineItem,
                quote::models::StoredLineItem,
                quote::models::CreateLineItemRequest,
                quote::handlers::GenerateQuoteRequest,
                quote::document::QuoteFormat,
                files::models::ProjectFile,
                activity::model::Activity,
                auth::model::UserInfo,
                auth::model::LoginRequest,
                auth::model::TokenResponse,
                auth::model::RefreshRequest,
                auth::model::CreateUserRequest,
                auth::model::AuthStatusResponse,
                ErrorResponse,
            )
        ),
        tags(
            (name = "Authentication", description = "Login, token refresh and account management."),
            (name = "Project Service", description = "Sales opportunity CRUD and estimate data."),
            (name = "Company Service", description = "Company and contact CRUD."),
            (name = "Quote Service", description = "Quote item preview, generation and line items."),
            (name = "File Service", description = "Stored documents and attachments.")
        ),
        servers(
            (url = "http://127.0.0.1:8080", description = "Local server")
        )
    )]
    struct ApiDoc;

    dotenvy::dotenv().ok(); // Load .env file
    let app_state = match AppState::new().await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to connect to database. Please check your DATABASE_URL in .env and ensure the database is running. Error: {}", e);
            std::process::exit(1);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("tidewater_crm_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    log::info!("Starting server at http://0.0.0.0:8080");

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(
                web::scope("/api")
                    .configure(auth::handlers::config)
                    .service(
                        web::resource("/projects")
                            .route(web::get().to(project::handlers::get_all_projects))
                            .route(web::post().to(project::handlers::create_project)),
                    )
                    .service(
                        web::resource("/projects/{id}")
                            .route(web::get().to(project::handlers::get_project_by_id))
                            .route(web::put().to(project::handlers::update_project))
                            .route(web::delete().to(project::handlers::delete_project)),
                    )
                    .service(
                        web::resource("/projects/{id}/activities")
                            .route(web::get().to(project::handlers::get_project_activities)),
                    )
                    .service(
                        web::resource("/projects/{id}/estimate/{project_type}")
                            .route(web::get().to(project::handlers::get_estimate))
                            .route(web::put().to(project::handlers::put_estimate)),
                    )
                    .service(
                        web::resource("/projects/{id}/quote/items")
                            .route(web::get().to(quote::handlers::preview_quote_items)),
                    )
                    .service(
                        web::resource("/projects/{id}/quote/generate")
                            .route(web::post().to(quote::handlers::generate_quote)),
                    )
                    .service(
                        web::resource("/projects/{id}/line-items")
                            .route(web::get().to(quote::handlers::get_line_items))
                            .route(web::post().to(quote::handlers::create_line_item)),
                    )
                    .service(
                        web::resource("/projects/{id}/line-items/{item_id}")
                            .route(web::delete().to(quote::handlers::delete_line_item)),
                    )
                    .service(
                        web::resource("/projects/{id}/files")
                            .route(web::get().to(files::handlers::get_project_files))
                            .route(web::post().to(files::handlers::upload_project_file)),
                    )
                    .service(
                        web::resource("/files/{id}/download")
                            .route(web::get().to(files::handlers::download_file)),
                    )
                    .service(
                        web::resource("/files/{id}")
                            .route(web::delete().to(files::handlers::delete_file)),
                    )
                    .service(
                        web::resource("/companies")
                            .route(web::get().to(company::handlers::get_all_companies))
                            .route(web::post().to(company::handlers::create_company)),
                    )
                    .service(
                        web::resource("/companies/{id}")
                            .route(web::get().to(company::handlers::get_company_by_id))
                            .route(web::put().to(company::handlers::update_company))
                            .route(web::delete().to(company::handlers::delete_company)),
                    )
                    .service(
                        web::resource("/contacts")
                            .route(web::get().to(company::handlers::get_contacts))
                            .route(web::post().to(company::handlers::create_contact)),
                    )
                    .service(
                        web::resource("/contacts/{id}")
                            .route(web::put().to(company::handlers::update_contact))
                            .route(web::delete().to(company::handlers::delete_contact)),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .backlog(8192)
    .max_connections(25000)
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
