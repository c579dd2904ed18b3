use actix_web::{web, HttpRequest, HttpResponse, Responder};
use bcrypt::{hash, verify, DEFAULT_COST};

use super::jwt::{
    generate_access_token, generate_refresh_token, get_access_token_expiry, validate_token,
};
use super::middleware::validate_request_token;
use super::model::{
    AuthStatusResponse, CreateUserRequest, LoginRequest, RefreshRequest, TokenResponse, UserInfo,
};
use crate::AppState;

const DEFAULT_SETUP_USERNAME: &str = "admin";
const DEFAULT_SETUP_PASSWORD: &str = "tidewater123";

/// Check if setup is required (no users exist)
#[utoipa::path(
    get,
    path = "/api/auth/status",
    tag = "Authentication",
    responses(
        (status = 200, description = "Auth status", body = AuthStatusResponse)
    )
)]
pub async fn get_auth_status(state: web::Data<AppState>) -> impl Responder {
    let count = state.get_user_count().await.unwrap_or(0);
    HttpResponse::Ok().json(AuthStatusResponse {
        has_users: count > 0,
        setup_required: count == 0,
    })
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let user_count = state.get_user_count().await.unwrap_or(0);

    // First-time setup mode: allow login with default credentials
    if user_count == 0 {
        if body.username == DEFAULT_SETUP_USERNAME && body.password == DEFAULT_SETUP_PASSWORD {
            let temp_id = "setup-mode";
            let access_token = match generate_access_token(temp_id, &body.username) {
                Ok(t) => t,
                Err(e) => {
                    log::error!("Failed to generate access token: {:?}", e);
                    return HttpResponse::InternalServerError().json(
                        crate::ErrorResponse::internal_error("Failed to generate token"),
                    );
                }
            };

            let refresh_token = match generate_refresh_token(temp_id, &body.username) {
                Ok(t) => t,
                Err(e) => {
                    log::error!("Failed to generate refresh token: {:?}", e);
                    return HttpResponse::InternalServerError().json(
                        crate::ErrorResponse::internal_error("Failed to generate token"),
                    );
                }
            };

            return HttpResponse::Ok().json(TokenResponse {
                access_token,
                refresh_token,
                token_type: "Bearer".to_string(),
                expires_in: get_access_token_expiry(),
                setup_mode: true,
            });
        } else {
            return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
                "Unauthorized",
                "Invalid credentials. Use the default setup credentials for first-time setup.",
            ));
        }
    }

    // Normal login flow
    let user = match state.get_user_by_username(&body.username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
                "Unauthorized",
                "Invalid username or password",
            ));
        }
        Err(e) => {
            log::error!("Database error during login: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Login failed"));
        }
    };

    // Verify password
    let password_valid = verify(&body.password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
            "Unauthorized",
            "Invalid username or password",
        ));
    }

    // Generate tokens
    let user_id = user.id.to_string();
    let access_token = match generate_access_token(&user_id, &user.username) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Failed to generate access token: {:?}", e);
            return HttpResponse::InternalServerError().json(crate::ErrorResponse::internal_error(
                "Failed to generate token",
            ));
        }
    };

    let refresh_token = match generate_refresh_token(&user_id, &user.username) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Failed to generate refresh token: {:?}", e);
            return HttpResponse::InternalServerError().json(crate::ErrorResponse::internal_error(
                "Failed to generate token",
            ));
        }
    };

    // Store refresh token in database (invalidates any previous session)
    if let Err(e) = state.update_user_refresh_token(&user.id, &refresh_token).await {
        log::error!("Failed to store refresh token: {:?}", e);
        // Continue anyway, token is still valid
    }

    HttpResponse::Ok().json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: get_access_token_expiry(),
        setup_mode: false,
    })
}

/// Refresh access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = TokenResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh_token(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> impl Responder {
    let claims = match validate_token(&body.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Invalid refresh token: {:?}", e);
            return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
                "Unauthorized",
                "Invalid or expired refresh token",
            ));
        }
    };

    if claims.token_type != "refresh" {
        return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
            "Unauthorized",
            "Invalid token type",
        ));
    }

    // Check if this refresh token matches what's in database (single device session)
    let user = match state.get_user_by_refresh_token(&body.refresh_token).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
                "Unauthorized",
                "Session expired. Please login again.",
            ));
        }
        Err(e) => {
            log::error!("Database error during refresh: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Refresh failed"));
        }
    };

    // Generate new access token only (keep same refresh token)
    let user_id = user.id.to_string();
    let access_token = match generate_access_token(&user_id, &user.username) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Failed to generate access token: {:?}", e);
            return HttpResponse::InternalServerError().json(crate::ErrorResponse::internal_error(
                "Failed to generate token",
            ));
        }
    };

    HttpResponse::Ok().json(TokenResponse {
        access_token,
        refresh_token: body.refresh_token.clone(),
        token_type: "Bearer".to_string(),
        expires_in: get_access_token_expiry(),
        setup_mode: false,
    })
}

/// Current user info
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let claims = match validate_request_token(&req) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    let user_id = match uuid::Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => {
            // Setup-mode tokens carry no user row
            return HttpResponse::Ok().json(serde_json::json!({
                "username": claims.username,
                "setup_mode": true,
            }));
        }
    };

    match state.get_user_by_id(&user_id).await {
        Ok(Some(user)) => HttpResponse::Ok().json(UserInfo::from(user)),
        Ok(None) => {
            HttpResponse::NotFound().json(crate::ErrorResponse::not_found("User not found"))
        }
        Err(e) => {
            log::error!("Failed to load user: {:?}", e);
            HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Failed to load user"))
        }
    }
}

/// Create new user (protected - requires auth)
#[utoipa::path(
    post,
    path = "/api/auth/users",
    tag = "Authentication",
    request_body = CreateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "User created", body = UserInfo),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> impl Responder {
    let claims = match validate_request_token(&req) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    // Creator id (absent for the first user created in setup mode)
    let created_by = if claims.sub == "setup-mode" {
        None
    } else {
        uuid::Uuid::parse_str(&claims.sub).ok()
    };

    if let Ok(Some(_)) = state.get_user_by_username(&body.username).await {
        return HttpResponse::Conflict().json(crate::ErrorResponse::new(
            "Conflict",
            "Username already exists",
        ));
    }

    let password_hash = match hash(&body.password, DEFAULT_COST) {
        Ok(h) => h,
        Err(e) => {
            log::error!("Failed to hash password: {:?}", e);
            return HttpResponse::InternalServerError().json(crate::ErrorResponse::internal_error(
                "Failed to create user",
            ));
        }
    };

    let user = match state
        .create_user(
            &body.username,
            &password_hash,
            body.full_name.as_deref(),
            created_by,
        )
        .await
    {
        Ok(user) => user,
        Err(e) => {
            log::error!("Failed to create user: {:?}", e);
            return HttpResponse::InternalServerError().json(crate::ErrorResponse::internal_error(
                "Failed to create user",
            ));
        }
    };

    HttpResponse::Created().json(UserInfo::from(user))
}

/// List all users (protected)
#[utoipa::path(
    get,
    path = "/api/auth/users",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User list", body = Vec<UserInfo>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    if let Err(e) = validate_request_token(&req) {
        return e.error_response();
    }

    match state.get_all_users().await {
        Ok(users) => {
            let infos: Vec<UserInfo> = users.into_iter().map(UserInfo::from).collect();
            HttpResponse::Ok().json(infos)
        }
        Err(e) => {
            log::error!("Failed to get users: {:?}", e);
            HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Failed to get users"))
        }
    }
}

/// Delete user (protected)
#[utoipa::path(
    delete,
    path = "/api/auth/users/{id}",
    tag = "Authentication",
    params(("id" = String, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<uuid::Uuid>,
) -> impl Responder {
    let claims = match validate_request_token(&req) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    let user_id = path.into_inner();

    // Prevent self-deletion
    if claims.sub == user_id.to_string() {
        return HttpResponse::BadRequest().json(crate::ErrorResponse::bad_request(
            "Cannot delete your own account",
        ));
    }

    // Ensure at least one user remains
    let user_count = state.get_user_count().await.unwrap_or(0);
    if user_count <= 1 {
        return HttpResponse::BadRequest().json(crate::ErrorResponse::bad_request(
            "Cannot delete the last user",
        ));
    }

    match state.delete_user(&user_id).await {
        Ok(true) => HttpResponse::Ok().finish(),
        Ok(false) => {
            HttpResponse::NotFound().json(crate::ErrorResponse::not_found("User not found"))
        }
        Err(e) => {
            log::error!("Failed to delete user: {:?}", e);
            HttpResponse::InternalServerError().json(crate::ErrorResponse::internal_error(
                "Failed to delete user",
            ))
        }
    }
}

/// Configure auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/status", web::get().to(get_auth_status))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh_token))
            .route("/me", web::get().to(me))
            .route("/users", web::get().to(list_users))
            .route("/users", web::post().to(create_user))
            .route("/users/{id}", web::delete().to(delete_user)),
    );
}
