use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AuditEvent, AuditOutcome, JsonOrForm, JsonOrFormRejection,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, ConflictResponse,
        DatabaseErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::Admin;
use crate::error::UserResult;
use crate::models::{Role, User, UserPayload};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(
        schemas(User, UserPayload, Role),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            ConflictResponse,
            UnauthorizedResponse,
            DatabaseErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Staff account administration (admin only)")
    )
)]
pub struct ApiDoc;

/// User routes relative to their mount point. Expects the JWT middleware
/// to run in front so [`Admin`] can read the claims.
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .with_state(shared_service)
}

fn audit(admin: &Admin, action: &str, id: i32, headers: &HeaderMap) {
    AuditEvent::new(
        Some(admin.subject().to_string()),
        action,
        Some(format!("user:{}", id)),
        AuditOutcome::Success,
    )
    .with_request_headers(headers)
    .log();
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All users ordered by id", body = Vec<User>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    admin: Admin,
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<Json<Vec<User>>> {
    let users = service.list_users(&admin).await?;
    Ok(Json(users))
}

/// Create a user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body(
        content(
            (UserPayload = "application/json"),
            (UserPayload = "application/x-www-form-urlencoded")
        )
    ),
    responses(
        (status = 201, description = "User created", body = String),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    admin: Admin,
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    JsonOrForm(payload): JsonOrForm<UserPayload>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(&admin, payload).await?;
    audit(&admin, "user.create", user.id, &headers);

    Ok((StatusCode::CREATED, "User created"))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    admin: Admin,
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
) -> UserResult<Json<User>> {
    let user = service.get_user(&admin, &id).await?;
    Ok(Json(user))
}

/// Replace every field of a user; the password is re-hashed
#[utoipa::path(
    method(put, patch),
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body(
        content(
            (UserPayload = "application/json"),
            (UserPayload = "application/x-www-form-urlencoded")
        )
    ),
    responses(
        (status = 200, description = "User updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    admin: Admin,
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<JsonOrForm<UserPayload>, JsonOrFormRejection>,
) -> UserResult<StatusCode> {
    let payload = payload.map(|JsonOrForm(p)| p).map_err(Into::into);
    let user = service.update_user(&admin, &id, payload).await?;
    audit(&admin, "user.update", user.id, &headers);

    Ok(StatusCode::OK)
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    admin: Admin,
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> UserResult<StatusCode> {
    let id = service.delete_user(&admin, &id).await?;
    audit(&admin, "user.delete", id, &headers);

    Ok(StatusCode::OK)
}
