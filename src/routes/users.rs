use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::PaginationSettings;
use crate::core;
use crate::models::{
    CreateUserRequest, ErrorResponse, HealthResponse, ListUsersQuery, MatchQuery, MatchResponse,
    UpdateUserRequest, WelcomeResponse,
};
use crate::services::{StoreError, UserStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub pagination: PaginationSettings,
}

/// Configure all user-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(welcome))
        .route("/health", web::get().to(health_check))
        .route("/users", web::post().to(create_user))
        .route("/users", web::get().to(list_users))
        .route("/users/{id}", web::get().to(get_user))
        .route("/users/{id}", web::put().to(update_user))
        .route("/users/{id}", web::delete().to(delete_user))
        .route("/users/{id}/matches", web::get().to(find_matches));
}

/// Map a store failure onto the HTTP error taxonomy
///
/// NotFound -> 404, email conflicts -> 400, everything else -> 500.
fn store_error_response(err: StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: "User not found".to_string(),
            status_code: 404,
        }),
        StoreError::EmailTaken(_) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "email_taken".to_string(),
            message: "Email already registered".to_string(),
            status_code: 400,
        }),
        other => {
            tracing::error!("Store operation failed: {}", other);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "internal_error".to_string(),
                message: other.to_string(),
                status_code: 500,
            })
        }
    }
}

fn validation_response(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Welcome endpoint
///
/// GET /
async fn welcome() -> impl Responder {
    HttpResponse::Ok().json(WelcomeResponse {
        message: "Welcome to the Matchmaker API".to_string(),
    })
}

/// Health check endpoint
///
/// GET /health
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Create user endpoint
///
/// POST /users
async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUserRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_user: {}", errors);
        return validation_response(errors);
    }

    let (new_user, interest_names) = req.into_inner().into_parts();

    match state.store.create_user(new_user, &interest_names).await {
        Ok(user) => {
            tracing::info!("Created user {} ({})", user.id, user.email);
            HttpResponse::Created().json(user)
        }
        Err(e) => store_error_response(e),
    }
}

/// List users endpoint
///
/// GET /users?offset=0&limit=100
async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<ListUsersQuery>,
) -> impl Responder {
    let offset = query.offset.max(0);
    let limit = query
        .limit
        .unwrap_or(state.pagination.default_limit)
        .clamp(0, state.pagination.max_limit);

    match state.store.list_users(offset, limit).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => store_error_response(e),
    }
}

/// Fetch one user endpoint
///
/// GET /users/{id}
async fn get_user(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();

    match state.store.get_user(id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => store_error_response(e),
    }
}

/// Partial update endpoint
///
/// PUT /users/{id}
async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<UpdateUserRequest>,
) -> impl Responder {
    let id = path.into_inner();

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for update_user {}: {}", id, errors);
        return validation_response(errors);
    }

    let patch = req.into_inner().into_patch();

    match state.store.update_user(id, patch).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => store_error_response(e),
    }
}

/// Delete user endpoint
///
/// DELETE /users/{id}
async fn delete_user(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();

    match state.store.delete_user(id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => store_error_response(e),
    }
}

/// Find matches endpoint
///
/// GET /users/{id}/matches?min_age=&max_age=&city=&interest_match=true
///
/// Resolves the subject, materializes the candidate pool, and runs the
/// filter-and-rank pipeline. An empty result set is a valid outcome.
async fn find_matches(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<MatchQuery>,
) -> impl Responder {
    let id = path.into_inner();

    let subject = match state.store.get_user(id).await {
        Ok(user) => user,
        Err(e) => return store_error_response(e),
    };

    let candidates = match state.store.list_candidates(id).await {
        Ok(users) => users,
        Err(e) => return store_error_response(e),
    };

    let filters = query.into_inner().into_filters();
    let outcome = core::find_matches(&subject, candidates, &filters);

    tracing::info!(
        "Returning {} matches for user {} (interest_match: {})",
        outcome.match_count,
        id,
        filters.interest_match
    );

    HttpResponse::Ok().json(MatchResponse {
        match_count: outcome.match_count,
        matches: outcome.matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status_codes() {
        let resp = store_error_response(StoreError::NotFound("user 1".to_string()));
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

        let resp = store_error_response(StoreError::EmailTaken("a@b.com".to_string()));
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
