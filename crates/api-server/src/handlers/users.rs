use crate::dto::{CreateUserRequest, UserSearchQuery};
use crate::error::{ApiError, USER_NOT_FOUND};
use crate::extract::{Json, Path, Query};
use crate::response::ApiResponse;
use crate::AppState;
use application::UserView;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use domain::{PageRequest, PagedResult, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use tracing::info;
use validator::Validate;

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ApiError> {
    let users = state.user_app.user_service.list_all().await?;
    Ok(Json(ApiResponse::ok(users)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    match state.user_app.user_service.get(id).await? {
        Some(user) => Ok(Json(ApiResponse::ok(user))),
        None => Err(ApiError::NotFound(USER_NOT_FOUND.to_string())),
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let user = state
        .user_app
        .user_service
        .create(request.name, request.level)
        .await?;
    info!(id = user.id, "User created");

    let location = format!("/api/user/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse::ok_with_message(user, "User created successfully")),
    ))
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<ApiResponse<PagedResult<UserView>>>, ApiError> {
    let page = PageRequest::new(
        query.page.unwrap_or(DEFAULT_PAGE),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let found = state
        .user_app
        .user_service
        .search(query.keyword, query.min_level, query.max_level, page)
        .await?;
    Ok(Json(ApiResponse::ok(found)))
}
