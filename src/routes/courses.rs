use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        checkout::BuyCourseResponse,
        courses::{CourseList, CreateCourseRequest, UpdateCourseRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Course,
    response::ApiResponse,
    routes::params::CourseQuery,
    services::{checkout_service, course_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route(
            "/{course_id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/buy/{course_id}", post(buy_course))
}

#[utoipa::path(
    get,
    path = "/api/course",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search in title and description"),
    ),
    responses(
        (status = 200, description = "List courses", body = ApiResponse<CourseList>)
    ),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> AppResult<Json<ApiResponse<CourseList>>> {
    let resp = course_service::list_courses(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/course/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course details", body = ApiResponse<Course>),
        (status = 404, description = "Course not found"),
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let resp = course_service::get_course(&state, course_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/course",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Create course", body = ApiResponse<Course>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Course>>)> {
    let Json(payload) = payload?;
    let resp = course_service::create_course(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/course/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated course", body = ApiResponse<Course>),
        (status = 404, description = "Course not found or not owned by caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<Uuid>,
    payload: Result<Json<UpdateCourseRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let Json(payload) = payload?;
    let resp = course_service::update_course(&state, &user, course_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/course/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Deleted course", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Course not found or not owned by caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = course_service::delete_course(&state, &user, course_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/course/buy/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Payment intent created", body = ApiResponse<BuyCourseResponse>),
        (status = 400, description = "Course already purchased"),
        (status = 403, description = "Students only"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Payment provider error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn buy_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BuyCourseResponse>>> {
    let resp = checkout_service::buy_course(&state, &user, course_id).await?;
    Ok(Json(resp))
}
