use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::courses::{CourseList, CreateCourseRequest, UpdateCourseRequest},
    entity::courses::{ActiveModel, Column, Entity as Courses, Model as CourseModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Course, CourseImage, CourseSummary},
    response::{ApiResponse, Meta},
    routes::params::{CourseQuery, SortOrder},
    state::AppState,
};

const TITLE_MAX_CHARS: usize = 50;
const DESCRIPTION_MIN_CHARS: usize = 4;

/// Catalog lookup shared by the checkout and order flows.
pub async fn find_course<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<CourseModel> {
    Courses::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("Course"))
}

pub async fn list_courses(
    state: &AppState,
    query: CourseQuery,
) -> AppResult<ApiResponse<CourseList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(Column::Title.contains(search))
                .add(Column::Description.contains(search)),
        );
    }

    let mut finder = Courses::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(course_from_entity)
        .collect();

    tracing::debug!(total, page, "courses listed");
    Ok(ApiResponse::success(
        "Courses",
        CourseList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_course(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Course>> {
    let course = find_course(&state.orm, id).await?;
    Ok(ApiResponse::success("Course", course_from_entity(course), None))
}

pub async fn create_course(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    ensure_admin(user)?;

    let mut errors = Vec::new();
    check_title(&payload.title, &mut errors);
    check_description(&payload.description, &mut errors);
    check_price(payload.price, &mut errors);
    check_image(&payload.image, &mut errors);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let now = Utc::now();
    let course = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        price: Set(payload.price),
        image_public_id: Set(payload.image.public_id),
        image_url: Set(payload.image.url),
        creator_id: Set(user.user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(course_id = %course.id, admin_id = %user.user_id, "course created");
    audit::record(
        &state.orm,
        user.user_id,
        "course_create",
        "courses",
        serde_json::json!({ "course_id": course.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Course created successfully",
        course_from_entity(course),
        Some(Meta::empty()),
    ))
}

pub async fn update_course(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    ensure_admin(user)?;

    let mut errors = Vec::new();
    if let Some(title) = &payload.title {
        check_title(title, &mut errors);
    }
    if let Some(description) = &payload.description {
        check_description(description, &mut errors);
    }
    if let Some(price) = payload.price {
        check_price(price, &mut errors);
    }
    if let Some(image) = &payload.image {
        check_image(image, &mut errors);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Only the creating admin may touch the course; anyone else sees a 404.
    let existing = Courses::find()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::CreatorId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Course"))?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(image) = payload.image {
        active.image_public_id = Set(image.public_id);
        active.image_url = Set(image.url);
    }
    active.updated_at = Set(Utc::now().into());
    let course = active.update(&state.orm).await?;

    tracing::info!(course_id = %course.id, admin_id = %user.user_id, "course updated");
    audit::record(
        &state.orm,
        user.user_id,
        "course_update",
        "courses",
        serde_json::json!({ "course_id": course.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Course updated successfully",
        course_from_entity(course),
        Some(Meta::empty()),
    ))
}

pub async fn delete_course(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Courses::delete_many()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::CreatorId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Course"));
    }

    tracing::info!(course_id = %id, admin_id = %user.user_id, "course deleted");
    audit::record(
        &state.orm,
        user.user_id,
        "course_delete",
        "courses",
        serde_json::json!({ "course_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Course deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn check_title(title: &str, errors: &mut Vec<String>) {
    let chars = title.trim().chars().count();
    if chars == 0 {
        errors.push("Course title is required".into());
    } else if chars > TITLE_MAX_CHARS {
        errors.push(format!("Title cannot exceed {TITLE_MAX_CHARS} characters"));
    }
}

fn check_description(description: &str, errors: &mut Vec<String>) {
    if description.trim().chars().count() < DESCRIPTION_MIN_CHARS {
        errors.push(format!(
            "Description must be at least {DESCRIPTION_MIN_CHARS} characters long"
        ));
    }
}

fn check_price(price: f64, errors: &mut Vec<String>) {
    if !price.is_finite() || price < 0.0 {
        errors.push("Price cannot be negative".into());
    }
}

fn check_image(image: &CourseImage, errors: &mut Vec<String>) {
    if image.public_id.trim().is_empty() {
        errors.push("Image public_id is required".into());
    }
    if image.url.trim().is_empty() {
        errors.push("Image URL is required".into());
    }
}

pub(crate) fn course_from_entity(model: CourseModel) -> Course {
    Course {
        id: model.id,
        title: model.title,
        description: model.description,
        price: model.price,
        image: CourseImage {
            public_id: model.image_public_id,
            url: model.image_url,
        },
        creator_id: model.creator_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn course_summary(model: CourseModel) -> CourseSummary {
    CourseSummary {
        id: model.id,
        title: model.title,
        price: model.price,
        description: model.description,
        image: CourseImage {
            public_id: model.image_public_id,
            url: model.image_url,
        },
    }
}
