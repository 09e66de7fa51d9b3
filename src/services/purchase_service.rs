use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::purchases::PurchaseList,
    entity::{
        courses::{Column as CourseCol, Entity as Courses},
        purchases::{Column as PurchaseCol, Entity as Purchases, Model as PurchaseModel},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Purchase,
    response::{ApiResponse, Meta},
    services::course_service::course_summary,
    state::AppState,
};

pub async fn find_purchase<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<Option<PurchaseModel>> {
    let purchase = Purchases::find()
        .filter(
            Condition::all()
                .add(PurchaseCol::UserId.eq(user_id))
                .add(PurchaseCol::CourseId.eq(course_id)),
        )
        .one(conn)
        .await?;
    Ok(purchase)
}

/// The caller's purchases plus the current catalog rows for those courses.
pub async fn list_purchases(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PurchaseList>> {
    let purchases: Vec<Purchase> = Purchases::find()
        .filter(PurchaseCol::UserId.eq(user.user_id))
        .order_by_desc(PurchaseCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(purchase_from_entity)
        .collect();

    let course_ids: Vec<Uuid> = purchases.iter().map(|p| p.course_id).collect();
    let courses = if course_ids.is_empty() {
        Vec::new()
    } else {
        Courses::find()
            .filter(CourseCol::Id.is_in(course_ids))
            .order_by_asc(CourseCol::Title)
            .all(&state.orm)
            .await?
            .into_iter()
            .map(course_summary)
            .collect()
    };

    tracing::debug!(
        user_id = %user.user_id,
        purchases = purchases.len(),
        courses = courses.len(),
        "purchases listed"
    );
    Ok(ApiResponse::success(
        "Purchases",
        PurchaseList { purchases, courses },
        Some(Meta::empty()),
    ))
}

pub(crate) fn purchase_from_entity(model: PurchaseModel) -> Purchase {
    Purchase {
        id: model.id,
        user_id: model.user_id,
        course_id: model.course_id,
        payment_id: model.payment_id,
        progress: model.progress,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
