use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::purchases::PurchaseList, error::AppResult, middleware::auth::AuthUser,
    response::ApiResponse, services::purchase_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/purchases", get(purchases))
}

#[utoipa::path(
    get,
    path = "/api/user/purchases",
    responses(
        (status = 200, description = "Purchased courses of the current user", body = ApiResponse<PurchaseList>),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn purchases(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PurchaseList>>> {
    let resp = purchase_service::list_purchases(&state, &user).await?;
    Ok(Json(resp))
}
