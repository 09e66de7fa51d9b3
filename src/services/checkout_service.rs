use uuid::Uuid;

use crate::{
    audit,
    dto::checkout::BuyCourseResponse,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_USER, ensure_role},
    payments::CreatePaymentIntent,
    response::{ApiResponse, Meta},
    services::{course_service, purchase_service},
    state::AppState,
};

pub const CHECKOUT_CURRENCY: &str = "INR";
pub const ALREADY_PURCHASED: &str = "User has already purchased this course";

/// Provider amount in minor units for a catalog price.
pub fn minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

/// Catalog price for a provider amount in minor units.
pub fn major_units(amount: i64) -> f64 {
    amount as f64 / 100.0
}

/// Opens a provider payment intent for a course. Nothing is stored locally
/// until the client confirms the payment through the order endpoint.
pub async fn buy_course(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> AppResult<ApiResponse<BuyCourseResponse>> {
    ensure_role(user, ROLE_USER)?;
    let course = course_service::find_course(&state.orm, course_id).await?;

    if purchase_service::find_purchase(&state.orm, user.user_id, course.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(ALREADY_PURCHASED.into()));
    }

    let amount = minor_units(course.price);
    let intent = state
        .payments
        .create_payment_intent(CreatePaymentIntent {
            amount,
            currency: CHECKOUT_CURRENCY.into(),
            user_id: user.user_id,
            course_id: course.id,
        })
        .await?;

    let client_secret = intent.client_secret.clone().ok_or_else(|| {
        AppError::Upstream("payment provider returned no client secret".into())
    })?;

    tracing::info!(
        user_id = %user.user_id,
        course_id = %course.id,
        payment_intent_id = %intent.id,
        amount,
        "payment initiated"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "payment_intent_create",
        "courses",
        serde_json::json!({ "course_id": course.id, "payment_intent_id": intent.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment initiated successfully",
        BuyCourseResponse {
            course: course_service::course_summary(course),
            client_secret,
            payment_intent_id: intent.id,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_round_to_the_nearest_unit() {
        assert_eq!(minor_units(899.0), 89900);
        assert_eq!(minor_units(19.99), 1999);
        assert_eq!(minor_units(0.005), 1);
        assert_eq!(minor_units(0.0), 0);
    }

    #[test]
    fn prices_survive_the_provider_round_trip() {
        for price in [0.0, 1.0, 9.99, 19.99, 499.5, 899.0, 12345.67] {
            assert_eq!(major_units(minor_units(price)), price);
        }
    }
}
