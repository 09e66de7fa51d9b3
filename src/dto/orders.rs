use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, PaymentStatus};

/// Confirmation sent by the client after the provider accepted the payment.
///
/// Every field is optional at the wire level so that validation can report
/// all missing fields at once instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub email: Option<String>,
    #[serde(alias = "courseId")]
    pub course_id: Option<String>,
    #[serde(alias = "paymentId")]
    pub payment_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummary {
    pub id: Uuid,
    pub course_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseSummary {
    pub id: Uuid,
    pub course_id: Uuid,
    pub payment_id: String,
    pub progress: i32,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreated {
    pub order: OrderSummary,
    pub purchase: PurchaseSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
