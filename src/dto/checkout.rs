use serde::Serialize;
use utoipa::ToSchema;

use crate::models::CourseSummary;

#[derive(Debug, Serialize, ToSchema)]
pub struct BuyCourseResponse {
    pub course: CourseSummary,
    pub client_secret: String,
    pub payment_intent_id: String,
}
