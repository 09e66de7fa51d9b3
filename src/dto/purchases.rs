use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{CourseSummary, Purchase};

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseList {
    pub purchases: Vec<Purchase>,
    pub courses: Vec<CourseSummary>,
}
