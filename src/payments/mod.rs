//! Payment provider integration.
//!
//! The checkout flow only needs two calls from the provider: creating a
//! payment intent for a course and reading one back when the client reports
//! it as paid. [`PaymentGateway`] is that seam; [`StripeGateway`] implements it
//! with `async-stripe`.

mod stripe;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use stripe::StripeGateway;

pub const METADATA_USER_ID: &str = "userId";
pub const METADATA_COURSE_ID: &str = "courseId";

const INTENT_ID_PREFIX: &str = "pi_";

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The provider answered with an error body.
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// Rejected locally before anything was sent.
    #[error("invalid payment request: {0}")]
    InvalidRequest(String),

    #[error("payment provider unreachable: {0}")]
    Transport(String),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

/// `pi_` followed by ASCII letters and digits only.
pub fn is_payment_intent_id(id: &str) -> bool {
    id.strip_prefix(INTENT_ID_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Provider-side representation of an in-progress charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }

    /// Whether the intent was created for this user and course.
    pub fn belongs_to(&self, user_id: Uuid, course_id: Uuid) -> bool {
        let user = user_id.to_string();
        let course = course_id.to_string();
        self.metadata.get(METADATA_USER_ID) == Some(&user)
            && self.metadata.get(METADATA_COURSE_ID) == Some(&course)
    }
}

#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        params: CreatePaymentIntent,
    ) -> PaymentResult<PaymentIntent>;

    async fn retrieve_payment_intent(&self, id: &str) -> PaymentResult<PaymentIntent>;
}
