#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::Notify;
use course_market_api::{
    db::run_migrations,
    dto::{courses::CreateCourseRequest, orders::CreateOrderRequest},
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_USER},
    models::{Course, CourseImage},
    payments::{
        CreatePaymentIntent, METADATA_COURSE_ID, METADATA_USER_ID, PaymentError, PaymentGateway,
        PaymentIntent, PaymentResult,
    },
    services::{checkout_service, course_service},
    state::AppState,
};
use sea_orm::{ConnectOptions, Database};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

/// In-memory stand-in for the payment provider.
#[derive(Default)]
pub struct FakeGateway {
    intents: Mutex<HashMap<String, PaymentIntent>>,
    next_id: AtomicU64,
    retrievals: AtomicU64,
    failure: Mutex<Option<String>>,
    hold: Mutex<Option<Arc<RetrievalHold>>>,
}

/// Parks `retrieve_payment_intent` so a test can change the database between
/// an order's duplicate checks and its transaction.
#[derive(Default)]
pub struct RetrievalHold {
    pub reached: Notify,
    pub release: Notify,
}

impl FakeGateway {
    pub fn created(&self) -> usize {
        self.intents.lock().unwrap().len()
    }

    pub fn intent(&self, id: &str) -> Option<PaymentIntent> {
        self.intents.lock().unwrap().get(id).cloned()
    }

    /// What the browser does with the client secret.
    pub fn confirm(&self, id: &str) {
        if let Some(intent) = self.intents.lock().unwrap().get_mut(id) {
            intent.status = "succeeded".into();
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn retrievals(&self) -> u64 {
        self.retrievals.load(Ordering::SeqCst)
    }

    pub fn hold_retrievals(&self) -> Arc<RetrievalHold> {
        let hold = Arc::new(RetrievalHold::default());
        *self.hold.lock().unwrap() = Some(hold.clone());
        hold
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_intent(
        &self,
        params: CreatePaymentIntent,
    ) -> PaymentResult<PaymentIntent> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(PaymentError::Provider {
                status: 402,
                message,
            });
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("pi_test{n}");
        let intent = PaymentIntent {
            id: id.clone(),
            client_secret: Some(format!("{id}_secret_test")),
            amount: params.amount,
            currency: params.currency.to_ascii_lowercase(),
            status: "requires_payment_method".into(),
            metadata: HashMap::from([
                (METADATA_USER_ID.to_string(), params.user_id.to_string()),
                (METADATA_COURSE_ID.to_string(), params.course_id.to_string()),
            ]),
        };
        self.intents.lock().unwrap().insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> PaymentResult<PaymentIntent> {
        self.retrievals.fetch_add(1, Ordering::SeqCst);
        let hold = self.hold.lock().unwrap().clone();
        if let Some(hold) = hold {
            hold.reached.notify_one();
            hold.release.notified().await;
        }
        self.intent(id).ok_or_else(|| PaymentError::Provider {
            status: 404,
            message: format!("No such payment_intent: '{id}'"),
        })
    }
}

pub struct TestApp {
    pub state: AppState,
    pub gateway: Arc<FakeGateway>,
}

pub async fn setup() -> anyhow::Result<TestApp> {
    // One connection keeps the in-memory database alive and shared.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await?;
    run_migrations(&orm).await?;

    let gateway = Arc::new(FakeGateway::default());
    let state = AppState {
        orm,
        payments: gateway.clone(),
        jwt_secret: Arc::from(JWT_SECRET),
    };
    Ok(TestApp { state, gateway })
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_ADMIN.into(),
    }
}

pub fn user() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_USER.into(),
    }
}

pub async fn seed_course(
    app: &TestApp,
    admin: &AuthUser,
    title: &str,
    price: f64,
) -> anyhow::Result<Course> {
    let resp = course_service::create_course(
        &app.state,
        admin,
        CreateCourseRequest {
            title: title.into(),
            description: format!("{title} from first principles"),
            price,
            image: CourseImage {
                public_id: format!("courses/{}", title.to_lowercase()),
                url: format!("https://img.example.com/{}.png", title.to_lowercase()),
            },
        },
    )
    .await?;
    Ok(resp.data.expect("course"))
}

/// Opens an intent for the course and confirms it like the client would.
pub async fn paid_intent(
    app: &TestApp,
    user: &AuthUser,
    course_id: Uuid,
) -> anyhow::Result<String> {
    let resp = checkout_service::buy_course(&app.state, user, course_id).await?;
    let payment_id = resp.data.expect("checkout").payment_intent_id;
    app.gateway.confirm(&payment_id);
    Ok(payment_id)
}

pub fn order_request(course: &Course, payment_id: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        email: Some("student@example.com".into()),
        course_id: Some(course.id.to_string()),
        payment_id: Some(payment_id.into()),
        amount: Some(course.price),
        currency: Some("inr".into()),
        status: Some("succeeded".into()),
    }
}
