use std::sync::Arc;

use crate::{db::OrmConn, payments::PaymentGateway};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub payments: Arc<dyn PaymentGateway>,
    pub jwt_secret: Arc<str>,
}
