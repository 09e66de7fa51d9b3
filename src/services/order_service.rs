use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CreateOrderRequest, OrderCreated, OrderList, OrderSummary, PurchaseSummary},
    entity::{
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        purchases::ActiveModel as PurchaseActive,
    },
    error::{AppError, AppResult, COURSE_ALREADY_PURCHASED, PAYMENT_ALREADY_PROCESSED},
    middleware::auth::{AuthUser, ROLE_USER, ensure_admin, ensure_role},
    models::{Order, PaymentStatus, normalize_currency},
    payments::{PaymentIntent, is_payment_intent_id},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{checkout_service::major_units, course_service, purchase_service},
    state::AppState,
};

pub const PAYMENT_MISMATCH: &str = "Payment does not match this purchase";
pub const PAYMENT_NOT_COMPLETED: &str = "Payment not completed successfully";

/// Order body after validation and normalization.
#[derive(Debug, Clone, PartialEq)]
struct ValidOrder {
    email: String,
    course_id: Uuid,
    payment_id: String,
    amount: f64,
    currency: String,
    status: PaymentStatus,
}

/// Payment outcome as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
struct Settlement {
    amount: f64,
    currency: String,
    status: PaymentStatus,
}

/// Records a confirmed payment as an Order plus the Purchase it grants.
///
/// Amount, currency and status are re-read from the provider; the client's
/// copies are only validated. Both rows are written in one transaction and
/// the unique indexes on `orders.payment_id` and `purchases(user_id,
/// course_id)` settle concurrent duplicates.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderCreated>> {
    ensure_role(user, ROLE_USER)?;
    let order = validate_order(payload)?;
    let course = course_service::find_course(&state.orm, order.course_id).await?;

    let processed = Orders::find()
        .filter(OrderCol::PaymentId.eq(order.payment_id.as_str()))
        .one(&state.orm)
        .await?;
    if processed.is_some() {
        return Err(AppError::Conflict(PAYMENT_ALREADY_PROCESSED.into()));
    }

    if purchase_service::find_purchase(&state.orm, user.user_id, course.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(COURSE_ALREADY_PURCHASED.into()));
    }

    let intent = state
        .payments
        .retrieve_payment_intent(&order.payment_id)
        .await?;
    let settlement = settle(&order, &intent, user.user_id, course.id)?;

    let txn = state.orm.begin().await?;
    let now = Utc::now();

    let order_row = OrderActive {
        id: Set(Uuid::new_v4()),
        email: Set(order.email),
        user_id: Set(user.user_id),
        course_id: Set(course.id),
        payment_id: Set(order.payment_id.clone()),
        amount: Set(settlement.amount),
        currency: Set(settlement.currency),
        status: Set(settlement.status.as_str().to_string()),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let purchase_row = PurchaseActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        course_id: Set(course.id),
        payment_id: Set(order.payment_id),
        progress: Set(0),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order_row.id,
        purchase_id = %purchase_row.id,
        user_id = %user.user_id,
        course_id = %course.id,
        payment_id = %order_row.payment_id,
        "order created and purchase recorded"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order_row.id, "payment_id": order_row.payment_id }),
    )
    .await;

    let order = order_from_entity(order_row);
    Ok(ApiResponse::success(
        "Order created and purchase recorded successfully",
        OrderCreated {
            order: OrderSummary {
                id: order.id,
                course_id: order.course_id,
                amount: order.amount,
                currency: order.currency,
                status: order.status,
                created_at: order.created_at,
            },
            purchase: PurchaseSummary {
                id: purchase_row.id,
                course_id: purchase_row.course_id,
                payment_id: purchase_row.payment_id,
                progress: purchase_row.progress,
                purchased_at: purchase_row.created_at.with_timezone(&Utc),
            },
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_deref().and_then(PaymentStatus::parse) {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

fn validate_order(payload: CreateOrderRequest) -> AppResult<ValidOrder> {
    let mut errors = Vec::new();

    let email = non_blank(payload.email)
        .map(|e| e.to_lowercase())
        .filter(|e| looks_like_email(e));
    if email.is_none() {
        errors.push("Valid email is required".to_string());
    }

    let course_id = match non_blank(payload.course_id) {
        None => {
            errors.push("Course ID is required".to_string());
            None
        }
        Some(raw) => match Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push("Invalid course ID format".to_string());
                None
            }
        },
    };

    // Provider intent ids only: `pi_` plus ASCII alphanumerics.
    let payment_id = match non_blank(payload.payment_id) {
        None => {
            errors.push("Payment ID is required".to_string());
            None
        }
        Some(raw) if !is_payment_intent_id(&raw) => {
            errors.push("Invalid payment ID format".to_string());
            None
        }
        Some(raw) => Some(raw),
    };

    let amount = payload.amount.filter(|a| a.is_finite() && *a > 0.0);
    if amount.is_none() {
        errors.push("Amount must be positive".to_string());
    }

    let currency = non_blank(payload.currency).map(|c| normalize_currency(&c));
    if currency.is_none() {
        errors.push("Currency is required".to_string());
    }

    let status = match non_blank(payload.status) {
        None => {
            errors.push("Payment status is required".to_string());
            None
        }
        Some(raw) => {
            let parsed = PaymentStatus::parse(&raw);
            if parsed.is_none() {
                errors.push(format!("Invalid payment status: {raw}"));
            }
            parsed
        }
    };

    match (email, course_id, payment_id, amount, currency, status) {
        (
            Some(email),
            Some(course_id),
            Some(payment_id),
            Some(amount),
            Some(currency),
            Some(status),
        ) if errors.is_empty() => Ok(ValidOrder {
            email,
            course_id,
            payment_id,
            amount,
            currency,
            status,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

fn settle(
    order: &ValidOrder,
    intent: &PaymentIntent,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<Settlement> {
    if intent.id != order.payment_id || !intent.belongs_to(user_id, course_id) {
        tracing::warn!(
            payment_id = %order.payment_id,
            %user_id,
            %course_id,
            "payment intent metadata mismatch"
        );
        return Err(AppError::Conflict(PAYMENT_MISMATCH.into()));
    }
    if !intent.is_succeeded() {
        return Err(AppError::BadRequest(PAYMENT_NOT_COMPLETED.into()));
    }

    let settlement = Settlement {
        amount: major_units(intent.amount),
        currency: normalize_currency(&intent.currency),
        status: PaymentStatus::Succeeded,
    };
    if settlement.amount != order.amount
        || settlement.currency != order.currency
        || settlement.status != order.status
    {
        tracing::warn!(
            payment_id = %order.payment_id,
            client_amount = order.amount,
            provider_amount = settlement.amount,
            client_currency = %order.currency,
            provider_currency = %settlement.currency,
            client_status = order.status.as_str(),
            "client payment details differ from provider, using provider values"
        );
    }
    Ok(settlement)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Same shape as `\S+@\S+\.\S+`.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    match domain.rfind('.') {
        Some(dot) => !local.is_empty() && dot > 0 && dot + 1 < domain.len(),
        None => false,
    }
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        email: model.email,
        user_id: model.user_id,
        course_id: model.course_id,
        payment_id: model.payment_id,
        amount: model.amount,
        currency: model.currency,
        status: PaymentStatus::parse(&model.status).unwrap_or(PaymentStatus::Pending),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
