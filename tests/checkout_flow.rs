mod common;

use common::{admin, order_request, paid_intent, seed_course, setup, user};
use course_market_api::{
    dto::courses::UpdateCourseRequest,
    error::AppError,
    models::PaymentStatus,
    services::{
        checkout_service::{self, ALREADY_PURCHASED},
        course_service, order_service, purchase_service,
    },
};
use uuid::Uuid;

#[tokio::test]
async fn buying_a_course_records_order_and_purchase() -> anyhow::Result<()> {
    let app = setup().await?;
    let admin = admin();
    let student = user();
    let course = seed_course(&app, &admin, "Algorithms", 899.0).await?;

    let checkout = checkout_service::buy_course(&app.state, &student, course.id)
        .await?
        .data
        .expect("checkout");
    assert_eq!(checkout.course.id, course.id);
    assert_eq!(checkout.course.title, "Algorithms");
    assert!(!checkout.client_secret.is_empty());

    let intent = app
        .gateway
        .intent(&checkout.payment_intent_id)
        .expect("intent at provider");
    assert_eq!(intent.amount, 89900);
    assert_eq!(intent.currency, "inr");

    app.gateway.confirm(&checkout.payment_intent_id);
    let created = order_service::create_order(
        &app.state,
        &student,
        order_request(&course, &checkout.payment_intent_id),
    )
    .await?;
    assert_eq!(
        created.message,
        "Order created and purchase recorded successfully"
    );
    let created = created.data.expect("order created");
    assert_eq!(created.order.amount, 899.0);
    assert_eq!(created.order.currency, "INR");
    assert_eq!(created.order.status, PaymentStatus::Succeeded);
    assert_eq!(created.purchase.course_id, course.id);
    assert_eq!(created.purchase.payment_id, checkout.payment_intent_id);
    assert_eq!(created.purchase.progress, 0);

    let library = purchase_service::list_purchases(&app.state, &student)
        .await?
        .data
        .expect("purchases");
    assert_eq!(library.purchases.len(), 1);
    assert_eq!(library.courses.len(), 1);
    assert_eq!(library.courses[0].title, "Algorithms");
    assert_eq!(library.courses[0].price, 899.0);
    Ok(())
}

#[tokio::test]
async fn owned_courses_cannot_be_bought_again() -> anyhow::Result<()> {
    let app = setup().await?;
    let admin = admin();
    let student = user();
    let course = seed_course(&app, &admin, "Algorithms", 899.0).await?;

    let payment_id = paid_intent(&app, &student, course.id).await?;
    order_service::create_order(&app.state, &student, order_request(&course, &payment_id))
        .await?;
    let intents_before = app.gateway.created();

    let err = checkout_service::buy_course(&app.state, &student, course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m == ALREADY_PURCHASED));
    assert_eq!(app.gateway.created(), intents_before);

    // Another student is unaffected.
    checkout_service::buy_course(&app.state, &user(), course.id).await?;
    assert_eq!(app.gateway.created(), intents_before + 1);
    Ok(())
}

#[tokio::test]
async fn unknown_courses_open_no_intent() -> anyhow::Result<()> {
    let app = setup().await?;

    let err = checkout_service::buy_course(&app.state, &user(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Course")));
    assert_eq!(app.gateway.created(), 0);
    Ok(())
}

#[tokio::test]
async fn provider_errors_are_passed_through() -> anyhow::Result<()> {
    let app = setup().await?;
    let course = seed_course(&app, &admin(), "Databases", 499.0).await?;
    app.gateway.fail_with("Your account cannot currently make live charges.");

    let err = checkout_service::buy_course(&app.state, &user(), course.id)
        .await
        .unwrap_err();
    let AppError::Upstream(message) = err else {
        panic!("expected upstream error, got {err:?}");
    };
    assert_eq!(message, "Your account cannot currently make live charges.");
    Ok(())
}

#[tokio::test]
async fn admins_cannot_buy_courses() -> anyhow::Result<()> {
    let app = setup().await?;
    let admin = admin();
    let course = seed_course(&app, &admin, "Algorithms", 899.0).await?;

    let err = checkout_service::buy_course(&app.state, &admin, course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    assert_eq!(app.gateway.created(), 0);
    Ok(())
}

#[tokio::test]
async fn new_students_have_an_empty_library() -> anyhow::Result<()> {
    let app = setup().await?;
    seed_course(&app, &admin(), "Algorithms", 899.0).await?;

    let library = purchase_service::list_purchases(&app.state, &user())
        .await?
        .data
        .expect("purchases");
    assert!(library.purchases.is_empty());
    assert!(library.courses.is_empty());
    Ok(())
}

#[tokio::test]
async fn library_shows_current_catalog_details() -> anyhow::Result<()> {
    let app = setup().await?;
    let admin = admin();
    let student = user();
    let course = seed_course(&app, &admin, "Algorithms", 899.0).await?;
    let payment_id = paid_intent(&app, &student, course.id).await?;
    order_service::create_order(&app.state, &student, order_request(&course, &payment_id))
        .await?;

    course_service::update_course(
        &app.state,
        &admin,
        course.id,
        UpdateCourseRequest {
            title: Some("Algorithms II".into()),
            price: Some(999.0),
            ..Default::default()
        },
    )
    .await?;

    let library = purchase_service::list_purchases(&app.state, &student)
        .await?
        .data
        .expect("purchases");
    assert_eq!(library.courses[0].title, "Algorithms II");
    assert_eq!(library.courses[0].price, 999.0);
    Ok(())
}
