use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        checkout::BuyCourseResponse,
        courses::{CourseList, CreateCourseRequest, UpdateCourseRequest},
        orders::{CreateOrderRequest, OrderCreated, OrderList, OrderSummary, PurchaseSummary},
        purchases::PurchaseList,
    },
    models::{Course, CourseImage, CourseSummary, Order, PaymentStatus, Purchase},
    response::{ApiResponse, Meta},
    routes::{courses, health, orders, params, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        courses::list_courses,
        courses::get_course,
        courses::create_course,
        courses::update_course,
        courses::delete_course,
        courses::buy_course,
        orders::create_order,
        orders::list_all_orders,
        users::purchases
    ),
    components(
        schemas(
            Course,
            CourseImage,
            CourseSummary,
            Order,
            Purchase,
            PaymentStatus,
            CourseList,
            CreateCourseRequest,
            UpdateCourseRequest,
            BuyCourseResponse,
            CreateOrderRequest,
            OrderCreated,
            OrderSummary,
            PurchaseSummary,
            OrderList,
            PurchaseList,
            params::Pagination,
            params::CourseQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Course>,
            ApiResponse<CourseList>,
            ApiResponse<BuyCourseResponse>,
            ApiResponse<OrderCreated>,
            ApiResponse<OrderList>,
            ApiResponse<PurchaseList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Courses", description = "Course catalog endpoints"),
        (name = "Checkout", description = "Payment initiation"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Users", description = "Current user endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
