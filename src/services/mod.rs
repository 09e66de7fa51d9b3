pub mod checkout_service;
pub mod course_service;
pub mod order_service;
pub mod purchase_service;
