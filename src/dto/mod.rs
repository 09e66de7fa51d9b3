pub mod auth;
pub mod checkout;
pub mod courses;
pub mod orders;
pub mod purchases;
