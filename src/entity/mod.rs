pub mod audit_logs;
pub mod courses;
pub mod orders;
pub mod purchases;

pub use audit_logs::Entity as AuditLogs;
pub use courses::Entity as Courses;
pub use orders::Entity as Orders;
pub use purchases::Entity as Purchases;
