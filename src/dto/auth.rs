use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bearer token payload. `sub` is the principal id, `role` is `user` or `admin`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
