pub mod auth;
pub mod json;
pub mod response;

pub use auth::{session_middleware, AuthUser};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
