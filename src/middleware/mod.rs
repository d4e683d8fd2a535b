pub mod principal;
pub mod response;

pub use principal::{principal_middleware, Principal};
pub use response::{ApiResponse, ApiResult};
