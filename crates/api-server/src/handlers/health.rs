use crate::extract::Json;
use crate::response::ApiResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::ok(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
