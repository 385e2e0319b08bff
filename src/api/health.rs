use chrono::Utc;
use poem_openapi::{payload::Json, Object, OpenApi, Tags};

/// Health check API
pub struct HealthApi;

/// Response model for the health endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// API tags for health endpoints
#[derive(Tags)]
enum ApiTags {
    /// Health check endpoints
    Health,
}

#[OpenApi]
impl HealthApi {
    /// Health check endpoint
    ///
    /// Returns the current status of the API service
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}
