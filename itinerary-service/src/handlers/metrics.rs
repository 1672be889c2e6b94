use crate::services::metrics::get_metrics;
use axum::response::IntoResponse;
use service_core::error::AppError;

pub async fn metrics() -> Result<impl IntoResponse, AppError> {
    Ok(get_metrics()?)
}
