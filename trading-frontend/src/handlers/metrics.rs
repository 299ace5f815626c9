use web_core::error::AppError;

pub async fn metrics() -> Result<String, AppError> {
    crate::services::metrics::get_metrics()
}
