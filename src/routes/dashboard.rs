use crate::{dashboard, error::AppError};
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// Read-only aggregation snapshot: counts plus the most recent tasks.
#[get("/stats")]
pub async fn get_stats(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let stats = dashboard::compute_stats(&pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "stats": stats,
    })))
}
