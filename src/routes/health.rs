use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

/// Root probe. Always 200 while the process is up.
#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Todo API is running"
    }))
}

/// Liveness probe. Does not touch the database.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy"
    }))
}
