use std::sync::Arc;

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::modules::gateways::models::CaptureOutcome;
use crate::modules::gateways::services::PaymentFacade;

/// Body of a capture request; without `amount` each source is captured in full
#[derive(Debug, Default, Deserialize)]
pub struct CaptureRequest {
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub order_number: String,
    pub captures: Vec<CaptureOutcome>,
}

/// Capture (or refund) the authorized payments of an order
/// POST /orders/{order_number}/capture
pub async fn capture_order(
    facade: web::Data<Arc<PaymentFacade>>,
    path: web::Path<String>,
    body: Option<web::Json<CaptureRequest>>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let request = body.map(|b| b.into_inner()).unwrap_or_default();

    let captures = facade.capture_order(&order_number, request.amount).await?;

    Ok(HttpResponse::Ok().json(CaptureResponse {
        order_number,
        captures,
    }))
}

/// Configure gateway routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("/{order_number}/capture", web::post().to(capture_order)),
    );
}
