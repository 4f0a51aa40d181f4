use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::checkout::models::StripeTokenForm;
use crate::modules::checkout::services::CheckoutService;

/// Payment details page context
/// GET /checkout/payment-details
pub async fn payment_details(service: web::Data<Arc<CheckoutService>>) -> HttpResponse {
    HttpResponse::Ok().json(service.payment_details_context())
}

/// Preview page context after Stripe.js tokenized the card
/// POST /checkout/{order_number}/preview
pub async fn preview(
    service: web::Data<Arc<CheckoutService>>,
    path: web::Path<String>,
    form: web::Form<StripeTokenForm>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let context = service.preview_context(&order_number, &form).await?;

    Ok(HttpResponse::Ok().json(context))
}

/// Charge the order across partner accounts
/// POST /checkout/{order_number}/payment
pub async fn submit_payment(
    service: web::Data<Arc<CheckoutService>>,
    path: web::Path<String>,
    form: web::Form<StripeTokenForm>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();

    tracing::info!(order_number = %order_number, "Checkout payment submitted");

    let receipt = service.handle_payment(&order_number, &form).await?;

    Ok(HttpResponse::Created().json(receipt))
}

/// Configure checkout routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkout")
            .route("/payment-details", web::get().to(payment_details))
            .route("/{order_number}/preview", web::post().to(preview))
            .route("/{order_number}/payment", web::post().to(submit_payment)),
    );
}
