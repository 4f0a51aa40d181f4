use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use stripe_checkout::config::Config;
use stripe_checkout::middleware::RequestId;
use stripe_checkout::modules::checkout::{self, CheckoutService};
use stripe_checkout::modules::gateways::{self, ChargeGateway, PaymentFacade, StripeClient};
use stripe_checkout::modules::health::{self, HealthState};
use stripe_checkout::modules::orders::{CheckoutStore, InMemoryStore, MySqlStore};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stripe_checkout=debug,actix_web=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env().map_err(startup_error)?;
    config.validate().map_err(startup_error)?;

    init_tracing(config.app.log_format == "json");

    tracing::info!("Starting Stripe checkout service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!(
        capture_mode = %config.stripe.capture_mode,
        currency = %config.stripe.currency,
        default_partner = %config.checkout.default_partner_id,
        "Checkout configured"
    );

    let (store, store_kind): (Arc<dyn CheckoutStore>, &'static str) = match &config.database {
        Some(database) => {
            let pool = database.create_pool().await.map_err(startup_error)?;
            let store = MySqlStore::new(pool);
            store.migrate().await.map_err(startup_error)?;
            tracing::info!(
                "Database pool initialized ({} connections)",
                database.pool_size
            );
            let store: Arc<dyn CheckoutStore> = Arc::new(store);
            (store, "mysql")
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            let store: Arc<dyn CheckoutStore> = Arc::new(InMemoryStore::new());
            (store, "memory")
        }
    };

    let gateway: Arc<dyn ChargeGateway> = Arc::new(StripeClient::new(
        Some(config.stripe.api_base.clone()),
        Duration::from_secs(config.stripe.timeout_secs),
    ));

    let facade = Arc::new(PaymentFacade::new(gateway, store.clone(), &config.stripe));
    let checkout_service = Arc::new(CheckoutService::new(
        facade.clone(),
        store,
        config.checkout.default_partner_id.clone(),
        config.stripe.publishable_key.clone(),
    ));
    let health_state = HealthState {
        store: store_kind,
        gateway: "stripe",
        capture_mode: config.stripe.capture_mode,
    };

    let bind_address = config.server.bind_address();
    tracing::info!("Server binding to: {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(facade.clone()))
            .app_data(web::Data::new(checkout_service.clone()))
            .app_data(web::Data::new(health_state.clone()))
            .configure(health::configure)
            .configure(checkout::configure)
            .configure(gateways::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}
