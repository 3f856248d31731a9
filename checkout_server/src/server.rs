use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use checkout_engine::{
    events::EventProducers,
    CartApi,
    CheckoutFlowApi,
    OrderApi,
    PaymentProvider,
    SqliteDatabase,
    StoreApi,
};
use log::*;

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::{email::create_email_event_handlers, gateway::GatewayProvider},
    routes::{
        health,
        AddAddressRoute,
        AddToCartRoute,
        CheckoutRoute,
        MyAddressesRoute,
        MyCartRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        ProductsRoute,
        RemoveCartItemRoute,
        SearchOrdersRoute,
        UpdateCartItemRoute,
        UpdateOrderStatusRoute,
        UpsertProductRoute,
        VerifyPaymentGetRoute,
        VerifyPaymentPostRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let provider =
        GatewayProvider::new(config.gateway.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_email_event_handlers(config.email.as_ref())?;
    let producers = handlers.producers();
    handlers.start_handlers();
    let expiry_api = CheckoutFlowApi::new(db.clone(), provider.clone(), producers.clone(), config.checkout_options());
    let _expiry = start_expiry_worker(expiry_api, config.expiry_interval);
    let srv = create_server_instance(config, db, provider, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: GatewayProvider,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let bind = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let flow_api =
            CheckoutFlowApi::new(db.clone(), provider.clone(), producers.clone(), config.checkout_options());
        let cart_api = CartApi::new(db.clone(), config.pricing);
        let orders_api = OrderApi::new(db.clone());
        let store_api = StoreApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.session_secret);
        let options = ServerOptions::from_config(&config);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("checkout::access_log"))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(store_api))
            .app_data(web::Data::new(token_issuer))
            .app_data(web::Data::new(options));
        app.configure(configure_routes::<GatewayProvider>)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(bind)?
    .run();
    info!("💻️ Server listening");
    Ok(srv)
}

/// Registers every route against the SQLite backend and the given payment provider.
///
/// The application data (`CheckoutFlowApi`, `CartApi`, `OrderApi`, `StoreApi`, `TokenIssuer` and `ServerOptions`) must
/// already have been attached to the app.
pub fn configure_routes<P>(cfg: &mut web::ServiceConfig)
where P: PaymentProvider + 'static {
    let api_scope = web::scope("/api")
        .service(CheckoutRoute::<SqliteDatabase, P>::new())
        .service(MyCartRoute::<SqliteDatabase>::new())
        .service(AddToCartRoute::<SqliteDatabase>::new())
        .service(UpdateCartItemRoute::<SqliteDatabase>::new())
        .service(RemoveCartItemRoute::<SqliteDatabase>::new())
        .service(MyAddressesRoute::<SqliteDatabase>::new())
        .service(AddAddressRoute::<SqliteDatabase>::new())
        .service(ProductsRoute::<SqliteDatabase>::new())
        .service(UpsertProductRoute::<SqliteDatabase>::new())
        .service(MyOrdersRoute::<SqliteDatabase>::new())
        .service(OrderByIdRoute::<SqliteDatabase>::new())
        .service(SearchOrdersRoute::<SqliteDatabase>::new())
        .service(UpdateOrderStatusRoute::<SqliteDatabase, P>::new());
    cfg.service(health)
        .service(VerifyPaymentGetRoute::<SqliteDatabase, P>::new())
        .service(VerifyPaymentPostRoute::<SqliteDatabase, P>::new())
        .service(api_scope);
}
