//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database calls, calls to the
//! payment provider) must be awaited, never blocked on.
use actix_web::{get, http::header, web, HttpResponse, Responder};
use checkout_engine::{
    db_types::{NewAddress, NewProduct, OrderId, Role},
    order_objects::{CheckoutRequest, OrderQueryFilter, VerificationOutcome},
    CartApi,
    CartManagement,
    CheckoutDatabase,
    CheckoutFlowApi,
    OrderApi,
    OrderManagement,
    PaymentProvider,
    StoreApi,
    StoreManagement,
};
use log::*;

use crate::{
    auth::SessionClaims,
    config::ServerOptions,
    data_objects::{
        AddToCartParams,
        JsonResponse,
        OrderSearchParams,
        ProductParams,
        StatusUpdateParams,
        UpdateQuantityParams,
        VerifyParams,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl <$($param:ident : $first:ident $(+ $rest:ident)*),+>) => {
        paste::paste! { pub struct [<$name:camel Route>]<$($param),+>(core::marker::PhantomData<fn() -> ($($param,)+)>);}
        paste::paste! { impl<$($param),+> [<$name:camel Route>]<$($param),+> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<$($param),+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$($param),+>
        where
            $($param: $first $(+ $rest)* + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<$($param),+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl <$($param:ident : $first:ident $(+ $rest:ident)*),+> requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<$($param),+>(core::marker::PhantomData<fn() -> ($($param,)+)>);}
        paste::paste! { impl<$($param),+> [<$name:camel Route>]<$($param),+> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<$($param),+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$($param),+>
        where
            $($param: $first $(+ $rest)* + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<$($param),+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl <B: CheckoutDatabase, P: PaymentProvider> requires [Role::User]);
/// Starts a payment for the caller's cart and returns the hosted payment page to send the browser to.
///
/// The body carries the total the customer was shown (in rupees), the shipping address id and a 10-digit mobile
/// number. The amount must match the server's own calculation exactly.
pub async fn checkout<B, P>(
    claims: SessionClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    debug!("💻️ Checkout request from user #{}", claims.user_id);
    let payment = api.initiate_payment(claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payment))
}

//----------------------------------------------   Verification  ------------------------------------------------
route!(verify_payment_get => Get "/payment/verify" impl <B: CheckoutDatabase, P: PaymentProvider>);
/// The browser lands here after the hosted payment page. Always answers with a redirect to the storefront.
pub async fn verify_payment_get<B, P>(
    query: web::Query<VerifyParams>,
    api: web::Data<CheckoutFlowApi<B, P>>,
    options: web::Data<ServerOptions>,
) -> HttpResponse
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    verify_and_redirect(query.into_inner(), api.as_ref(), options.as_ref()).await
}

route!(verify_payment_post => Post "/payment/verify" impl <B: CheckoutDatabase, P: PaymentProvider>);
/// Some payment modes POST the result back instead. Parameters missing from the query string are taken from the form
/// body.
pub async fn verify_payment_post<B, P>(
    query: web::Query<VerifyParams>,
    form: Option<web::Form<VerifyParams>>,
    api: web::Data<CheckoutFlowApi<B, P>>,
    options: web::Data<ServerOptions>,
) -> HttpResponse
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    let params = query.into_inner().or(form.map(|f| f.into_inner()));
    verify_and_redirect(params, api.as_ref(), options.as_ref()).await
}

async fn verify_and_redirect<B, P>(
    params: VerifyParams,
    api: &CheckoutFlowApi<B, P>,
    options: &ServerOptions,
) -> HttpResponse
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    trace!("💻️ Payment verification request: {params:?}");
    let outcome = api.verify_payment(params.order_id.as_deref(), params.transaction_id.as_deref()).await;
    let location = verification_redirect(&outcome, &options.storefront_url);
    debug!("💻️ Verification outcome {outcome:?}. Redirecting to {location}");
    HttpResponse::Found().insert_header((header::LOCATION, location)).finish()
}

/// The storefront page that a verification outcome leads to.
pub fn verification_redirect(outcome: &VerificationOutcome, storefront_url: &str) -> String {
    use urlencoding::encode;
    match outcome {
        VerificationOutcome::Finalized(oid) | VerificationOutcome::AlreadyFinalized(oid) => {
            format!("{storefront_url}/order-success?orderId={}", encode(oid.as_str()))
        },
        VerificationOutcome::Failed { order_id: Some(oid), reason } => format!(
            "{storefront_url}/payment-failed?orderId={}&error={}",
            encode(oid.as_str()),
            encode(&reason.to_string())
        ),
        VerificationOutcome::Failed { order_id: None, reason } => {
            format!("{storefront_url}/payment-failed?error={}", encode(&reason.to_string()))
        },
    }
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart" impl <B: CartManagement + StoreManagement> requires [Role::User]);
pub async fn my_cart<B>(claims: SessionClaims, api: web::Data<CartApi<B>>) -> Result<HttpResponse, ServerError>
where B: CartManagement + StoreManagement {
    let cart = api.cart(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(add_to_cart => Post "/cart" impl <B: CartManagement + StoreManagement> requires [Role::User]);
pub async fn add_to_cart<B>(
    claims: SessionClaims,
    body: web::Json<AddToCartParams>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CartManagement + StoreManagement,
{
    let AddToCartParams { product_id, quantity, color } = body.into_inner();
    let item = api.add_item(claims.user_id, product_id, quantity, &color).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(update_cart_item => Patch "/cart/{id}" impl <B: CartManagement + StoreManagement> requires [Role::User]);
pub async fn update_cart_item<B>(
    claims: SessionClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateQuantityParams>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CartManagement + StoreManagement,
{
    let item = api.update_quantity(claims.user_id, path.into_inner(), body.quantity).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(remove_cart_item => Delete "/cart/{id}" impl <B: CartManagement + StoreManagement> requires [Role::User]);
pub async fn remove_cart_item<B>(
    claims: SessionClaims,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CartManagement + StoreManagement,
{
    let id = path.into_inner();
    api.remove_item(claims.user_id, id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Cart item {id} removed"))))
}

//----------------------------------------------   Addresses  ----------------------------------------------------
route!(my_addresses => Get "/addresses" impl <B: StoreManagement> requires [Role::User]);
pub async fn my_addresses<B>(claims: SessionClaims, api: web::Data<StoreApi<B>>) -> Result<HttpResponse, ServerError>
where B: StoreManagement {
    let addresses = api.addresses_for_user(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(addresses))
}

route!(add_address => Post "/addresses" impl <B: StoreManagement> requires [Role::User]);
pub async fn add_address<B>(
    claims: SessionClaims,
    body: web::Json<NewAddress>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: StoreManagement,
{
    let address = api.add_address(claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(address))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(products => Get "/products" impl <B: StoreManagement>);
pub async fn products<B>(api: web::Data<StoreApi<B>>) -> Result<HttpResponse, ServerError>
where B: StoreManagement {
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(upsert_product => Put "/admin/products" impl <B: StoreManagement> requires [Role::Admin]);
pub async fn upsert_product<B>(
    body: web::Json<ProductParams>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: StoreManagement,
{
    let product = NewProduct::try_from(body.into_inner()).map_err(ServerError::InvalidRequestBody)?;
    let product = api.upsert_product(product).await?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl <B: OrderManagement> requires [Role::User]);
pub async fn my_orders<B>(claims: SessionClaims, api: web::Data<OrderApi<B>>) -> Result<HttpResponse, ServerError>
where B: OrderManagement {
    let orders = api.orders_for_user(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl <B: OrderManagement> requires [Role::User]);
/// An order and its items. Customers only see their own orders; admins see any order.
pub async fn order_by_id<B>(
    claims: SessionClaims,
    path: web::Path<String>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
{
    let order_id = OrderId::from(path.into_inner());
    let viewer = (!claims.is_admin()).then_some(claims.user_id);
    let details = api.order_details(&order_id, viewer).await?;
    Ok(HttpResponse::Ok().json(details))
}

route!(search_orders => Get "/admin/orders" impl <B: OrderManagement> requires [Role::Admin]);
pub async fn search_orders<B>(
    query: web::Query<OrderSearchParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
{
    let filter = OrderQueryFilter::try_from(query.into_inner()).map_err(ServerError::InvalidRequestBody)?;
    let orders = api.search_orders(filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order_status => Patch "/admin/orders/{order_id}/status"
    impl <B: CheckoutDatabase, P: PaymentProvider> requires [Role::Admin]);
pub async fn update_order_status<B, P>(
    claims: SessionClaims,
    path: web::Path<String>,
    body: web::Json<StatusUpdateParams>,
    api: web::Data<CheckoutFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    let order_id = OrderId::from(path.into_inner());
    info!("💻️ Admin #{} is moving order {order_id} to {}", claims.user_id, body.status);
    let order = api.modify_status_for_order(&order_id, body.status).await?;
    Ok(HttpResponse::Ok().json(order))
}
