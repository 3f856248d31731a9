use actix_web::{
    body::to_bytes,
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use checkout_engine::{
    db_types::{NewAddress, NewProduct, NewUser, Role},
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path, FakeProvider},
    CartApi,
    CheckoutFlowApi,
    OrderApi,
    SqliteDatabase,
    StoreApi,
};
use chrono::Duration;
use log::debug;
use storefront_common::{Money, Secret};

use crate::{
    auth::{SessionClaims, TokenIssuer, SESSION_HEADER},
    config::{ServerConfig, ServerOptions},
    server::configure_routes,
};

pub const STOREFRONT_URL: &str = "https://shop.example.test";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> String {
        self.headers.get("location").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Response was not JSON")
    }
}

/// A throwaway store: a fresh database with two shoppers, an admin, a product and a saved address.
pub struct TestStore {
    pub db: SqliteDatabase,
    pub provider: FakeProvider,
    pub config: ServerConfig,
    pub alice: i64,
    pub bob: i64,
    pub admin: i64,
    pub stool: i64,
    pub alice_address: i64,
}

impl TestStore {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Could not open test database");
        let mut config = ServerConfig::new("127.0.0.1", 8360);
        config.database_url = url;
        config.storefront_url = STOREFRONT_URL.to_string();
        config.public_url = "https://checkout.example.test".to_string();
        config.session_secret = Secret::new("endpoint test key, used nowhere else".to_string());
        let store = StoreApi::new(db.clone());
        let alice = store.create_user(NewUser::new("alice@example.com", "Alice")).await.unwrap().id;
        let bob = store.create_user(NewUser::new("bob@example.com", "Bob")).await.unwrap().id;
        let admin = store.create_user(NewUser::new("admin@example.com", "Admin")).await.unwrap().id;
        let stool = store.upsert_product(NewProduct::new("Stool", Money::from_major(1000))).await.unwrap().id;
        let address = NewAddress {
            user_id: alice,
            full_name: "Alice Shopper".into(),
            line1: "12 MG Road".into(),
            line2: None,
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            postal_code: "560001".into(),
            country: "India".into(),
            phone: "9876543210".into(),
        };
        let alice_address = store.add_address(alice, address).await.unwrap().id;
        Self { db, provider: FakeProvider::new(), config, alice, bob, admin, stool, alice_address }
    }

    pub fn token(&self, user_id: i64, roles: Vec<Role>) -> String {
        let claims = SessionClaims::new(user_id, roles, Duration::hours(1));
        TokenIssuer::new(&self.config.session_secret).issue_token(&claims).expect("Could not issue token")
    }

    pub fn user_token(&self, user_id: i64) -> String {
        self.token(user_id, vec![Role::User])
    }

    pub fn admin_token(&self) -> String {
        self.token(self.admin, vec![Role::User, Role::Admin])
    }

    /// Sends `req` (with the session token, if not empty) to an app wired up exactly like the real server, apart from
    /// the payment provider.
    pub async fn send(&self, token: &str, req: TestRequest) -> TestResponse {
        let req = if token.is_empty() { req } else { req.insert_header((SESSION_HEADER, token)) };
        let flow_api = CheckoutFlowApi::new(
            self.db.clone(),
            self.provider.clone(),
            EventProducers::default(),
            self.config.checkout_options(),
        );
        let app = App::new()
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(CartApi::new(self.db.clone(), self.config.pricing)))
            .app_data(web::Data::new(OrderApi::new(self.db.clone())))
            .app_data(web::Data::new(StoreApi::new(self.db.clone())))
            .app_data(web::Data::new(TokenIssuer::new(&self.config.session_secret)))
            .app_data(web::Data::new(ServerOptions::from_config(&self.config)))
            .configure(configure_routes::<FakeProvider>);
        let service = test::init_service(app).await;
        debug!("🚀️ Making request");
        match test::try_call_service(&service, req.to_request()).await {
            Ok(res) => {
                let status = res.status();
                let headers = res.headers().clone();
                let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
                TestResponse { status, headers, body }
            },
            Err(e) => {
                let res = e.error_response();
                let status = res.status();
                let headers = res.headers().clone();
                let bytes = to_bytes(res.into_body()).await.unwrap_or_default();
                let body = String::from_utf8_lossy(&bytes).into_owned();
                TestResponse { status, headers, body }
            },
        }
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}
