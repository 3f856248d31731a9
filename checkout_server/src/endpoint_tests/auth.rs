use actix_web::{http::StatusCode, test::TestRequest};
use checkout_engine::db_types::Role;

use super::helpers::TestStore;

#[actix_web::test]
async fn health_needs_no_session() {
    let store = TestStore::new().await;
    let res = store.send("", TestRequest::get().uri("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    store.close().await;
}

#[actix_web::test]
async fn products_are_public() {
    let store = TestStore::new().await;
    let res = store.send("", TestRequest::get().uri("/api/products")).await;
    assert_eq!(res.status, StatusCode::OK);
    let products = res.json();
    assert_eq!(products[0]["name"], "Stool");
    assert_eq!(products[0]["price"], 100_000);
    store.close().await;
}

#[actix_web::test]
async fn cart_without_session_is_unauthorized() {
    let store = TestStore::new().await;
    let res = store.send("", TestRequest::get().uri("/api/cart")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    store.close().await;
}

#[actix_web::test]
async fn tampered_token_is_rejected() {
    let store = TestStore::new().await;
    let mut token = store.user_token(store.alice);
    let n = token.len();
    token.replace_range(n - 6..n - 1, "AAAAA");
    let res = store.send(&token, TestRequest::get().uri("/api/cart")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    store.close().await;
}

#[actix_web::test]
async fn token_from_another_key_is_rejected() {
    let store = TestStore::new().await;
    let mut other = TestStore::new().await;
    other.config.session_secret = storefront_common::Secret::new("some other key".to_string());
    let token = other.user_token(store.alice);
    let res = store.send(&token, TestRequest::get().uri("/api/orders")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    store.close().await;
    other.close().await;
}

#[actix_web::test]
async fn admin_routes_need_the_admin_role() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    let res = store.send(&token, TestRequest::get().uri("/api/admin/orders")).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let req = TestRequest::put().uri("/api/admin/products").set_json(serde_json::json!({"name": "Lamp", "price": "1"}));
    let res = store.send(&token, req).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    store.close().await;
}

#[actix_web::test]
async fn admins_can_manage_products() {
    let store = TestStore::new().await;
    let token = store.admin_token();
    let req =
        TestRequest::put().uri("/api/admin/products").set_json(serde_json::json!({"name": "Lamp", "price": "1499.50"}));
    let res = store.send(&token, req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["price"], 149_950);
    let res = store.send("", TestRequest::get().uri("/api/products")).await;
    assert_eq!(res.json().as_array().map(Vec::len), Some(2));
    store.close().await;
}

#[actix_web::test]
async fn session_cookie_is_accepted() {
    let store = TestStore::new().await;
    let token = store.token(store.bob, vec![Role::User]);
    let req = TestRequest::get().uri("/api/cart").cookie(actix_web::cookie::Cookie::new("checkout_session", token));
    let res = store.send("", req).await;
    assert_eq!(res.status, StatusCode::OK);
    store.close().await;
}
