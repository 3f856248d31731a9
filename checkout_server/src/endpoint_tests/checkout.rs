use actix_web::{http::StatusCode, test::TestRequest};
use checkout_engine::traits::ProviderStatus;
use serde_json::json;
use storefront_common::Money;

use super::helpers::{TestResponse, TestStore, STOREFRONT_URL};

async fn fill_cart(store: &TestStore, token: &str) {
    let req = TestRequest::post().uri("/api/cart").set_json(json!({"product_id": store.stool, "color": "Teak"}));
    assert_eq!(store.send(token, req).await.status, StatusCode::OK);
}

async fn checkout(store: &TestStore, token: &str, amount: &str) -> TestResponse {
    let body = json!({"amount": amount, "address_id": store.alice_address, "mobile_number": "9876543210"});
    store.send(token, TestRequest::post().uri("/api/checkout").set_json(body)).await
}

/// The local part of the url the provider was asked to send the browser back to.
fn return_path(store: &TestStore) -> String {
    let request = store.provider.last_request().expect("No payment was initiated");
    request.redirect_url.trim_start_matches("https://checkout.example.test").to_string()
}

#[actix_web::test]
async fn checkout_then_verify_finalizes_the_order() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    fill_cart(&store, &token).await;

    let res = checkout(&store, &token, "1680.00").await;
    assert_eq!(res.status, StatusCode::OK);
    let payment = res.json();
    let order_id = payment["order_id"].as_str().unwrap().to_string();
    assert!(payment["redirect_url"].as_str().unwrap().starts_with("https://pay.example.test/page/"));
    let request = store.provider.last_request().unwrap();
    assert_eq!(request.amount, Money::from_major(1680));
    assert!(request.redirect_url.contains(&format!("orderId={order_id}")));

    store.provider.set_status(&request.transaction_id, ProviderStatus::paid(request.amount, Some("UPI_INTENT")));
    let res = store.send("", TestRequest::get().uri(&return_path(&store))).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location(), format!("{STOREFRONT_URL}/order-success?orderId={order_id}"));

    let details = store.send(&token, TestRequest::get().uri(&format!("/api/orders/{order_id}"))).await.json();
    assert_eq!(details["order"]["status"], "processing");
    assert_eq!(details["order"]["payment_method"], "UPI");
    assert_eq!(details["items"][0]["color"], "Teak");
    let cart = store.send(&token, TestRequest::get().uri("/api/cart")).await.json();
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));

    // The browser coming back a second time changes nothing
    let res = store.send("", TestRequest::get().uri(&return_path(&store))).await;
    assert_eq!(res.location(), format!("{STOREFRONT_URL}/order-success?orderId={order_id}"));
    let details = store.send(&token, TestRequest::get().uri(&format!("/api/orders/{order_id}"))).await.json();
    assert_eq!(details["items"].as_array().map(Vec::len), Some(1));
    store.close().await;
}

#[actix_web::test]
async fn verification_also_accepts_a_posted_form() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    fill_cart(&store, &token).await;
    let order_id = checkout(&store, &token, "1680").await.json()["order_id"].as_str().unwrap().to_string();
    let request = store.provider.last_request().unwrap();
    store.provider.set_status(&request.transaction_id, ProviderStatus::paid(request.amount, None::<String>));

    let req = TestRequest::post()
        .uri("/payment/verify")
        .set_form([("orderId", order_id.as_str()), ("transactionId", request.transaction_id.as_str())]);
    let res = store.send("", req).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location(), format!("{STOREFRONT_URL}/order-success?orderId={order_id}"));
    store.close().await;
}

#[actix_web::test]
async fn missing_parameters_redirect_to_the_failure_page() {
    let store = TestStore::new().await;
    let res = store.send("", TestRequest::get().uri("/payment/verify?orderId=ORD-1")).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location(), format!("{STOREFRONT_URL}/payment-failed?error=Missing%20orderId%20or%20transactionId"));
    store.close().await;
}

#[actix_web::test]
async fn unpaid_orders_stay_pending() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    fill_cart(&store, &token).await;
    let order_id = checkout(&store, &token, "1680.00").await.json()["order_id"].as_str().unwrap().to_string();
    let request = store.provider.last_request().unwrap();
    store.provider.set_status(&request.transaction_id, ProviderStatus::failed("PAYMENT_DECLINED"));

    let res = store.send("", TestRequest::get().uri(&return_path(&store))).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert!(res.location().starts_with(&format!("{STOREFRONT_URL}/payment-failed?orderId={order_id}&error=")));
    assert!(res.location().contains("PAYMENT_DECLINED"));
    let details = store.send(&token, TestRequest::get().uri(&format!("/api/orders/{order_id}"))).await.json();
    assert_eq!(details["order"]["status"], "pending");
    let cart = store.send(&token, TestRequest::get().uri("/api/cart")).await.json();
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(1));
    store.close().await;
}

#[actix_web::test]
async fn checkout_rejects_a_stale_total() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    fill_cart(&store, &token).await;
    let res = checkout(&store, &token, "1000.00").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(store.provider.requests().is_empty());
    store.close().await;
}

#[actix_web::test]
async fn checkout_needs_a_cart_and_an_own_address() {
    let store = TestStore::new().await;
    let alice = store.user_token(store.alice);
    let res = checkout(&store, &alice, "0").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let bob = store.user_token(store.bob);
    fill_cart(&store, &bob).await;
    let res = checkout(&store, &bob, "1680.00").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    store.close().await;
}
