use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;

use super::helpers::TestStore;

#[actix_web::test]
async fn add_to_cart_and_view_prices() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    let req = TestRequest::post().uri("/api/cart").set_json(json!({"product_id": store.stool, "color": "Walnut"}));
    let res = store.send(&token, req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["quantity"], 1);

    let res = store.send(&token, TestRequest::get().uri("/api/cart")).await;
    assert_eq!(res.status, StatusCode::OK);
    let cart = res.json();
    assert_eq!(cart["lines"][0]["product_name"], "Stool");
    assert_eq!(cart["lines"][0]["color"], "Walnut");
    assert_eq!(cart["pricing"]["subtotal"], 100_000);
    assert_eq!(cart["pricing"]["tax"], 18_000);
    assert_eq!(cart["pricing"]["shipping"], 50_000);
    assert_eq!(cart["pricing"]["total"], 168_000);
    store.close().await;
}

#[actix_web::test]
async fn same_product_and_color_is_merged() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    for _ in 0..2 {
        let req = TestRequest::post().uri("/api/cart").set_json(json!({"product_id": store.stool, "quantity": 1}));
        store.send(&token, req).await;
    }
    let cart = store.send(&token, TestRequest::get().uri("/api/cart")).await.json();
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["lines"][0]["quantity"], 2);
    assert_eq!(cart["pricing"]["total"], 286_000);
    store.close().await;
}

#[actix_web::test]
async fn invalid_cart_changes_are_rejected() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    let req = TestRequest::post().uri("/api/cart").set_json(json!({"product_id": 9999}));
    assert_eq!(store.send(&token, req).await.status, StatusCode::NOT_FOUND);
    let req = TestRequest::post().uri("/api/cart").set_json(json!({"product_id": store.stool, "quantity": 0}));
    assert_eq!(store.send(&token, req).await.status, StatusCode::BAD_REQUEST);
    store.close().await;
}

#[actix_web::test]
async fn oversized_quantities_are_rejected() {
    let store = TestStore::new().await;
    let token = store.user_token(store.alice);
    let req = TestRequest::post()
        .uri("/api/cart")
        .set_json(json!({"product_id": store.stool, "quantity": 1_000_000_000_000_000_i64}));
    let res = store.send(&token, req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().contains("between 1 and 1000"));

    let req = TestRequest::post().uri("/api/cart").set_json(json!({"product_id": store.stool, "quantity": 1000}));
    let item_id = store.send(&token, req).await.json()["id"].as_i64().unwrap();
    let req = TestRequest::post().uri("/api/cart").set_json(json!({"product_id": store.stool, "quantity": 1}));
    assert_eq!(store.send(&token, req).await.status, StatusCode::BAD_REQUEST);
    let req = TestRequest::patch().uri(&format!("/api/cart/{item_id}")).set_json(json!({"quantity": 1001}));
    assert_eq!(store.send(&token, req).await.status, StatusCode::BAD_REQUEST);

    let cart = store.send(&token, TestRequest::get().uri("/api/cart")).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.json()["lines"][0]["quantity"], 1000);
    store.close().await;
}

#[actix_web::test]
async fn carts_are_private() {
    let store = TestStore::new().await;
    let alice = store.user_token(store.alice);
    let bob = store.user_token(store.bob);
    let req = TestRequest::post().uri("/api/cart").set_json(json!({"product_id": store.stool}));
    let item_id = store.send(&alice, req).await.json()["id"].as_i64().unwrap();

    let req = TestRequest::patch().uri(&format!("/api/cart/{item_id}")).set_json(json!({"quantity": 5}));
    assert_eq!(store.send(&bob, req).await.status, StatusCode::NOT_FOUND);
    let bobs_cart = store.send(&bob, TestRequest::get().uri("/api/cart")).await.json();
    assert_eq!(bobs_cart["lines"].as_array().map(Vec::len), Some(0));

    let req = TestRequest::patch().uri(&format!("/api/cart/{item_id}")).set_json(json!({"quantity": 3}));
    assert_eq!(store.send(&alice, req).await.json()["quantity"], 3);
    let res = store.send(&alice, TestRequest::delete().uri(&format!("/api/cart/{item_id}"))).await;
    assert_eq!(res.status, StatusCode::OK);
    let cart = store.send(&alice, TestRequest::get().uri("/api/cart")).await.json();
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));
    store.close().await;
}

#[actix_web::test]
async fn addresses_are_validated() {
    let store = TestStore::new().await;
    let token = store.user_token(store.bob);
    let address = json!({
        "full_name": "Bob Buyer",
        "line1": "4 Park Street",
        "city": "Kolkata",
        "state": "West Bengal",
        "postal_code": "700016",
        "phone": "12345"
    });
    let req = TestRequest::post().uri("/api/addresses").set_json(&address);
    assert_eq!(store.send(&token, req).await.status, StatusCode::BAD_REQUEST);

    let mut address = address;
    address["phone"] = json!("9123456780");
    let req = TestRequest::post().uri("/api/addresses").set_json(&address);
    let res = store.send(&token, req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["user_id"], store.bob);
    let list = store.send(&token, TestRequest::get().uri("/api/addresses")).await.json();
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    store.close().await;
}
