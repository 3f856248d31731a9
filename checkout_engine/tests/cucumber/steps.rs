use std::time::Duration;

use checkout_engine::{
    db_types::{Money, NewAddress, NewProduct, NewUser, OrderStatusType},
    order_objects::{CheckoutRequest, VerificationFailure, VerificationOutcome},
    traits::{ProviderError, ProviderStatus},
    CartManagement,
    ItemSource,
    OrderManagement,
};
use chrono::{Duration as ChronoDuration, Utc};
use cucumber::{given, then, when};
use rust_decimal::Decimal;

use crate::cucumber::{checkout_world::CheckoutSystem, CheckoutWorld};

fn rupees(amount: i64) -> Money {
    Money::from_major(amount)
}

fn as_decimal(amount: Money) -> Decimal {
    Decimal::new(amount.value(), 2)
}

// ----------------------------------------------   Setup  ----------------------------------------------------------

#[given("a fresh checkout database")]
async fn fresh_database(world: &mut CheckoutWorld) {
    world.system = Some(CheckoutSystem::new().await);
}

#[given("orders are built from the live cart")]
async fn live_cart(world: &mut CheckoutWorld) {
    world.system().use_item_source(ItemSource::LiveCart);
}

#[given(expr = "a customer '{word}'")]
async fn customer(world: &mut CheckoutWorld, name: String) {
    let sys = world.system();
    let user = NewUser::new(format!("{name}@example.com"), name.clone());
    let user = sys.store.create_user(user).await.expect("Error creating user");
    sys.users.insert(name, user.id);
}

#[given(expr = "a product '{word}' priced at {int} rupees")]
async fn product(world: &mut CheckoutWorld, name: String, price: i64) {
    let sys = world.system();
    let product = NewProduct::new(name.clone(), rupees(price));
    let product = sys.store.upsert_product(product).await.expect("Error creating product");
    sys.products.insert(name, product.id);
}

#[given(expr = "'{word}' has an address '{word}'")]
async fn address(world: &mut CheckoutWorld, user: String, label: String) {
    let sys = world.system();
    let user_id = sys.user(&user);
    let address = NewAddress {
        user_id,
        full_name: user.clone(),
        line1: format!("{label}, 12 MG Road"),
        line2: None,
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        postal_code: "560001".to_string(),
        country: "India".to_string(),
        phone: "9876543210".to_string(),
    };
    let address = sys.store.add_address(user_id, address).await.expect("Error adding address");
    sys.addresses.insert(label, address.id);
}

// ----------------------------------------------   Cart  -----------------------------------------------------------

#[given(expr = "'{word}' has {int} '{word}' in {string} in the cart")]
async fn cart_contains(world: &mut CheckoutWorld, user: String, quantity: i64, product: String, color: String) {
    add_to_cart(world, user, quantity, product, color).await;
}

#[when(expr = "'{word}' adds {int} '{word}' in {string} to the cart")]
async fn add_to_cart(world: &mut CheckoutWorld, user: String, quantity: i64, product: String, color: String) {
    let sys = world.system();
    let (user_id, product_id) = (sys.user(&user), sys.product(&product));
    sys.cart.add_item(user_id, product_id, quantity, &color).await.expect("Error adding to cart");
}

#[when(expr = "'{word}' adds {int} '{word}' in {string} to the cart from another session")]
async fn add_from_other_session(
    world: &mut CheckoutWorld,
    user: String,
    quantity: i64,
    product: String,
    color: String,
) {
    let sys = world.system();
    let (user_id, product_id) = (sys.user(&user), sys.product(&product));
    sys.other_session.add_item(user_id, product_id, quantity, &color).await.expect("Error adding to cart");
}

#[when(expr = "'{word}' changes the quantity of '{word}' in {string} to {int}")]
async fn change_quantity(world: &mut CheckoutWorld, user: String, product: String, color: String, quantity: i64) {
    let sys = world.system();
    let user_id = sys.user(&user);
    let cart = sys.cart.cart(user_id).await.expect("Error fetching cart");
    let line = cart
        .lines
        .iter()
        .find(|l| l.product_name == product && l.color == color)
        .unwrap_or_else(|| panic!("No {product} in {color} in the cart"));
    sys.cart.update_quantity(user_id, line.cart_item_id, quantity).await.expect("Error changing quantity");
}

#[when(expr = "'{word}' tries to add {int} '{word}' in {string} to the cart")]
async fn try_add_to_cart(world: &mut CheckoutWorld, user: String, quantity: i64, product: String, color: String) {
    let sys = world.system();
    let (user_id, product_id) = (sys.user(&user), sys.product(&product));
    sys.last_error = sys.cart.add_item(user_id, product_id, quantity, &color).await.err().map(|e| e.to_string());
}

#[then(expr = "the cart change fails with {string}")]
async fn cart_change_fails(world: &mut CheckoutWorld, message: String) {
    let sys = world.system();
    let err = sys.last_error.as_ref().expect("The cart change succeeded");
    assert!(err.contains(&message), "Expected '{message}' in '{err}'");
}

#[when(expr = "'{word}' empties the cart")]
async fn empty_cart(world: &mut CheckoutWorld, user: String) {
    let sys = world.system();
    let user_id = sys.user(&user);
    sys.db.clear_cart(user_id).await.expect("Error clearing cart");
}

#[when(expr = "the price of '{word}' changes to {int} rupees")]
async fn change_price(world: &mut CheckoutWorld, name: String, price: i64) {
    let sys = world.system();
    let product = NewProduct::new(name.clone(), rupees(price)).with_id(sys.product(&name));
    sys.store.upsert_product(product).await.expect("Error updating product");
}

#[then(expr = "the cart of '{word}' has {int} line(s)")]
async fn cart_lines(world: &mut CheckoutWorld, user: String, count: usize) {
    let sys = world.system();
    let cart = sys.cart.cart(sys.user(&user)).await.expect("Error fetching cart");
    assert_eq!(cart.lines.len(), count, "Cart lines: {:?}", cart.lines);
}

#[then(expr = "the cart of '{word}' has {int} '{word}' in {string}")]
async fn cart_quantity(world: &mut CheckoutWorld, user: String, quantity: i64, product: String, color: String) {
    let sys = world.system();
    let cart = sys.cart.cart(sys.user(&user)).await.expect("Error fetching cart");
    let held = cart.lines.iter().find(|l| l.product_name == product && l.color == color).map(|l| l.quantity);
    assert_eq!(held, Some(quantity), "Cart lines: {:?}", cart.lines);
}

#[then(expr = "another session sees {int} line(s) in the cart of '{word}'")]
async fn other_session_lines(world: &mut CheckoutWorld, count: usize, user: String) {
    let sys = world.system();
    let cart = sys.other_session.cart(sys.user(&user)).await.expect("Error fetching cart");
    assert_eq!(cart.lines.len(), count, "Cart lines: {:?}", cart.lines);
}

#[then(expr = "the cart of '{word}' totals {int} rupees")]
async fn cart_total(world: &mut CheckoutWorld, user: String, total: i64) {
    let sys = world.system();
    let cart = sys.cart.cart(sys.user(&user)).await.expect("Error fetching cart");
    assert_eq!(cart.pricing.total, rupees(total), "Pricing: {:?}", cart.pricing);
}

// ----------------------------------------------   Checkout  -------------------------------------------------------

async fn checkout(sys: &mut CheckoutSystem, user: &str, address: &str, amount: Option<Decimal>, mobile: &str) {
    let user_id = sys.user(user);
    let address_id = sys.address(address);
    let amount = match amount {
        Some(a) => a,
        None => as_decimal(sys.cart.cart(user_id).await.expect("Error fetching cart").pricing.total),
    };
    let request = CheckoutRequest { amount, address_id, mobile_number: mobile.to_string() };
    match sys.flow.initiate_payment(user_id, request).await {
        Ok(payment) => {
            assert!(payment.redirect_url.starts_with("https://pay.example.test/"));
            sys.last_order = Some(payment.order_id);
            sys.last_error = None;
        },
        Err(e) => sys.last_error = Some(e.to_string()),
    }
}

#[when(expr = "'{word}' checks out to '{word}'")]
async fn checkout_cart_total(world: &mut CheckoutWorld, user: String, address: String) {
    checkout(world.system(), &user, &address, None, "9876543210").await;
}

#[when(expr = "'{word}' checks out to '{word}' paying {word} rupees")]
async fn checkout_with_amount(world: &mut CheckoutWorld, user: String, address: String, amount: String) {
    let amount = amount.parse::<Decimal>().expect("Not a decimal amount");
    checkout(world.system(), &user, &address, Some(amount), "9876543210").await;
}

#[when(expr = "'{word}' checks out to '{word}' with mobile number {string}")]
async fn checkout_with_mobile(world: &mut CheckoutWorld, user: String, address: String, mobile: String) {
    checkout(world.system(), &user, &address, None, &mobile).await;
}

#[when("the payment page cannot be opened")]
async fn initiation_fails(world: &mut CheckoutWorld) {
    world.system().provider.fail_initiation(Some(ProviderError::Rejected("KEY_NOT_CONFIGURED".into())));
}

#[then(expr = "the checkout fails with {string}")]
async fn checkout_fails(world: &mut CheckoutWorld, message: String) {
    let sys = world.system();
    let err = sys.last_error.as_ref().expect("Checkout did not fail");
    assert!(err.contains(&message), "Expected '{message}' in '{err}'");
}

#[then("the checkout succeeds")]
async fn checkout_succeeds(world: &mut CheckoutWorld) {
    let sys = world.system();
    assert!(sys.last_error.is_none(), "Checkout failed: {:?}", sys.last_error);
    assert!(sys.last_order.is_some());
}

#[then(expr = "the provider was asked to collect {int} rupees")]
async fn provider_amount(world: &mut CheckoutWorld, amount: i64) {
    let request = world.system().provider.last_request().expect("No payment was initiated");
    assert_eq!(request.amount, rupees(amount));
    assert!(request.redirect_url.contains("/payment/verify?orderId=ORD-"), "{}", request.redirect_url);
}

#[then(expr = "'{word}' has {int} order(s)")]
async fn order_count(world: &mut CheckoutWorld, user: String, count: usize) {
    let sys = world.system();
    let orders = sys.orders.orders_for_user(sys.user(&user)).await.expect("Error fetching orders");
    assert_eq!(orders.len(), count);
}

// ----------------------------------------------   Provider  -------------------------------------------------------

async fn last_transaction(sys: &CheckoutSystem) -> (String, Money) {
    let oid = sys.last_order();
    let order = sys.db.fetch_order_by_order_id(&oid).await.expect("Error fetching order").expect("Order not found");
    (order.transaction_id, order.total_amount)
}

#[when("the provider confirms the payment")]
async fn provider_confirms(world: &mut CheckoutWorld) {
    let sys = world.system();
    let (txid, amount) = last_transaction(sys).await;
    sys.provider.set_status(&txid, ProviderStatus::paid(amount, Some("UPI_INTENT")));
}

#[when(expr = "the provider confirms a payment of {int} rupees")]
async fn provider_confirms_amount(world: &mut CheckoutWorld, amount: i64) {
    let sys = world.system();
    let (txid, _) = last_transaction(sys).await;
    sys.provider.set_status(&txid, ProviderStatus::paid(rupees(amount), Some("CARD")));
}

#[when(expr = "the provider reports the payment as {word}")]
async fn provider_declines(world: &mut CheckoutWorld, code: String) {
    let sys = world.system();
    let (txid, _) = last_transaction(sys).await;
    sys.provider.set_status(&txid, ProviderStatus::failed(code));
}

#[when("the provider cannot be reached")]
async fn provider_unreachable(world: &mut CheckoutWorld) {
    let sys = world.system();
    let (txid, _) = last_transaction(sys).await;
    sys.provider.set_status_error(&txid, ProviderError::Transport("connection refused".into()));
}

// ----------------------------------------------   Verification  ---------------------------------------------------

#[when("the payment is verified")]
async fn verify(world: &mut CheckoutWorld) {
    let sys = world.system();
    let oid = sys.last_order();
    let (txid, _) = last_transaction(sys).await;
    let outcome = sys.flow.verify_payment(Some(oid.as_str()), Some(&txid)).await;
    sys.last_outcome = Some(outcome);
}

#[when(expr = "the payment is verified {int} times")]
async fn verify_many(world: &mut CheckoutWorld, count: usize) {
    for _ in 0..count {
        verify(world).await;
    }
}

#[when("a verification arrives without a transaction id")]
async fn verify_without_txid(world: &mut CheckoutWorld) {
    let sys = world.system();
    let oid = sys.last_order();
    sys.last_outcome = Some(sys.flow.verify_payment(Some(oid.as_str()), None).await);
}

#[when(expr = "a verification arrives for order {string} with the last transaction id")]
async fn verify_other_order(world: &mut CheckoutWorld, order_id: String) {
    let sys = world.system();
    let (txid, _) = last_transaction(sys).await;
    sys.last_outcome = Some(sys.flow.verify_payment(Some(&order_id), Some(&txid)).await);
}

#[then("the order is finalized")]
async fn outcome_finalized(world: &mut CheckoutWorld) {
    let sys = world.system();
    let oid = sys.last_order();
    assert_eq!(sys.last_outcome, Some(VerificationOutcome::Finalized(oid)));
}

#[then("the order was already finalized")]
async fn outcome_already_finalized(world: &mut CheckoutWorld) {
    let sys = world.system();
    let oid = sys.last_order();
    assert_eq!(sys.last_outcome, Some(VerificationOutcome::AlreadyFinalized(oid)));
}

#[then(expr = "the verification fails with {word}")]
async fn outcome_failed(world: &mut CheckoutWorld, reason: String) {
    let sys = world.system();
    let outcome = sys.last_outcome.clone().expect("No verification has happened");
    let VerificationOutcome::Failed { reason: actual, .. } = outcome else {
        panic!("Verification did not fail: {outcome:?}");
    };
    let matches = match (reason.as_str(), &actual) {
        ("MissingParameters", VerificationFailure::MissingParameters) => true,
        ("OrderNotFound", VerificationFailure::OrderNotFound) => true,
        ("OrderCancelled", VerificationFailure::OrderCancelled) => true,
        ("EmptyCart", VerificationFailure::EmptyCart) => true,
        (code, VerificationFailure::ProviderStatusFailure(c)) => code == c,
        _ => false,
    };
    assert!(matches, "Expected {reason}, got {actual:?}");
}

// ----------------------------------------------   Orders  ---------------------------------------------------------

#[then(expr = "the order status is {word}")]
async fn order_status(world: &mut CheckoutWorld, status: String) {
    let sys = world.system();
    let status = status.parse::<OrderStatusType>().expect("Not a valid status");
    let details = sys.orders.order_details(&sys.last_order(), None).await.expect("Error fetching order");
    assert_eq!(details.order.status, status);
}

#[then(expr = "the order was paid by {word}")]
async fn order_payment_method(world: &mut CheckoutWorld, method: String) {
    let sys = world.system();
    let details = sys.orders.order_details(&sys.last_order(), None).await.expect("Error fetching order");
    assert_eq!(details.order.payment_method.as_deref(), Some(method.as_str()));
}

#[then(expr = "the order has {int} item(s)")]
async fn order_item_count(world: &mut CheckoutWorld, count: usize) {
    let sys = world.system();
    let details = sys.orders.order_details(&sys.last_order(), None).await.expect("Error fetching order");
    assert_eq!(details.items.len(), count, "Items: {:?}", details.items);
}

#[then(expr = "the order contains {int} '{word}' in {string} at {int} rupees each")]
async fn order_contains(world: &mut CheckoutWorld, quantity: i64, product: String, color: String, price: i64) {
    let sys = world.system();
    let product_id = sys.product(&product);
    let details = sys.orders.order_details(&sys.last_order(), None).await.expect("Error fetching order");
    let item = details
        .items
        .iter()
        .find(|i| i.product_id == product_id && i.color == color)
        .unwrap_or_else(|| panic!("No {product} in {color} in {:?}", details.items));
    assert_eq!(item.quantity, quantity);
    assert_eq!(item.price, rupees(price));
}

#[then(expr = "'{word}' cannot see the order")]
async fn order_hidden(world: &mut CheckoutWorld, user: String) {
    let sys = world.system();
    let result = sys.orders.order_details(&sys.last_order(), Some(sys.user(&user))).await;
    assert!(result.is_err(), "Order should not be visible to {user}");
}

#[when(expr = "an admin moves the order to {word}")]
async fn admin_moves(world: &mut CheckoutWorld, status: String) {
    let sys = world.system();
    let status = status.parse::<OrderStatusType>().expect("Not a valid status");
    match sys.flow.modify_status_for_order(&sys.last_order(), status).await {
        Ok(_) => sys.last_error = None,
        Err(e) => sys.last_error = Some(e.to_string()),
    }
}

#[then(expr = "the status change fails with {string}")]
async fn status_change_fails(world: &mut CheckoutWorld, message: String) {
    let sys = world.system();
    let err = sys.last_error.as_ref().expect("Status change did not fail");
    assert!(err.contains(&message), "Expected '{message}' in '{err}'");
}

// ----------------------------------------------   Expiry  ---------------------------------------------------------

#[when("the payment window closes")]
async fn window_closes(world: &mut CheckoutWorld) {
    let sys = world.system();
    let oid = sys.last_order();
    let expired = Utc::now() - ChronoDuration::minutes(1);
    sqlx::query("UPDATE orders SET expires_at = $1 WHERE order_id = $2")
        .bind(expired)
        .bind(oid.as_str())
        .execute(sys.db.pool())
        .await
        .expect("Error moving expiry date");
}

#[when("the expiry sweep runs")]
async fn expiry_sweep(world: &mut CheckoutWorld) {
    let sys = world.system();
    sys.flow.expire_old_orders().await.expect("Error expiring orders");
}

#[then(expr = "the expiry sweep cancels {int} order(s)")]
async fn expiry_sweep_count(world: &mut CheckoutWorld, count: usize) {
    let sys = world.system();
    let result = sys.flow.expire_old_orders().await.expect("Error expiring orders");
    assert_eq!(result.count(), count);
}

// ----------------------------------------------   Events  ---------------------------------------------------------

async fn wait_for_events<F: Fn(&CheckoutSystem) -> bool>(sys: &CheckoutSystem, check: F) -> bool {
    for _ in 0..50 {
        if check(sys) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[then(expr = "{int} order finalized event(s) was/were published")]
async fn finalized_events(world: &mut CheckoutWorld, count: usize) {
    let sys = world.system();
    let reached = wait_for_events(sys, |s| s.events.lock().unwrap().finalized.len() >= count).await;
    // Give stray duplicates a chance to show up
    tokio::time::sleep(Duration::from_millis(50)).await;
    let seen = sys.events.lock().unwrap().finalized.len();
    assert!(reached || count == 0, "Only {seen} finalized events were published");
    assert_eq!(seen, count);
}

#[then(expr = "{int} order annulled event(s) was/were published")]
async fn annulled_events(world: &mut CheckoutWorld, count: usize) {
    let sys = world.system();
    let reached = wait_for_events(sys, |s| s.events.lock().unwrap().annulled.len() >= count).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let log = sys.events.lock().unwrap();
    assert!(reached || count == 0, "Only {} annulled events were published", log.annulled.len());
    assert_eq!(log.annulled.len(), count);
    assert!(log.annulled.iter().all(|(_, s)| *s == OrderStatusType::Cancelled));
}
