use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;

use crate::{
    checkout_api::{
        errors::CheckoutFlowError,
        order_objects::{CheckoutRequest, InitiatedPayment, VerificationFailure, VerificationOutcome},
        pricing::{decimal_to_money, PricingPolicy},
    },
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType},
    events::{EventProducers, OrderAnnulledEvent, OrderFinalizedEvent},
    helpers::{clean_payment_method, is_valid_mobile_number, new_order_id, new_transaction_id},
    traits::{CheckoutDatabase, ExpiryResult, FinalizeResult, ItemSource, PaymentProvider, PaymentRequest},
};

pub const DEFAULT_ORDER_TTL_HOURS: i64 = 48;

/// Settings that shape the checkout flow.
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    /// The externally reachable base URL of this service. The provider redirects to `{public_url}/payment/verify`.
    pub public_url: String,
    /// How long a pending order waits for payment before the expiry sweep cancels it.
    pub order_ttl: Duration,
    pub item_source: ItemSource,
    pub pricing: PricingPolicy,
}

impl Default for CheckoutOptions {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8360".to_string(),
            order_ttl: Duration::hours(DEFAULT_ORDER_TTL_HOURS),
            item_source: ItemSource::default(),
            pricing: PricingPolicy::default(),
        }
    }
}

/// `CheckoutFlowApi` owns the path from cart to paid order: payment initiation, verification of the provider
/// callback, idempotent finalization, admin status changes and the expiry of abandoned orders.
pub struct CheckoutFlowApi<B, P> {
    db: B,
    provider: P,
    producers: EventProducers,
    options: CheckoutOptions,
}

impl<B, P> Debug for CheckoutFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutFlowApi ({:?})", self.options)
    }
}

impl<B, P> CheckoutFlowApi<B, P> {
    pub fn new(db: B, provider: P, producers: EventProducers, options: CheckoutOptions) -> Self {
        Self { db, provider, producers, options }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn options(&self) -> &CheckoutOptions {
        &self.options
    }
}

impl<B, P> CheckoutFlowApi<B, P>
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    /// Starts a payment for the user's current cart.
    ///
    /// The inputs are validated, and the server's own total must match the amount the customer submitted. A pending
    /// order and its item snapshot are then written in one transaction before the provider is contacted. If the
    /// provider call fails, the pending order stays in place: a retry creates a new order, and the expiry sweep
    /// cancels the abandoned one.
    pub async fn initiate_payment(
        &self,
        user_id: i64,
        request: CheckoutRequest,
    ) -> Result<InitiatedPayment, CheckoutFlowError> {
        let mobile_number = request.mobile_number.trim().to_string();
        if !is_valid_mobile_number(&mobile_number) {
            return Err(CheckoutFlowError::InvalidMobileNumber(mobile_number));
        }
        let submitted = decimal_to_money(request.amount).map_err(|e| CheckoutFlowError::InvalidAmount(e.to_string()))?;
        let address = self
            .db
            .fetch_address(request.address_id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or(CheckoutFlowError::AddressNotFound(request.address_id))?;
        let lines = self.db.fetch_cart(user_id).await?;
        if lines.is_empty() {
            return Err(CheckoutFlowError::EmptyCart);
        }
        let pricing =
            self.options.pricing.price_lines(&lines).map_err(|e| CheckoutFlowError::InvalidAmount(e.to_string()))?;
        if pricing.total != submitted {
            warn!("🔄️ User #{user_id} submitted {submitted} for a cart that costs {}", pricing.total);
            return Err(CheckoutFlowError::AmountMismatch { expected: pricing.total, submitted });
        }
        let order = NewOrder {
            order_id: new_order_id(),
            user_id,
            total_amount: pricing.total,
            address_id: address.id,
            transaction_id: new_transaction_id(),
            mobile_number: mobile_number.clone(),
            expires_at: Utc::now() + self.options.order_ttl,
        };
        let (order, snapshot) = self.db.create_pending_order(order, &lines).await?;
        info!(
            "🔄️ Order {} created for user #{user_id}: {} items, {} ({})",
            order.order_id,
            snapshot.len(),
            order.total_amount,
            order.transaction_id
        );
        let redirect_url = self.verification_url(&order);
        let payment = PaymentRequest {
            transaction_id: order.transaction_id.clone(),
            user_id,
            amount: order.total_amount,
            redirect_url,
            mobile_number,
        };
        let redirect = self.provider.initiate_payment(payment).await.map_err(|e| {
            warn!("🔄️ Payment initiation for order {} failed. The order remains pending. {e}", order.order_id);
            e
        })?;
        Ok(InitiatedPayment { order_id: order.order_id, redirect_url: redirect.redirect_url })
    }

    fn verification_url(&self, order: &Order) -> String {
        format!(
            "{}/payment/verify?orderId={}&transactionId={}",
            self.options.public_url.trim_end_matches('/'),
            order.order_id.as_str(),
            order.transaction_id
        )
    }

    /// Handles the browser redirect (or provider callback) that follows a payment attempt.
    ///
    /// The query parameters are only used to look things up. Whether the payment succeeded is always decided by
    /// asking the provider. This method never fails: every outcome, including internal errors, is reported as a
    /// [`VerificationOutcome`].
    pub async fn verify_payment(&self, order_id: Option<&str>, transaction_id: Option<&str>) -> VerificationOutcome {
        let order_id = order_id.map(str::trim).filter(|s| !s.is_empty()).map(OrderId::from);
        let transaction_id = transaction_id.map(str::trim).filter(|s| !s.is_empty());
        let (oid, txid) = match (order_id, transaction_id) {
            (Some(oid), Some(txid)) => (oid, txid),
            (oid, _) => {
                debug!("🔄️ Verification called without an order id or transaction id");
                return VerificationOutcome::failed(oid, VerificationFailure::MissingParameters);
            },
        };
        let status = match self.provider.check_status(txid).await {
            Ok(status) if status.success => status,
            Ok(status) => {
                info!("🔄️ Provider reports transaction {txid} for order {oid} as {}", status.code);
                return VerificationOutcome::failed(Some(oid), VerificationFailure::ProviderStatusFailure(status.code));
            },
            Err(e) => {
                warn!("🔄️ Could not fetch the status of transaction {txid} for order {oid}. {e}");
                let reason = VerificationFailure::ProviderStatusFailure("STATUS_UNAVAILABLE".to_string());
                return VerificationOutcome::failed(Some(oid), reason);
            },
        };
        let order = match self.db.fetch_order_by_order_id(&oid).await {
            Ok(Some(order)) if order.transaction_id == txid => order,
            Ok(Some(_)) => {
                warn!("🔄️ Transaction {txid} does not belong to order {oid}");
                return VerificationOutcome::failed(None, VerificationFailure::OrderNotFound);
            },
            Ok(None) => return VerificationOutcome::failed(None, VerificationFailure::OrderNotFound),
            Err(e) => {
                error!("🔄️ Could not load order {oid}. {e}");
                return VerificationOutcome::failed(Some(oid), VerificationFailure::Internal(e.to_string()));
            },
        };
        if let Some(paid) = status.amount.filter(|a| *a != order.total_amount) {
            error!("🔄️ Provider reports {paid} paid for order {oid}, but the order total is {}", order.total_amount);
            let reason = VerificationFailure::ProviderStatusFailure("AMOUNT_MISMATCH".to_string());
            return VerificationOutcome::failed(Some(oid), reason);
        }
        match order.status {
            s if s.is_finalized() => {
                debug!("🔄️ Order {oid} is already {s}. Nothing to do.");
                return VerificationOutcome::AlreadyFinalized(oid);
            },
            OrderStatusType::Cancelled => {
                warn!("🔄️ A successful payment was verified for cancelled order {oid}. It needs a manual refund.");
                return VerificationOutcome::failed(Some(oid), VerificationFailure::OrderCancelled);
            },
            _ => {},
        }
        let payment_method = clean_payment_method(status.payment_instrument.as_deref());
        let source = self.options.item_source;
        match self.db.finalize_order(&order, &payment_method, source).await {
            Ok(FinalizeResult::Finalized { order, items }) => {
                info!("🔄️ Order {oid} paid by {payment_method} and finalized with {} items", items.len());
                self.call_order_finalized_hook(order, items).await;
                VerificationOutcome::Finalized(oid)
            },
            Ok(FinalizeResult::NotPending(current)) if current.status.is_finalized() => {
                debug!("🔄️ Order {oid} was finalized by a concurrent verification");
                VerificationOutcome::AlreadyFinalized(oid)
            },
            Ok(FinalizeResult::NotPending(current)) => {
                warn!("🔄️ Order {oid} became {} while its payment was being verified", current.status);
                VerificationOutcome::failed(Some(oid), VerificationFailure::OrderCancelled)
            },
            Ok(FinalizeResult::EmptyCart) => VerificationOutcome::failed(Some(oid), VerificationFailure::EmptyCart),
            Err(e) => {
                error!("🔄️ Could not finalize order {oid}. {e}");
                VerificationOutcome::failed(Some(oid), VerificationFailure::Internal(e.to_string()))
            },
        }
    }

    async fn call_order_finalized_hook(&self, order: Order, items: Vec<OrderItem>) {
        if self.producers.order_finalized_producer.is_empty() {
            return;
        }
        let address = self.db.fetch_address(order.address_id).await.unwrap_or_else(|e| {
            warn!("🔄️ Could not load the address for order {}. {e}", order.order_id);
            None
        });
        let user = self.db.fetch_user(order.user_id).await.unwrap_or_else(|e| {
            warn!("🔄️ Could not load user #{} for order {}. {e}", order.user_id, order.order_id);
            None
        });
        let event = OrderFinalizedEvent::new(order, items).with_address(address).with_user(user);
        self.producers.publish_order_finalized(event).await;
    }

    async fn call_order_annulled_hook(&self, orders: &[Order]) {
        for order in orders {
            self.producers.publish_order_annulled(OrderAnnulledEvent::new(order.clone())).await;
        }
    }

    /// Changes the status of an order. Orders only ever move forward:
    ///
    /// | From \ To  | pending | processing   | shipped | delivered | cancelled |
    /// |------------|---------|--------------|---------|-----------|-----------|
    /// | pending    | no-op   | verification | Err     | Err       | Ok        |
    /// | processing | Err     | no-op        | Ok      | Err       | Ok        |
    /// | shipped    | Err     | Err          | no-op   | Ok        | Ok        |
    /// | delivered  | Err     | Err          | Err     | no-op     | Err       |
    /// | cancelled  | Err     | Err          | Err     | Err       | no-op     |
    ///
    /// `pending → processing` only happens through [`Self::verify_payment`], because it materializes the order items.
    /// The change is applied with a conditional update on the old status. If the order changed in the meantime,
    /// `OrderModificationConflict` is returned.
    ///
    /// Cancelling an order triggers the `OrderAnnulled` hook.
    pub async fn modify_status_for_order(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
    ) -> Result<Order, CheckoutFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| CheckoutFlowError::OrderNotFound(order_id.clone()))?;
        let old_status = order.status;
        check_transition(old_status, new_status)?;
        let updated = self
            .db
            .update_order_status(order_id, old_status, new_status)
            .await?
            .ok_or_else(|| CheckoutFlowError::OrderModificationConflict(order_id.clone()))?;
        info!("🔄️ Order {order_id} moved from {old_status} to {new_status}");
        if new_status == OrderStatusType::Cancelled {
            self.call_order_annulled_hook(std::slice::from_ref(&updated)).await;
        }
        Ok(updated)
    }

    /// Cancels every pending order whose payment window has closed.
    pub async fn expire_old_orders(&self) -> Result<ExpiryResult, CheckoutFlowError> {
        let cancelled = self.db.expire_orders(Utc::now()).await?;
        if !cancelled.is_empty() {
            info!("🔄️ {} pending orders expired", cancelled.len());
        }
        self.call_order_annulled_hook(&cancelled).await;
        Ok(ExpiryResult::new(cancelled))
    }
}

/// Checks a status change against the forward-only transition table.
pub fn check_transition(from: OrderStatusType, to: OrderStatusType) -> Result<(), CheckoutFlowError> {
    use OrderStatusType::*;
    match (from, to) {
        (old, new) if old == new => Err(CheckoutFlowError::OrderModificationNoOp),
        (Pending, Cancelled) |
        (Processing, Shipped) |
        (Processing, Cancelled) |
        (Shipped, Delivered) |
        (Shipped, Cancelled) => Ok(()),
        (from, to) => Err(CheckoutFlowError::OrderModificationForbidden { from, to }),
    }
}
