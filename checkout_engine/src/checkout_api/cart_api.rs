use std::fmt::Debug;

use log::*;

use crate::{
    checkout_api::{errors::CartApiError, order_objects::CartSummary, pricing::PricingPolicy},
    db_types::{CartItem, NewCartItem},
    traits::{CartManagement, StoreManagement},
};

/// The most units of one product and colour a cart line may hold.
pub const MAX_LINE_QUANTITY: i64 = 1_000;

/// `CartApi` manages a user's cart. A user can only ever see or change their own rows.
pub struct CartApi<B> {
    db: B,
    pricing: PricingPolicy,
}

impl<B: Debug> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi ({:?})", self.db)
    }
}

impl<B> CartApi<B>
where B: CartManagement + StoreManagement
{
    pub fn new(db: B, pricing: PricingPolicy) -> Self {
        Self { db, pricing }
    }

    /// The cart lines at current prices, with the price breakdown the customer will be asked to pay.
    pub async fn cart(&self, user_id: i64) -> Result<CartSummary, CartApiError> {
        let lines = self.db.fetch_cart(user_id).await?;
        let pricing = self.pricing.price_lines(&lines)?;
        Ok(CartSummary { lines, pricing })
    }

    /// Adds `quantity` of a product in the given colour. Adding a product and colour that is already in the cart
    /// increases the quantity of that line, which may not grow beyond [`MAX_LINE_QUANTITY`].
    pub async fn add_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
        color: &str,
    ) -> Result<CartItem, CartApiError> {
        check_quantity(quantity)?;
        if self.db.fetch_product(product_id).await?.is_none() {
            return Err(CartApiError::ProductNotFound(product_id));
        }
        let color = color.trim();
        let held = self
            .db
            .fetch_cart(user_id)
            .await?
            .into_iter()
            .find(|l| l.product_id == product_id && l.color == color)
            .map_or(0, |l| l.quantity);
        check_quantity(held.saturating_add(quantity))?;
        let item = NewCartItem::new(user_id, product_id, quantity).with_color(color);
        let row = self.db.add_cart_item(item).await?;
        debug!("🛒️ User #{user_id} has {} of product #{product_id} ({color})", row.quantity);
        Ok(row)
    }

    pub async fn update_quantity(
        &self,
        user_id: i64,
        cart_item_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartApiError> {
        check_quantity(quantity)?;
        self.db
            .update_cart_item_quantity(user_id, cart_item_id, quantity)
            .await?
            .ok_or(CartApiError::CartItemNotFound(cart_item_id))
    }

    pub async fn remove_item(&self, user_id: i64, cart_item_id: i64) -> Result<(), CartApiError> {
        if self.db.remove_cart_item(user_id, cart_item_id).await? {
            debug!("🛒️ Cart item #{cart_item_id} removed for user #{user_id}");
            Ok(())
        } else {
            Err(CartApiError::CartItemNotFound(cart_item_id))
        }
    }
}

fn check_quantity(quantity: i64) -> Result<(), CartApiError> {
    if (1..=MAX_LINE_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(CartApiError::InvalidQuantity(quantity))
    }
}
