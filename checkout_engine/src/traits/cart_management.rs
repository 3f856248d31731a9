use crate::{
    db_types::{CartItem, CartLine, NewCartItem},
    traits::CheckoutDbError,
};

/// Manages the rows in a user's cart. Every method that touches an existing row takes the `user_id` as well, and
/// only matches rows that belong to that user.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// The user's cart, joined with each product's current name and price, in the order items were added.
    async fn fetch_cart(&self, user_id: i64) -> Result<Vec<CartLine>, CheckoutDbError>;

    /// Adds an item to the cart. If the user already has the same product and colour in their cart, the quantity of
    /// the existing row is increased instead.
    async fn add_cart_item(&self, item: NewCartItem) -> Result<CartItem, CheckoutDbError>;

    async fn update_cart_item_quantity(
        &self,
        user_id: i64,
        cart_item_id: i64,
        quantity: i64,
    ) -> Result<Option<CartItem>, CheckoutDbError>;

    /// Returns `true` if a row was removed.
    async fn remove_cart_item(&self, user_id: i64, cart_item_id: i64) -> Result<bool, CheckoutDbError>;

    /// Removes every row from the user's cart, returning the number of rows removed.
    async fn clear_cart(&self, user_id: i64) -> Result<u64, CheckoutDbError>;
}
