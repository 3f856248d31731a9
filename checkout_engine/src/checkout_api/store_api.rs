//! Catalogue, user and address records.
use std::fmt::Debug;

use log::*;

use crate::{
    checkout_api::errors::StoreApiError,
    db_types::{Address, NewAddress, NewProduct, NewUser, Product, User},
    helpers::is_valid_mobile_number,
    traits::StoreManagement,
};

pub struct StoreApi<B> {
    db: B,
}

impl<B: Debug> Debug for StoreApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreApi ({:?})", self.db)
    }
}

impl<B> StoreApi<B>
where B: StoreManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn products(&self) -> Result<Vec<Product>, StoreApiError> {
        Ok(self.db.fetch_products().await?)
    }

    /// Creates a product, or changes the name and price of an existing one. Price changes do not affect orders that
    /// have already been placed.
    pub async fn upsert_product(&self, product: NewProduct) -> Result<Product, StoreApiError> {
        if product.name.trim().is_empty() {
            return Err(StoreApiError::InvalidProduct("The product name is empty".to_string()));
        }
        if product.price.is_negative() {
            return Err(StoreApiError::InvalidProduct(format!("The price cannot be negative ({})", product.price)));
        }
        let product = self.db.upsert_product(product).await?;
        info!("🏷️ Product #{} '{}' is now priced at {}", product.id, product.name, product.price);
        Ok(product)
    }

    pub async fn user(&self, user_id: i64) -> Result<User, StoreApiError> {
        self.db.fetch_user(user_id).await?.ok_or(StoreApiError::UserNotFound(user_id))
    }

    /// Creates a user, or returns the existing user with the same e-mail address.
    pub async fn create_user(&self, user: NewUser) -> Result<User, StoreApiError> {
        if !user.email.contains('@') {
            return Err(StoreApiError::InvalidAddress(format!("'{}' is not an e-mail address", user.email)));
        }
        Ok(self.db.insert_user(user).await?)
    }

    pub async fn addresses_for_user(&self, user_id: i64) -> Result<Vec<Address>, StoreApiError> {
        Ok(self.db.fetch_addresses_for_user(user_id).await?)
    }

    /// Adds a shipping address for the user. The `user_id` in `address` is ignored.
    pub async fn add_address(&self, user_id: i64, mut address: NewAddress) -> Result<Address, StoreApiError> {
        address.user_id = user_id;
        let required = [
            ("full_name", &address.full_name),
            ("line1", &address.line1),
            ("city", &address.city),
            ("state", &address.state),
            ("postal_code", &address.postal_code),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(StoreApiError::InvalidAddress(format!("{field} is required")));
        }
        if !is_valid_mobile_number(address.phone.trim()) {
            return Err(StoreApiError::InvalidAddress("phone must be exactly 10 digits".to_string()));
        }
        let address = self.db.insert_address(address).await.map_err(|e| match e {
            crate::traits::CheckoutDbError::UserNotFound(id) => StoreApiError::UserNotFound(id),
            e => StoreApiError::DatabaseError(e),
        })?;
        debug!("🏷️ Address #{} added for user #{user_id}", address.id);
        Ok(address)
    }
}
