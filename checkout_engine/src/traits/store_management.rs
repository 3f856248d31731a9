use crate::{
    db_types::{Address, NewAddress, NewProduct, NewUser, Product, User},
    traits::CheckoutDbError,
};

/// The catalogue, user and address records that carts and orders refer to.
#[allow(async_fn_in_trait)]
pub trait StoreManagement {
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, CheckoutDbError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, CheckoutDbError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CheckoutDbError>;

    async fn fetch_products(&self) -> Result<Vec<Product>, CheckoutDbError>;

    /// Inserts a new product, or updates the name and price of the product with the given id.
    /// Returns `ProductNotFound` if an id is given that does not exist.
    async fn upsert_product(&self, product: NewProduct) -> Result<Product, CheckoutDbError>;

    async fn fetch_address(&self, address_id: i64) -> Result<Option<Address>, CheckoutDbError>;

    async fn fetch_addresses_for_user(&self, user_id: i64) -> Result<Vec<Address>, CheckoutDbError>;

    async fn insert_address(&self, address: NewAddress) -> Result<Address, CheckoutDbError>;
}
