mod auth;
mod cart;
mod checkout;
mod helpers;
