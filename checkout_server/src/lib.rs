//! # Storefront checkout server
//! This crate hosts the HTTP front end for the storefront checkout. It is responsible for:
//! * Managing the signed-in shopper's cart and saved addresses.
//! * Turning a cart into a pending order and handing the browser off to the payment gateway's hosted page.
//! * Receiving the gateway's redirect/callback, verifying the payment and finalizing the order exactly once.
//! * Order tracking for shoppers, plus product and order administration.
//!
//! Background work (expiring unpaid orders, confirmation emails) runs alongside the server.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payment/verify` (GET and POST): The gateway return URL. Always answers with a redirect to the storefront.
//! * `/api/...`: The session-authenticated JSON API. See [routes](routes/index.html).
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
