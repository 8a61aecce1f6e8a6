//! # ePay bridge server
//! This crate hosts the HTTP front end of the ePay billing bridge. It is responsible for:
//! * Verifying the checksum of every inbound ePay request against the tenant's shared secret.
//! * Picking the billing back-end (TelcoNG or UCRM) that serves the subscriber.
//! * Relaying bill checks, payment-order creation and confirmation to that back-end, and answering ePay in its own
//!   JSON dialect.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/v1/pay/init?TYPE=CHECK`: What does the subscriber owe?
//! * `/v1/pay/init?TYPE=BILLING`: Create a payment order.
//! * `/v1/pay/confirm?TYPE=BILLING`: Confirm a payment order once ePay has collected the money.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod logging;
pub mod middleware;
pub mod payment_flow;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
