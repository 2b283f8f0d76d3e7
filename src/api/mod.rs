//! API Module
//!
//! HTTP handlers and routing.
//!
//! # Endpoints
//! - `GET /` - Greeting
//! - `GET /btc-exchange-rate/` - Exchange rates (read-through cached)
//! - `GET /users/:id` - User profile (cached by id)
//! - `PUT /users/:id/bio` - Update bio (write-through)
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
