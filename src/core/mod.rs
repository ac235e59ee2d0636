//! Webhook server

pub mod http;

pub use http::*;
