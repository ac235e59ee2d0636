//! Signal relay: trading-alert webhooks in, AI advisory and push notifications out.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
