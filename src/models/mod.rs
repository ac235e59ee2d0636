//! Request and directory data models.

pub mod directory;
pub mod payment;
pub mod signal;

pub use directory::DirectoryUser;
pub use payment::PaymentNotice;
pub use signal::{TradeSignal, NOT_AVAILABLE};
