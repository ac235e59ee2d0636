//! Clients for the external collaborators.

pub mod advisory;
pub mod directory;
pub mod push;

pub use advisory::{analyze_signal, GeminiClient, TextModel, ANALYSIS_FAILED};
pub use directory::{AccessGrantor, DirectoryClient};
pub use push::{FcmClient, Notifier, PushMessage};
