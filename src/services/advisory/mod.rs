//! AI advisory for incoming trade signals.
//!
//! The prompt asks the model for a short opinion plus a confidence score, but the
//! answer is passed on verbatim. Any failure collapses into [`ANALYSIS_FAILED`],
//! which callers forward like any other advisory text.

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;
pub use prompt::build_prompt;

use crate::error::Result;
use crate::models::TradeSignal;
use async_trait::async_trait;
use tracing::{error, info};

/// Advisory text used whenever the model cannot be reached or answers with garbage.
pub const ANALYSIS_FAILED: &str = "analysis failed";

/// Generative text backend.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Send `prompt` and return the generated text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Ask `model` to rate `signal`. Never fails.
pub async fn analyze_signal(model: &dyn TextModel, signal: &TradeSignal) -> String {
    info!(
        provider = model.name(),
        ticker = %signal.ticker,
        strategy = %signal.strategy,
        "Sending signal for AI analysis"
    );

    let prompt = build_prompt(signal);
    match model.generate(&prompt).await {
        Ok(text) => {
            info!(provider = model.name(), chars = text.len(), "AI analysis received");
            text
        }
        Err(e) => {
            error!(provider = model.name(), error = %e, "AI analysis failed");
            ANALYSIS_FAILED.to_string()
        }
    }
}
