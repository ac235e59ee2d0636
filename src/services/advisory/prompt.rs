//! Prompt construction for signal analysis

use crate::models::TradeSignal;

/// Build the analysis prompt. The model must answer in exactly two labeled parts:
/// `Analysis` (at most three sentences) and `Confidence` (0 to 10).
pub fn build_prompt(signal: &TradeSignal) -> String {
    format!(
        "Trade Opportunity Analysis:\n\
         - Identified Strategy: {strategy}\n\
         - Asset: {ticker}\n\
         - Signal Price: {price}\n\
         - Timeframe: {timeframe}\n\
         \n\
         You are an experienced market analyst. Based on this information and your knowledge of \
         the current market context for this asset, assess the quality of this entry. Consider \
         the strength of the move, nearby support/resistance zones and overall sentiment.\n\
         \n\
         Answer in TWO MANDATORY PARTS and nothing else:\n\
         1. **Analysis:** A short paragraph (maximum of 3 sentences) with your technical opinion.\n\
         2. **Confidence:** A score from 0 to 10 for your confidence in this trade.\n",
        strategy = signal.strategy,
        ticker = signal.ticker,
        price = signal.price,
        timeframe = signal.timeframe,
    )
}
