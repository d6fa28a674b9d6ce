//! The order submission pipeline.
//!
//! [`OrderSubmitter`] drives one order from request to confirmation:
//! intent, fee quote, permit, batch, dispatch, receipt. Each stage consumes
//! the previous stage's output, so the order is fixed.

pub mod bundler;
pub mod error;
pub mod intent;
pub mod receipt;
pub mod submitter;

#[cfg(test)]
mod test_utils;

pub use error::SubmissionError;
pub use intent::{OrderIntentBuilder, OrderRequest};
pub use receipt::ReceiptParser;
pub use submitter::{OrderSubmitter, QuotePreview, SubmissionOutcome};
