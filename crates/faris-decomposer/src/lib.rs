//! FARIS Claim Decomposer
//!
//! Splits an LLM answer into an ordered sequence of atomic, independently
//! checkable claims.
//!
//! # Architecture
//!
//! ```text
//! Answer → Decomposer → Reasoning backend → Claims (c1..cn)
//!                 └──── sentence split (fallback)
//! ```
//!
//! # Guarantees
//!
//! - Claims appear in the order their text appears in the answer
//! - No two claims share the same text (case and whitespace insensitive)
//! - Every claim is non-empty; at most `max_claims` are kept
//! - A backend that is disabled, fails, times out or answers with unusable
//!   output never fails the decomposition; the answer is split into
//!   sentences instead
//!
//! # Example Usage
//!
//! ```no_run
//! use faris_decomposer::{Decomposer, DecomposerConfig};
//! use faris_domain::{AnalysisRequest, Domain};
//! use faris_llm::{MockProvider, Reasoner};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reasoner = Reasoner::new(Arc::new(MockProvider::default()), Duration::from_secs(30));
//! let decomposer = Decomposer::new(reasoner, DecomposerConfig::default());
//!
//! let request = AnalysisRequest::new(
//!     "What are the side effects of aspirin?",
//!     "Aspirin has no side effects and is completely safe for everyone.",
//!     Domain::Medical,
//! );
//! let decomposition = decomposer.decompose(&request).await?;
//! for claim in &decomposition.claims {
//!     println!("{}: {}", claim.id, claim.text);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod decomposer;
mod error;
mod normalize;
mod parser;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use config::DecomposerConfig;
pub use decomposer::Decomposer;
pub use error::DecomposerError;
pub use normalize::split_sentences;
pub use prompt::TASK_HEADER;
pub use types::{Decomposition, DecompositionSource};
