//! `Wanderplan` - vacation city recommendations from a language model
//!
//! This library turns trip preferences into a recommendation prompt, sends it
//! to a recommendation endpoint, decodes the answer into typed cities and
//! travel times, and renders the result into a view. It also contains the
//! proxy server that fronts the language model.

pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod render;
pub mod server;

// Re-export core types for public API
pub use config::WanderplanConfig;
pub use dispatch::{Outcome, RecommendationClient, RequestTracker};
pub use envelope::decode_envelope;
pub use error::WanderplanError;
pub use llm::{GeminiClient, LanguageModel};
pub use models::{Budget, City, Preferences, RecommendationResult, TravelTime};
pub use prompt::build_prompt;
pub use render::{HtmlDocument, Page, RecommendationView, TerminalReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WanderplanError>;
