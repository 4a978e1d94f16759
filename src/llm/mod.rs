pub mod completion;
pub mod extractor;
pub mod prompts;
pub mod response;

#[cfg(feature = "providers")]
pub mod client;
#[cfg(feature = "providers")]
pub mod router;

pub use completion::TextCompletion;
pub use extractor::LlmExtractor;
pub use response::{normalize, parse_response, validate_schema};

#[cfg(feature = "providers")]
pub use client::{GeminiClient, OpenAiClient};
#[cfg(feature = "providers")]
pub use router::{ProviderRouter, ProviderSettings};
