//! Reasoning-service implementations of the `Extractor` trait.

mod openai;

pub use openai::OpenAIExtractor;
