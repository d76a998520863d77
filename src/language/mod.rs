//! Language-service adapters: person extraction and biography summarization.
//!
//! Both adapters share one [`LanguageClient`] (endpoint, key, document
//! language) behind an `Arc`.

pub mod client;
pub mod entities;
pub mod summary;

pub use client::{LanguageClient, LanguageError};
pub use entities::{EntityExtractor, LanguageEntityExtractor, PERSON_CATEGORY};
pub use summary::{LanguageSummarizer, Summarizer, SUMMARY_FALLBACK};
