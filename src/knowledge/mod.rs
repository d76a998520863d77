//! Biography retrieval for a named public figure.

pub mod graph;

pub use graph::{KnowledgeGraphLookup, KnowledgeLookup};
