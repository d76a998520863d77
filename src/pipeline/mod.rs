//! Turn pipeline for the Alessandro voice assistant.
//!
//! One turn turns one spoken request into one spoken reply: either a short
//! biography of the public figure asked about, or a fixed apology explaining
//! why the request could not be answered.
//!
//! # Architecture
//!
//! ```text
//! Transcriber ─▶ wake-word gate ─▶ Moderator ─▶ EntityExtractor
//!                                                   │
//!             Synthesizer ◀─ Summarizer ◀─ KnowledgeLookup
//! ```
//!
//! Every stage may end the turn early; the synthesizer then speaks the
//! matching [`Apology`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use alessandro::config::AppConfig;
//! use alessandro::pipeline::TurnPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = AppConfig::load()?;
//!     config.apply_env();
//!     config.validate()?;
//!
//!     let pipeline = TurnPipeline::from_config(&config);
//!     if let Some(outcome) = pipeline.run_turn().await? {
//!         println!("{}: {}", outcome.stage.label(), outcome.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod responses;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use responses::Apology;
pub use runner::{strip_wake_word, PipelineError, TurnPipeline};
pub use state::{TurnOutcome, TurnStage};
