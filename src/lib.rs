//! Alessandro: a spoken question-and-answer assistant about public figures.
//!
//! Say the wake word followed by a request naming a person ("Alessandro,
//! cuéntame sobre Marie Curie") and the assistant answers aloud with a short
//! biography, after moderating the request.

pub mod audio;
pub mod config;
pub mod http;
pub mod knowledge;
pub mod language;
pub mod moderation;
pub mod pipeline;
pub mod stt;
pub mod tts;
