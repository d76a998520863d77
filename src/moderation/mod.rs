//! Content moderation of the user's request.

pub mod content_safety;
pub mod verdict;

pub use content_safety::{ContentSafetyModerator, ModerationError, Moderator};
pub use verdict::ModerationVerdict;
