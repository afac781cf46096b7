//! Dialogue engine for the encounter engine.
//!
//! A [`Conversation`] walks one speaker's linear script at a time. Choosing
//! an option may roll an ability check; the outcome picks the speaker's
//! canned response and moves the speaker's relationship score. Content is
//! injected through the [`DialogueContent`] trait so scripts stay data.

/// Option evaluation and ability checks.
pub mod check;
/// Dialogue configuration.
pub mod config;
/// Content providers.
pub mod content;
/// Error types for the dialogue engine.
pub mod error;
/// Nodes and options.
pub mod node;
/// Conversation sessions.
pub mod session;
/// Conversation transcripts.
pub mod transcript;

pub use check::{CheckRoll, OptionOutcome, ResponseCategory, evaluate_option};
pub use config::{DialogueConfig, RelationshipRules};
pub use content::{DialogueContent, ScriptedContent, SpeakerScript};
pub use error::{DialogueError, DialogueResult};
pub use node::{DEFAULT_DIFFICULTY, DialogueNode, DialogueOption, OptionKind};
pub use session::{Conversation, DialogueUpdate};
pub use transcript::{Transcript, TranscriptLine};
