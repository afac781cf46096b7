//! The running record of a conversation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::check::CheckRoll;

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptLine {
    /// What the player chose to say.
    Player {
        /// The option text.
        text: String,
    },
    /// The check behind the choice.
    Roll {
        /// Check details.
        check: CheckRoll,
    },
    /// The speaker's reply.
    Speaker {
        /// Speaker display name.
        name: String,
        /// The reply.
        text: String,
    },
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player { text } => write!(f, "You: {text}"),
            Self::Roll { check } => write!(f, "{check}"),
            Self::Speaker { name, text } => write!(f, "{name}: {text}"),
        }
    }
}

/// Append-only transcript, cleared when the speaker changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn push(&mut self, line: TranscriptLine) {
        self.lines.push(line);
    }

    /// All lines.
    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// The most recent line.
    pub fn last(&self) -> Option<&TranscriptLine> {
        self.lines.last()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines rendered as text.
    pub fn render(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_lines() {
        let mut t = Transcript::new();
        t.push(TranscriptLine::Player {
            text: "Hello.".into(),
        });
        t.push(TranscriptLine::Speaker {
            name: "Gale".into(),
            text: "Greetings!".into(),
        });
        assert_eq!(t.render(), vec!["You: Hello.", "Gale: Greetings!"]);
        t.clear();
        assert!(t.is_empty());
    }
}
