//! Dialogue nodes and the options offered at each one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Difficulty used when a check option does not name one.
pub const DEFAULT_DIFFICULTY: i32 = 15;

/// How an option is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Plain conversation; no roll.
    #[default]
    Normal,
    /// An ability check.
    Skill,
    /// A flirtatious reply; always warms the speaker.
    Romance,
    /// A threat backed by an ability check.
    Intimidation,
    /// An appeal backed by an ability check.
    Persuasion,
}

impl OptionKind {
    /// Returns true if choosing this option rolls a check.
    pub fn is_check(self) -> bool {
        matches!(self, Self::Skill | Self::Intimidation | Self::Persuasion)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Skill => write!(f, "skill"),
            Self::Romance => write!(f, "romance"),
            Self::Intimidation => write!(f, "intimidation"),
            Self::Persuasion => write!(f, "persuasion"),
        }
    }
}

/// A reply the player can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueOption {
    /// Text shown to the player.
    pub text: String,
    /// How the option resolves.
    #[serde(default)]
    pub kind: OptionKind,
    /// Governing ability key for checks, e.g. `"wisdom"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,
    /// Difficulty the check must meet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i32>,
}

impl DialogueOption {
    fn plain(text: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            text: text.into(),
            kind,
            ability: None,
            difficulty: None,
        }
    }

    fn check(
        text: impl Into<String>,
        kind: OptionKind,
        ability: impl Into<String>,
        difficulty: i32,
    ) -> Self {
        Self {
            text: text.into(),
            kind,
            ability: Some(ability.into()),
            difficulty: Some(difficulty),
        }
    }

    /// A plain reply.
    pub fn normal(text: impl Into<String>) -> Self {
        Self::plain(text, OptionKind::Normal)
    }

    /// A romance reply.
    pub fn romance(text: impl Into<String>) -> Self {
        Self::plain(text, OptionKind::Romance)
    }

    /// An ability check.
    pub fn skill(text: impl Into<String>, ability: impl Into<String>, difficulty: i32) -> Self {
        Self::check(text, OptionKind::Skill, ability, difficulty)
    }

    /// An intimidation check.
    pub fn intimidation(
        text: impl Into<String>,
        ability: impl Into<String>,
        difficulty: i32,
    ) -> Self {
        Self::check(text, OptionKind::Intimidation, ability, difficulty)
    }

    /// A persuasion check.
    pub fn persuasion(
        text: impl Into<String>,
        ability: impl Into<String>,
        difficulty: i32,
    ) -> Self {
        Self::check(text, OptionKind::Persuasion, ability, difficulty)
    }

    /// The difficulty to beat, or [`DEFAULT_DIFFICULTY`].
    pub fn effective_difficulty(&self) -> i32 {
        self.difficulty.unwrap_or(DEFAULT_DIFFICULTY)
    }
}

/// One line of a speaker's script with the replies offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Display name of the speaker.
    pub speaker: String,
    /// What the speaker says.
    pub text: String,
    /// Replies, in display order.
    pub options: Vec<DialogueOption>,
}

impl DialogueNode {
    /// Create a node with no options.
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// Add an option.
    pub fn with_option(mut self, option: DialogueOption) -> Self {
        self.options.push(option);
        self
    }
}
