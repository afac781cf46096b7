//! Dialogue content providers.
//!
//! Content is immutable configuration injected into a conversation: an
//! ordered node list per speaker, canned responses keyed by outcome, and a
//! fallback response for every outcome so a lookup can never come up empty.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::check::ResponseCategory;
use crate::error::{DialogueError, DialogueResult};
use crate::node::{DialogueNode, DialogueOption};

/// Source of scripted nodes and responses.
pub trait DialogueContent: fmt::Debug + Send + Sync {
    /// The speaker's nodes, in order. Empty if the speaker has no script.
    fn nodes(&self, speaker: &str) -> &[DialogueNode];

    /// Display name of a speaker.
    fn speaker_name(&self, speaker: &str) -> Option<&str>;

    /// The speaker's own response for an outcome, if it has one.
    fn response(&self, speaker: &str, category: ResponseCategory) -> Option<&str>;

    /// Generic response used when the speaker has none of its own.
    fn fallback_response(&self, category: ResponseCategory) -> &str;

    /// The speaker's response, or the fallback.
    fn resolve_response(&self, speaker: &str, category: ResponseCategory) -> &str {
        self.response(speaker, category)
            .unwrap_or_else(|| self.fallback_response(category))
    }
}

/// Everything scripted for one speaker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerScript {
    /// Display name.
    pub name: String,
    /// Short description shown when picking someone to talk to.
    #[serde(default)]
    pub description: String,
    /// Nodes in order.
    #[serde(default)]
    pub nodes: Vec<DialogueNode>,
    /// Canned responses by outcome.
    #[serde(default)]
    pub responses: BTreeMap<ResponseCategory, String>,
}

impl SpeakerScript {
    /// Create a script with a name and description and no nodes.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            nodes: Vec::new(),
            responses: BTreeMap::new(),
        }
    }

    /// Append a node.
    pub fn with_node(mut self, node: DialogueNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Set the response for an outcome.
    pub fn with_response(mut self, category: ResponseCategory, text: impl Into<String>) -> Self {
        self.responses.insert(category, text.into());
        self
    }
}

/// Dialogue content held in memory, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedContent {
    speakers: BTreeMap<String, SpeakerScript>,
    fallback: BTreeMap<ResponseCategory, String>,
}

impl Default for ScriptedContent {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedContent {
    /// Empty content with generic fallback responses.
    pub fn new() -> Self {
        let fallback = [
            (ResponseCategory::Positive, "They seem pleased."),
            (ResponseCategory::IntimidationSuccess, "They back down, wary."),
            (ResponseCategory::IntimidationFailure, "They are not impressed."),
            (ResponseCategory::SkillFailure, "They give nothing away."),
            (ResponseCategory::Neutral, "They nod."),
        ]
        .into_iter()
        .map(|(c, t)| (c, t.to_string()))
        .collect();
        Self {
            speakers: BTreeMap::new(),
            fallback,
        }
    }

    /// Parse content from JSON and check that every outcome has a fallback.
    pub fn from_json(json: &str) -> DialogueResult<Self> {
        let content: Self =
            serde_json::from_str(json).map_err(|e| DialogueError::InvalidContent(e.to_string()))?;
        content.validate()?;
        Ok(content)
    }

    /// Serialize the content to pretty JSON.
    pub fn to_json(&self) -> DialogueResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DialogueError::InvalidContent(e.to_string()))
    }

    /// Check that every outcome has a fallback response.
    pub fn validate(&self) -> DialogueResult<()> {
        match ResponseCategory::ALL
            .into_iter()
            .find(|c| !self.fallback.contains_key(c))
        {
            Some(missing) => Err(DialogueError::MissingFallback(missing)),
            None => Ok(()),
        }
    }

    /// Add or replace a speaker.
    pub fn with_speaker(mut self, id: impl Into<String>, script: SpeakerScript) -> Self {
        self.speakers.insert(id.into(), script);
        self
    }

    /// Replace a fallback response.
    pub fn with_fallback(mut self, category: ResponseCategory, text: impl Into<String>) -> Self {
        self.fallback.insert(category, text.into());
        self
    }

    /// Speaker ids, sorted.
    pub fn speaker_ids(&self) -> impl Iterator<Item = &str> {
        self.speakers.keys().map(String::as_str)
    }

    /// The full script for a speaker.
    pub fn speaker(&self, id: &str) -> Option<&SpeakerScript> {
        self.speakers.get(id)
    }

    /// The built-in companion script.
    pub fn companions() -> Self {
        use ResponseCategory::*;

        let astarion = SpeakerScript::new("Astarion", "A pale elf with a mysterious past")
            .with_node(
                DialogueNode::new(
                    "Astarion",
                    "Well, it seems we both survived the crash. How... fortunate.",
                )
                .with_option(DialogueOption::normal("You were on the ship too?"))
                .with_option(DialogueOption::skill(
                    "[Insight] You're hiding something.",
                    "wisdom",
                    15,
                ))
                .with_option(DialogueOption::romance("Good to see a familiar face."))
                .with_option(DialogueOption::intimidation(
                    "[Intimidation] Stay out of my way.",
                    "strength",
                    14,
                )),
            )
            .with_node(
                DialogueNode::new(
                    "Astarion",
                    "Those wretched mind flayers took me too. Now we have a bigger problem: the worms in our heads.",
                )
                .with_option(DialogueOption::normal("We have to find a cure."))
                .with_option(DialogueOption::skill(
                    "[Medicine] Maybe I can help.",
                    "wisdom",
                    12,
                ))
                .with_option(DialogueOption::persuasion(
                    "[Persuasion] We stand a better chance together.",
                    "charisma",
                    13,
                ))
                .with_option(DialogueOption::romance("We'll get through this together.")),
            )
            .with_response(Positive, "Oh, darling, you do know how to flatter a man.")
            .with_response(IntimidationSuccess, "Easy now. No need for threats, I'm on your side.")
            .with_response(IntimidationFailure, "Cute. Try that again and see where it gets you.")
            .with_response(SkillFailure, "Hiding something? Me? You wound me.")
            .with_response(Neutral, "Hmm. Let's keep moving.");

        let gale = SpeakerScript::new("Gale", "A wizard of Waterdeep")
            .with_node(
                DialogueNode::new(
                    "Gale",
                    "Greetings! Gale of Waterdeep, at your service. I see the mind flayers got to you as well.",
                )
                .with_option(DialogueOption::normal("Tell me about yourself."))
                .with_option(DialogueOption::skill(
                    "[Arcana] I sense powerful magic in you.",
                    "intelligence",
                    13,
                ))
                .with_option(DialogueOption::romance("Your erudition is impressive.")),
            )
            .with_response(Positive, "How perceptive! We should talk more, you and I.")
            .with_response(IntimidationSuccess, "Point taken. No need to raise your voice.")
            .with_response(IntimidationFailure, "I have faced archmages. You will have to do better.")
            .with_response(SkillFailure, "Magic? Nothing out of the ordinary, I assure you.")
            .with_response(Neutral, "A fine question, and a long story.");

        Self::new()
            .with_speaker("astarion", astarion)
            .with_speaker("gale", gale)
            .with_speaker("shadowheart", SpeakerScript::new("Shadowheart", "A cleric of Shar"))
            .with_speaker("laezel", SpeakerScript::new("Lae'zel", "A githyanki warrior"))
            .with_speaker("wyll", SpeakerScript::new("Wyll", "The Blade of Frontiers"))
            .with_speaker("karlach", SpeakerScript::new("Karlach", "A tiefling barbarian"))
            .with_speaker("minsc", SpeakerScript::new("Minsc", "A ranger with a hamster"))
    }
}

impl DialogueContent for ScriptedContent {
    fn nodes(&self, speaker: &str) -> &[DialogueNode] {
        self.speakers
            .get(speaker)
            .map(|s| s.nodes.as_slice())
            .unwrap_or_default()
    }

    fn speaker_name(&self, speaker: &str) -> Option<&str> {
        self.speakers.get(speaker).map(|s| s.name.as_str())
    }

    fn response(&self, speaker: &str, category: ResponseCategory) -> Option<&str> {
        self.speakers
            .get(speaker)?
            .responses
            .get(&category)
            .map(String::as_str)
    }

    fn fallback_response(&self, category: ResponseCategory) -> &str {
        self.fallback
            .get(&category)
            .map(String::as_str)
            .unwrap_or("...")
    }
}
