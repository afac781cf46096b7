//! Conversation sessions.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use ere_core::{Combatant, CombatantId, Relationship, Roster};
use ere_mechanics::{DiceRoller, Scheduler, SessionId};

use crate::check::{OptionOutcome, evaluate_option};
use crate::config::DialogueConfig;
use crate::content::DialogueContent;
use crate::error::{DialogueError, DialogueResult};
use crate::node::DialogueNode;
use crate::transcript::{Transcript, TranscriptLine};

/// What a host needs to render the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueUpdate {
    /// Current speaker id.
    pub speaker: String,
    /// Index of the current node.
    pub node_index: usize,
    /// The current node, if the speaker has one at this index.
    pub node: Option<DialogueNode>,
    /// Rendered transcript.
    pub transcript: Vec<String>,
    /// Current party snapshot.
    pub party: Roster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogueTask {
    Advance { from: usize },
}

/// A conversation between the player character and one speaker at a time.
#[derive(Debug)]
pub struct Conversation<R = StdRng> {
    session: SessionId,
    config: DialogueConfig,
    content: Arc<dyn DialogueContent>,
    speaker: String,
    node_index: usize,
    transcript: Transcript,
    party: Roster,
    character: Combatant,
    scheduler: Scheduler<DialogueTask>,
    roller: R,
}

impl Conversation<StdRng> {
    /// Start a conversation, seeding checks from the config or the OS.
    pub fn start(
        speaker: impl Into<String>,
        character: Combatant,
        party: Roster,
        content: Arc<dyn DialogueContent>,
        config: DialogueConfig,
    ) -> (Self, DialogueUpdate) {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::start_with_roller(speaker, character, party, content, config, rng)
    }
}

impl<R: DiceRoller> Conversation<R> {
    /// Start a conversation with an explicit dice roller.
    pub fn start_with_roller(
        speaker: impl Into<String>,
        character: Combatant,
        party: Roster,
        content: Arc<dyn DialogueContent>,
        config: DialogueConfig,
        roller: R,
    ) -> (Self, DialogueUpdate) {
        let session = SessionId::new();
        let speaker = speaker.into();
        tracing::info!(%session, speaker = %speaker, "dialogue started");
        let conversation = Self {
            session,
            config,
            content,
            speaker,
            node_index: 0,
            transcript: Transcript::new(),
            party,
            character,
            scheduler: Scheduler::new(session),
            roller,
        };
        let update = conversation.update();
        (conversation, update)
    }

    /// Choose an option at the current node.
    ///
    /// Rejected choices leave the conversation untouched.
    pub fn choose_option(&mut self, index: usize) -> DialogueResult<DialogueUpdate> {
        let content = Arc::clone(&self.content);
        let nodes = content.nodes(&self.speaker);
        let Some(node) = nodes.get(self.node_index) else {
            tracing::debug!(speaker = %self.speaker, "no dialogue for speaker");
            return Err(DialogueError::NoDialogue(self.speaker.clone()));
        };
        let Some(option) = node.options.get(index) else {
            tracing::debug!(speaker = %self.speaker, index, "option out of range");
            return Err(DialogueError::InvalidChoice(index));
        };

        let outcome = evaluate_option(option, &self.character, &mut self.roller, &self.config.rules);
        self.apply_relationship(&outcome)?;

        self.transcript.push(TranscriptLine::Player {
            text: option.text.clone(),
        });
        if let Some(check) = outcome.check.clone() {
            self.transcript.push(TranscriptLine::Roll { check });
        }
        let name = content
            .speaker_name(&self.speaker)
            .unwrap_or(&node.speaker)
            .to_string();
        self.transcript.push(TranscriptLine::Speaker {
            name,
            text: content
                .resolve_response(&self.speaker, outcome.category)
                .to_string(),
        });
        tracing::debug!(
            session = %self.session,
            speaker = %self.speaker,
            category = %outcome.category,
            delta = outcome.relationship_delta,
            "option resolved"
        );

        if self.node_index + 1 < nodes.len() && !self.scheduler.has_pending() {
            self.scheduler.schedule(
                self.config.advance_delay(),
                DialogueTask::Advance {
                    from: self.node_index,
                },
            );
        }
        Ok(self.update())
    }

    /// Move the clock forward, advancing to the next node when due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<DialogueUpdate> {
        let until = self.scheduler.now() + elapsed;
        let mut updates = Vec::new();
        while let Some(DialogueTask::Advance { from }) = self.scheduler.next_ready(until) {
            if from != self.node_index {
                continue;
            }
            self.node_index += 1;
            tracing::debug!(session = %self.session, speaker = %self.speaker, node = self.node_index, "dialogue advanced");
            updates.push(self.update());
        }
        self.scheduler.settle(until);
        updates
    }

    /// Talk to someone else. Progress and transcript start over.
    pub fn switch_speaker(&mut self, speaker: impl Into<String>) -> DialogueUpdate {
        self.scheduler.invalidate();
        self.speaker = speaker.into();
        self.node_index = 0;
        self.transcript.clear();
        tracing::debug!(session = %self.session, speaker = %self.speaker, "speaker switched");
        self.update()
    }

    /// End the conversation and hand the party back.
    pub fn end(mut self) -> Roster {
        self.scheduler.invalidate();
        tracing::info!(session = %self.session, "dialogue ended");
        self.party
    }

    /// Current state as an update.
    pub fn update(&self) -> DialogueUpdate {
        DialogueUpdate {
            speaker: self.speaker.clone(),
            node_index: self.node_index,
            node: self.current_node().cloned(),
            transcript: self.transcript.render(),
            party: self.party.clone(),
        }
    }

    /// Session identifier.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Current speaker id.
    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    /// Index of the current node.
    pub fn node_index(&self) -> usize {
        self.node_index
    }

    /// The current node.
    pub fn current_node(&self) -> Option<&DialogueNode> {
        self.content.nodes(&self.speaker).get(self.node_index)
    }

    /// The transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current party snapshot.
    pub fn party(&self) -> &Roster {
        &self.party
    }

    /// The player character making the checks.
    pub fn character(&self) -> &Combatant {
        &self.character
    }

    /// The current speaker's relationship, if they are a companion.
    pub fn relationship(&self) -> Option<Relationship> {
        self.party
            .get(&CombatantId::new(self.speaker.as_str()))
            .and_then(|c| c.relationship)
    }

    /// Returns true if a move to the next node is scheduled.
    pub fn is_advance_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Time until the pending advance, if any.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }

    fn apply_relationship(&mut self, outcome: &OptionOutcome) -> DialogueResult<()> {
        if outcome.relationship_delta == 0 {
            return Ok(());
        }
        let id = CombatantId::new(self.speaker.as_str());
        let is_companion = self.party.get(&id).is_some_and(|c| !c.is_player);
        if !is_companion {
            return Ok(());
        }
        let delta = outcome.relationship_delta;
        self.party = self.party.update(&id, |c| {
            let score = c.relationship.get_or_insert_with(Relationship::new).adjust(delta);
            tracing::debug!(speaker = %c.id, delta, score, "relationship changed");
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ScriptedContent, SpeakerScript};
    use crate::node::DialogueOption;
    use ere_mechanics::FixedRolls;
    use ere_mechanics::preset;

    fn content() -> Arc<dyn DialogueContent> {
        Arc::new(ScriptedContent::companions())
    }

    fn start(speaker: &str, party: Roster, rolls: Vec<u32>) -> Conversation<FixedRolls> {
        let character = preset::player("Tav", preset::default_player_scores());
        let (conv, update) = Conversation::start_with_roller(
            speaker,
            character,
            party,
            content(),
            DialogueConfig::default(),
            FixedRolls::new(rolls),
        );
        assert_eq!(update.node_index, 0);
        conv
    }

    fn with_relationship(id: &str, score: i32) -> Roster {
        preset::starting_party("Tav")
            .update(&id.into(), |c| c.relationship = Some(Relationship::with_score(score)))
            .unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn successful_insight_check_on_astarion() {
        let mut conv = start("astarion", preset::starting_party("Tav"), vec![16]);
        let update = conv.choose_option(1).unwrap();

        assert_eq!(conv.relationship().map(|r| r.score()), Some(10));
        assert_eq!(
            update.transcript,
            vec![
                "You: [Insight] You're hiding something.",
                "Wisdom check: 16 + 0 = 16 vs DC 15 (Success)",
                "Astarion: Oh, darling, you do know how to flatter a man.",
            ]
        );
        assert_eq!(update.node_index, 0);
        assert!(conv.is_advance_pending());

        assert!(conv.advance(ms(999)).is_empty());
        let updates = conv.advance(ms(1));
        assert_eq!(updates.len(), 1);
        assert_eq!(conv.node_index(), 1);
        assert!(conv.current_node().unwrap().text.starts_with("Those wretched"));
    }

    #[test]
    fn relationship_caps_at_hundred() {
        let mut conv = start("astarion", with_relationship("astarion", 95), vec![1]);
        conv.choose_option(2).unwrap();
        assert_eq!(conv.relationship().map(|r| r.score()), Some(100));
    }

    #[test]
    fn failed_intimidation_floors_at_minus_hundred() {
        let mut conv = start("astarion", with_relationship("astarion", -90), vec![1]);
        conv.choose_option(3).unwrap();
        assert_eq!(conv.relationship().map(|r| r.score()), Some(-100));
        assert_eq!(
            conv.transcript().last().unwrap().to_string(),
            "Astarion: Cute. Try that again and see where it gets you."
        );
    }

    #[test]
    fn failed_check_leaves_relationship() {
        let mut conv = start("astarion", preset::starting_party("Tav"), vec![5]);
        conv.choose_option(1).unwrap();
        assert_eq!(conv.relationship().map(|r| r.score()), Some(0));
        assert_eq!(conv.transcript().len(), 3);
    }

    #[test]
    fn out_of_range_option_is_rejected() {
        let mut conv = start("gale", preset::starting_party("Tav"), vec![10]);
        let party = conv.party().clone();
        assert_eq!(conv.choose_option(9), Err(DialogueError::InvalidChoice(9)));
        assert!(conv.transcript().is_empty());
        assert!(conv.party().same_snapshot(&party));
        assert!(!conv.is_advance_pending());
    }

    #[test]
    fn speaker_without_script_has_no_dialogue() {
        let mut conv = start("minsc", preset::starting_party("Tav"), vec![10]);
        assert!(conv.current_node().is_none());
        assert_eq!(
            conv.choose_option(0),
            Err(DialogueError::NoDialogue("minsc".into()))
        );
    }

    #[test]
    fn switching_speaker_resets_progress() {
        let mut conv = start("astarion", preset::starting_party("Tav"), vec![16]);
        conv.choose_option(0).unwrap();
        conv.advance(ms(1000));
        conv.choose_option(0).unwrap();
        assert_eq!(conv.node_index(), 1);
        assert!(!conv.transcript().is_empty());

        let update = conv.switch_speaker("gale");
        assert_eq!(update.node_index, 0);
        assert!(update.transcript.is_empty());
        assert_eq!(update.node.unwrap().speaker, "Gale");
    }

    #[test]
    fn switching_speaker_cancels_pending_advance() {
        let mut conv = start("astarion", preset::starting_party("Tav"), vec![10]);
        conv.choose_option(0).unwrap();
        assert!(conv.is_advance_pending());
        conv.switch_speaker("astarion");
        assert!(conv.advance(ms(5000)).is_empty());
        assert_eq!(conv.node_index(), 0);
    }

    #[test]
    fn last_node_idles_and_stays_answerable() {
        let mut conv = start("gale", preset::starting_party("Tav"), vec![10]);
        conv.choose_option(2).unwrap();
        assert!(!conv.is_advance_pending());
        conv.choose_option(2).unwrap();
        assert_eq!(conv.node_index(), 0);
        assert_eq!(conv.relationship().map(|r| r.score()), Some(20));
        assert!(conv.advance(ms(5000)).is_empty());
    }

    #[test]
    fn repeated_choice_schedules_one_advance() {
        let mut conv = start("astarion", preset::starting_party("Tav"), vec![10]);
        conv.choose_option(0).unwrap();
        conv.choose_option(0).unwrap();
        let updates = conv.advance(ms(5000));
        assert_eq!(updates.len(), 1);
        assert_eq!(conv.node_index(), 1);
    }

    #[test]
    fn non_party_speaker_keeps_roster() {
        let script = SpeakerScript::new("Volo", "A famous author").with_node(
            DialogueNode::new("Volo", "Have you read my guide?")
                .with_option(DialogueOption::romance("I'm a big fan.")),
        );
        let content: Arc<dyn DialogueContent> =
            Arc::new(ScriptedContent::new().with_speaker("volo", script));
        let party = preset::starting_party("Tav");
        let (mut conv, _) = Conversation::start_with_roller(
            "volo",
            preset::player("Tav", preset::default_player_scores()),
            party.clone(),
            content,
            DialogueConfig::default(),
            FixedRolls::new(vec![10]),
        );
        let update = conv.choose_option(0).unwrap();
        assert!(update.party.same_snapshot(&party));
        assert_eq!(
            update.transcript.last().map(String::as_str),
            Some("Volo: They seem pleased.")
        );
        assert!(conv.end().same_snapshot(&party));
    }

    #[test]
    fn player_speaker_is_never_adjusted() {
        let script = SpeakerScript::new("Tav", "The one in the mirror").with_node(
            DialogueNode::new("Tav", "You look tired.")
                .with_option(DialogueOption::romance("Still handsome, though.")),
        );
        let content: Arc<dyn DialogueContent> =
            Arc::new(ScriptedContent::new().with_speaker("tav", script));
        let party = preset::starting_party("Tav");
        let (mut conv, _) = Conversation::start_with_roller(
            "tav",
            preset::player("Tav", preset::default_player_scores()),
            party.clone(),
            content,
            DialogueConfig::default(),
            FixedRolls::new(vec![10]),
        );
        let update = conv.choose_option(0).unwrap();
        assert_eq!(update.transcript.len(), 2);
        assert!(update.party.same_snapshot(&party));
        assert!(conv.relationship().is_none());
        assert!(
            conv.party()
                .get(&CombatantId::new("tav"))
                .unwrap()
                .relationship
                .is_none()
        );
    }
}
