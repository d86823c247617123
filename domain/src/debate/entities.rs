//! Debate entities and the lifecycle state machine.
//!
//! [`DebateState`] is the single authority for a debate's lifecycle. All
//! transitions are pure methods that either mutate the state or return a
//! [`DomainError::InvalidTransition`]; the run loop never touches fields
//! directly. Two structural invariants hold throughout:
//!
//! - while `Debating`, `rounds.len() == current_round` (the current round
//!   exists and is the last element)
//! - a persona appears at most once per round, in speaking order

use crate::core::error::DomainError;
use crate::persona::PersonaConfig;
use crate::reasoning::ReasoningStep;
use serde::{Deserialize, Serialize};

/// Unique identifier for a debate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebateId(String);

impl DebateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(pseudo_uuid())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for DebateId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for DebateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moderator's call at the end of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Continue,
    Conclude,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Continue => "continue",
            Verdict::Conclude => "conclude",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The moderator's end-of-round decision with its stated reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDecision {
    pub verdict: Verdict,
    pub reasoning: String,
    /// True when the round ceiling overrode whatever the model said.
    pub forced: bool,
}

impl RoundDecision {
    pub fn new(verdict: Verdict, reasoning: impl Into<String>) -> Self {
        Self {
            verdict,
            reasoning: reasoning.into(),
            forced: false,
        }
    }

    pub fn forced(verdict: Verdict, reasoning: impl Into<String>) -> Self {
        Self {
            verdict,
            reasoning: reasoning.into(),
            forced: true,
        }
    }
}

/// One persona's contribution to one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateArgument {
    pub id: String,
    pub persona_id: String,
    /// 1-based round number this argument belongs to
    pub round: u32,
    /// Argument text with self-assessment markers already stripped
    pub content: String,
    /// Self-assessed strength, 1-5, when the persona emitted one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// Self-assessed confidence, 0.0-1.0, when emitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Tools the persona actually invoked while reasoning
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
    /// RFC 3339 creation time
    pub timestamp: String,
}

impl DebateArgument {
    pub fn new(persona_id: impl Into<String>, round: u32, content: impl Into<String>) -> Self {
        Self {
            id: pseudo_uuid(),
            persona_id: persona_id.into(),
            round,
            content: content.into(),
            score: None,
            confidence: None,
            tools_used: Vec::new(),
            timestamp: timestamp_now(),
        }
    }

    pub fn with_assessment(mut self, score: Option<u8>, confidence: Option<f32>) -> Self {
        self.score = score;
        self.confidence = confidence;
        self
    }

    pub fn with_tools_used(mut self, tools_used: Vec<String>) -> Self {
        self.tools_used = tools_used;
        self
    }
}

/// One completed (or in-progress) round of the debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRound {
    /// 1-based round number
    pub number: u32,
    /// Arguments in speaking order
    pub arguments: Vec<DebateArgument>,
    /// The moderator's reasoning trace for this round's evaluation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moderator_steps: Vec<ReasoningStep>,
    /// Set once the moderator has evaluated the round
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<RoundDecision>,
}

impl DebateRound {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            arguments: Vec::new(),
            moderator_steps: Vec::new(),
            decision: None,
        }
    }
}

/// Final synthesized outcome of a concluded debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSummary {
    /// Consensus level 0-100
    pub consensus: u8,
    pub key_agreements: Vec<String>,
    pub key_disagreements: Vec<String>,
    pub recommendation: String,
    pub reasoning: String,
}

/// Lifecycle states of a debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateStatus {
    Idle,
    Debating,
    Paused,
    Concluding,
    Complete,
    Error,
}

impl DebateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebateStatus::Idle => "idle",
            DebateStatus::Debating => "debating",
            DebateStatus::Paused => "paused",
            DebateStatus::Concluding => "concluding",
            DebateStatus::Complete => "complete",
            DebateStatus::Error => "error",
        }
    }

    /// Complete and Error accept no further transitions except `fail`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DebateStatus::Complete | DebateStatus::Error)
    }
}

impl std::fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full state of one debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateState {
    pub id: DebateId,
    pub status: DebateStatus,
    /// The question or proposition under debate
    pub task: String,
    /// Optional grounding document the personas may search and excerpt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// The panel, in speaking order; immutable after creation
    pub personas: Vec<PersonaConfig>,
    pub rounds: Vec<DebateRound>,
    /// 1-based; 0 until the debate starts
    pub current_round: u32,
    /// Persona currently producing an argument, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DebateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
}

impl DebateState {
    pub fn new(
        task: impl Into<String>,
        document: Option<String>,
        personas: Vec<PersonaConfig>,
    ) -> Result<Self, DomainError> {
        let task = task.into();
        if task.trim().is_empty() {
            return Err(DomainError::InvalidTask("task must not be empty".into()));
        }
        if personas.is_empty() {
            return Err(DomainError::NoPersonas);
        }
        Ok(Self {
            id: DebateId::generate(),
            status: DebateStatus::Idle,
            task,
            document,
            personas,
            rounds: Vec::new(),
            current_round: 0,
            speaking: None,
            summary: None,
            error: None,
            created_at: timestamp_now(),
        })
    }

    /// Idle -> Debating, opening round 1.
    pub fn start(&mut self) -> Result<(), DomainError> {
        if self.status != DebateStatus::Idle {
            return Err(self.transition_error(DebateStatus::Debating));
        }
        self.status = DebateStatus::Debating;
        self.current_round = 1;
        self.rounds.push(DebateRound::new(1));
        Ok(())
    }

    /// Append an argument to the current round.
    ///
    /// The persona must belong to the panel and must not have argued in
    /// this round yet.
    pub fn record_argument(&mut self, argument: DebateArgument) -> Result<(), DomainError> {
        if self.status != DebateStatus::Debating {
            return Err(self.transition_error(DebateStatus::Debating));
        }
        if !self.personas.iter().any(|p| p.id == argument.persona_id) {
            return Err(DomainError::UnknownPersona(argument.persona_id));
        }
        let round = self
            .rounds
            .last_mut()
            .ok_or(DomainError::InvalidTask("no open round".into()))?;
        if round.arguments.iter().any(|a| a.persona_id == argument.persona_id) {
            return Err(DomainError::DuplicateArgument {
                persona: argument.persona_id,
                round: round.number,
            });
        }
        round.arguments.push(argument);
        Ok(())
    }

    /// Record the moderator's evaluation of the current round.
    pub fn complete_round(
        &mut self,
        decision: RoundDecision,
        moderator_steps: Vec<ReasoningStep>,
    ) -> Result<(), DomainError> {
        if self.status != DebateStatus::Debating {
            return Err(self.transition_error(DebateStatus::Debating));
        }
        let round = self
            .rounds
            .last_mut()
            .ok_or(DomainError::InvalidTask("no open round".into()))?;
        round.decision = Some(decision);
        round.moderator_steps = moderator_steps;
        Ok(())
    }

    /// Debating -> Debating, opening the next round.
    pub fn next_round(&mut self) -> Result<(), DomainError> {
        if self.status != DebateStatus::Debating {
            return Err(self.transition_error(DebateStatus::Debating));
        }
        self.current_round += 1;
        self.rounds.push(DebateRound::new(self.current_round));
        Ok(())
    }

    /// Debating -> Concluding.
    pub fn begin_conclusion(&mut self) -> Result<(), DomainError> {
        if self.status != DebateStatus::Debating {
            return Err(self.transition_error(DebateStatus::Concluding));
        }
        self.status = DebateStatus::Concluding;
        self.speaking = None;
        Ok(())
    }

    /// Concluding -> Complete, attaching the summary.
    pub fn complete(&mut self, summary: DebateSummary) -> Result<(), DomainError> {
        if self.status != DebateStatus::Concluding {
            return Err(self.transition_error(DebateStatus::Complete));
        }
        self.status = DebateStatus::Complete;
        self.summary = Some(summary);
        self.speaking = None;
        Ok(())
    }

    /// Debating -> Paused. A no-op (returns false) from any other status.
    pub fn pause(&mut self) -> bool {
        if self.status == DebateStatus::Debating {
            self.status = DebateStatus::Paused;
            true
        } else {
            false
        }
    }

    /// Paused -> Debating. A no-op (returns false) from any other status.
    pub fn resume(&mut self) -> bool {
        if self.status == DebateStatus::Paused {
            self.status = DebateStatus::Debating;
            true
        } else {
            false
        }
    }

    /// Any status -> Error. Always permitted.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = DebateStatus::Error;
        self.error = Some(message.into());
        self.speaking = None;
    }

    pub fn set_speaking(&mut self, persona_id: Option<String>) {
        self.speaking = persona_id;
    }

    /// The round currently being argued or evaluated.
    pub fn current_round(&self) -> Option<&DebateRound> {
        self.rounds.last()
    }

    /// All arguments across rounds, in causal order.
    pub fn all_arguments(&self) -> Vec<&DebateArgument> {
        self.rounds.iter().flat_map(|r| r.arguments.iter()).collect()
    }

    pub fn persona(&self, persona_id: &str) -> Option<&PersonaConfig> {
        self.personas.iter().find(|p| p.id == persona_id)
    }

    fn transition_error(&self, to: DebateStatus) -> DomainError {
        DomainError::InvalidTransition {
            from: self.status.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

/// RFC 3339 timestamp for arguments and events.
pub(crate) fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// UUID-shaped identifier derived from the clock.
fn pseudo_uuid() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let nanos = now.as_nanos();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (nanos >> 96) as u32,
        (nanos >> 80) as u16,
        (nanos >> 64) as u16 & 0x0fff,
        ((nanos >> 48) as u16 & 0x3fff) | 0x8000,
        (nanos & 0xffffffffffff) as u64
    )
}
