//! Moderator evaluation tools
//!
//! Deterministic lenses over the arguments made so far. Instead of
//! re-reading the whole transcript, the moderator calls these to get short
//! numeric summaries it can cite in a continue/conclude decision. All
//! three are heuristics over keyword overlap and marker words, pure over
//! the tool context, so the same debate always scores the same.

use std::collections::{HashMap, HashSet};

use agora_application::ports::tool_executor::ToolContext;
use agora_domain::debate::DebateArgument;
use agora_domain::memory::keywords;
use agora_domain::tool::{ToolCall, ToolDefinition, ToolError};

use super::registry::DebateTool;

pub const EVALUATE_CONSENSUS: &str = "evaluate_consensus";
pub const EVALUATE_CONFLICT: &str = "evaluate_conflict";
pub const EVALUATE_PROGRESS: &str = "evaluate_progress";

/// Phrases that signal one persona pushing against another
const OPPOSITION_MARKERS: &[&str] = &[
    "disagree",
    "however",
    "but ",
    "wrong",
    "flawed",
    "overstate",
    "understate",
    "fails",
    "no evidence",
    "counter",
    "reject",
    "object",
];

pub fn consensus_definition() -> ToolDefinition {
    ToolDefinition::new(
        EVALUATE_CONSENSUS,
        "Estimate how much the personas' latest arguments agree, as a 0-100 score \
         with the closest and farthest pair.",
    )
}

pub fn conflict_definition() -> ToolDefinition {
    ToolDefinition::new(
        EVALUATE_CONFLICT,
        "Gauge how adversarial the current round is by counting opposition markers \
         in its arguments.",
    )
}

pub fn progress_definition() -> ToolDefinition {
    ToolDefinition::new(
        EVALUATE_PROGRESS,
        "Judge whether the latest round introduced new material or mostly restated \
         earlier rounds.",
    )
}

pub struct ConsensusEvaluator;

impl DebateTool for ConsensusEvaluator {
    fn definition(&self) -> ToolDefinition {
        consensus_definition()
    }

    fn execute(&self, _call: &ToolCall, context: &ToolContext) -> Result<String, ToolError> {
        Ok(consensus_report(&context.arguments))
    }
}

pub struct ConflictEvaluator;

impl DebateTool for ConflictEvaluator {
    fn definition(&self) -> ToolDefinition {
        conflict_definition()
    }

    fn execute(&self, _call: &ToolCall, context: &ToolContext) -> Result<String, ToolError> {
        Ok(conflict_report(&context.arguments))
    }
}

pub struct ProgressEvaluator;

impl DebateTool for ProgressEvaluator {
    fn definition(&self) -> ToolDefinition {
        progress_definition()
    }

    fn execute(&self, _call: &ToolCall, context: &ToolContext) -> Result<String, ToolError> {
        Ok(progress_report(&context.arguments))
    }
}

/// Average pairwise keyword overlap across each persona's latest argument.
pub fn consensus_report(arguments: &[DebateArgument]) -> String {
    let latest = latest_by_persona(arguments);
    if latest.len() < 2 {
        return "Not enough personas have argued yet to measure consensus.".to_string();
    }

    let mut pairs: Vec<(u32, &str, &str)> = Vec::new();
    for i in 0..latest.len() {
        for j in (i + 1)..latest.len() {
            let percent = overlap_percent(latest[i].1, latest[j].1);
            pairs.push((percent, latest[i].0, latest[j].0));
        }
    }

    let average = pairs.iter().map(|p| p.0).sum::<u32>() / pairs.len() as u32;
    let label = match average {
        0..=33 => "low",
        34..=66 => "moderate",
        _ => "high",
    };
    // max/min cannot fail: two personas give at least one pair.
    let closest = pairs.iter().max_by_key(|p| p.0).copied().unwrap_or(pairs[0]);
    let farthest = pairs.iter().min_by_key(|p| p.0).copied().unwrap_or(pairs[0]);

    format!(
        "Consensus estimate: {average}% ({label}) across {} personas.\n\
         Closest positions: {} and {} ({}% shared terms).\n\
         Widest gap: {} and {} ({}% shared terms).",
        latest.len(),
        closest.1,
        closest.2,
        closest.0,
        farthest.1,
        farthest.2,
        farthest.0,
    )
}

/// Opposition-marker density in the current round.
pub fn conflict_report(arguments: &[DebateArgument]) -> String {
    let Some(current_round) = arguments.iter().map(|a| a.round).max() else {
        return "No arguments have been made yet.".to_string();
    };
    let round_arguments: Vec<&DebateArgument> = arguments
        .iter()
        .filter(|a| a.round == current_round)
        .collect();

    let mut total = 0usize;
    let mut per_persona: Vec<(&str, usize)> = Vec::new();
    for argument in &round_arguments {
        let lowered = argument.content.to_lowercase();
        let count: usize = OPPOSITION_MARKERS
            .iter()
            .map(|marker| lowered.matches(marker).count())
            .sum();
        total += count;
        per_persona.push((argument.persona_id.as_str(), count));
    }

    let per_argument = total as f32 / round_arguments.len() as f32;
    let level = if total == 0 {
        "calm"
    } else if per_argument < 1.5 {
        "moderate"
    } else {
        "elevated"
    };

    let mut report = format!(
        "Conflict level: {level}. {total} opposition markers across {} arguments in round {current_round}.",
        round_arguments.len()
    );
    if let Some((persona, count)) = per_persona.iter().max_by_key(|(_, c)| *c)
        && *count > 0
    {
        report.push_str(&format!("\nMost combative: {persona} ({count} markers)."));
    }
    report
}

/// Share of the current round's keywords that no earlier round used.
pub fn progress_report(arguments: &[DebateArgument]) -> String {
    let Some(current_round) = arguments.iter().map(|a| a.round).max() else {
        return "No arguments have been made yet.".to_string();
    };
    if !arguments.iter().any(|a| a.round < current_round) {
        return "Only one round of arguments exists; there is nothing earlier to compare against."
            .to_string();
    }

    let mut current_terms: HashSet<String> = HashSet::new();
    let mut earlier_terms: HashSet<String> = HashSet::new();
    for argument in arguments {
        let terms = keywords(&argument.content);
        if argument.round == current_round {
            current_terms.extend(terms);
        } else {
            earlier_terms.extend(terms);
        }
    }
    if current_terms.is_empty() {
        return format!("Round {current_round} contains no scoreable terms.");
    }

    let new_terms = current_terms.difference(&earlier_terms).count();
    let percent = new_terms * 100 / current_terms.len();
    let verdict = if percent >= 25 {
        "The debate is still surfacing new material."
    } else {
        "The debate is mostly restating earlier points."
    };
    format!("Round {current_round} introduced {percent}% new terms relative to earlier rounds. {verdict}")
}

/// Each persona's most recent argument, in first-appearance order.
fn latest_by_persona(arguments: &[DebateArgument]) -> Vec<(&str, &str)> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &str> = HashMap::new();
    for argument in arguments {
        if !latest.contains_key(argument.persona_id.as_str()) {
            order.push(&argument.persona_id);
        }
        latest.insert(&argument.persona_id, &argument.content);
    }
    order
        .into_iter()
        .filter_map(|id| latest.get(id).map(|content| (id, *content)))
        .collect()
}

/// Jaccard overlap of the two texts' keyword sets, as a percentage.
fn overlap_percent(a: &str, b: &str) -> u32 {
    let left: HashSet<String> = keywords(a).into_iter().collect();
    let right: HashSet<String> = keywords(b).into_iter().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0;
    }
    let shared = left.intersection(&right).count();
    (shared * 100 / union) as u32
}

// ==================== Evaluator Tests ====================
