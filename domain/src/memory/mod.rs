//! Persona memory — insights carried between rounds.
//!
//! Each persona records a short insight per argument it makes. Later turns
//! recall the most relevant ones: relevance is keyword overlap with the
//! task, weighted by the insight's confidence decayed per round of age, so
//! stale observations gradually stop shaping the prompt.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Confidence multiplier applied per round of age.
const ROUND_DECAY: f32 = 0.9;
/// Keywords shorter than this are ignored when scoring overlap.
const MIN_KEYWORD_LEN: usize = 4;

/// One remembered observation from a past argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub content: String,
    /// Confidence at recording time, 0.0-1.0
    pub confidence: f32,
    /// Round the insight was recorded in
    pub round: u32,
}

impl Insight {
    pub fn new(content: impl Into<String>, confidence: f32, round: u32) -> Self {
        Self {
            content: content.into(),
            confidence: confidence.clamp(0.0, 1.0),
            round,
        }
    }
}

/// Per-persona insight storage for one debate.
#[derive(Debug, Default)]
pub struct InsightStore {
    by_persona: HashMap<String, Vec<Insight>>,
}

impl InsightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, persona_id: impl Into<String>, insight: Insight) {
        self.by_persona
            .entry(persona_id.into())
            .or_default()
            .push(insight);
    }

    /// The persona's insights most relevant to `task`, best first.
    ///
    /// Score = keyword overlap with the task × confidence × decay^age.
    /// Insights with zero overlap are never returned; at most `limit`
    /// results.
    pub fn recall(
        &self,
        persona_id: &str,
        task: &str,
        current_round: u32,
        limit: usize,
    ) -> Vec<&Insight> {
        let Some(insights) = self.by_persona.get(persona_id) else {
            return Vec::new();
        };
        let task_keywords = keywords(task);
        if task_keywords.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &Insight)> = insights
            .iter()
            .filter_map(|insight| {
                let overlap = overlap_score(&task_keywords, &insight.content);
                if overlap == 0.0 {
                    return None;
                }
                let age = current_round.saturating_sub(insight.round);
                let score = overlap * insight.confidence * ROUND_DECAY.powi(age as i32);
                Some((score, insight))
            })
            .collect();

        // Best score first; newer insight wins ties.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.1.round.cmp(&a.1.round))
        });
        scored.into_iter().take(limit).map(|(_, i)| i).collect()
    }

    pub fn len(&self, persona_id: &str) -> usize {
        self.by_persona.get(persona_id).map_or(0, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.by_persona.values().all(|v| v.is_empty())
    }
}

/// Fraction of `task_keywords` present in `content`.
fn overlap_score(task_keywords: &[String], content: &str) -> f32 {
    let content_keywords = keywords(content);
    if task_keywords.is_empty() {
        return 0.0;
    }
    let shared = task_keywords
        .iter()
        .filter(|k| content_keywords.contains(k))
        .count();
    shared as f32 / task_keywords.len() as f32
}

/// Lowercased, deduplicated alphanumeric tokens above the length floor.
///
/// Shared by insight recall and the moderator's evaluation tools, so both
/// score text overlap the same way.
pub fn keywords(text: &str) -> Vec<String> {
    let mut words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= MIN_KEYWORD_LEN)
        .map(|w| w.to_lowercase())
        .collect();
    words.sort();
    words.dedup();
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recall_ranks_by_relevance() {
        let mut store = InsightStore::new();
        store.record(
            "skeptic",
            Insight::new("ridership projections assume constant growth", 0.8, 1),
        );
        store.record(
            "skeptic",
            Insight::new("the weather was nice yesterday", 0.9, 1),
        );

        let recalled = store.recall("skeptic", "are the ridership projections credible?", 2, 5);
        assert_eq!(recalled.len(), 1);
        assert!(recalled[0].content.contains("ridership"));
    }

    #[test]
    fn test_recall_decays_older_rounds() {
        let mut store = InsightStore::new();
        store.record("optimist", Insight::new("budget overruns are rare here", 0.7, 1));
        store.record("optimist", Insight::new("budget reserves cover overruns", 0.7, 3));

        let recalled = store.recall("optimist", "what about budget overruns?", 3, 2);
        assert_eq!(recalled.len(), 2);
        // Same overlap and confidence: the newer insight decays less.
        assert_eq!(recalled[0].round, 3);
        assert_eq!(recalled[1].round, 1);
    }

    #[test]
    fn test_recall_respects_limit_and_unknown_persona() {
        let mut store = InsightStore::new();
        for round in 1..=4 {
            store.record(
                "ethicist",
                Insight::new(format!("fairness concern number {round}"), 0.5, round),
            );
        }
        assert_eq!(store.recall("ethicist", "fairness concern", 5, 2).len(), 2);
        assert!(store.recall("nobody", "fairness", 5, 2).is_empty());
    }

    #[test]
    fn test_confidence_is_clamped_on_construction() {
        let insight = Insight::new("x", 3.0, 1);
        assert_eq!(insight.confidence, 1.0);
    }

    #[test]
    fn test_short_words_never_match() {
        let mut store = InsightStore::new();
        store.record("skeptic", Insight::new("it is an odd mix", 1.0, 1));
        // Every shared token is under the keyword length floor.
        assert!(store.recall("skeptic", "it is odd", 1, 5).is_empty());
    }
}
