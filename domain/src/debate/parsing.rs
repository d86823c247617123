//! Free-text extraction from model responses.
//!
//! Personas and the moderator are instructed to end their responses with
//! marker lines; backends without native tool support emit calls as
//! `TOOL_CALL:` lines. These functions recover that structure. They are pure
//! domain logic — no I/O, just text scanning — and they never fail: missing
//! or malformed markers fall back to documented defaults.
//!
//! | Function | Extracts | On absence |
//! |----------|----------|------------|
//! | [`extract_assessment`] | `SCORE: n`, `CONFIDENCE: x.xx` | fields stay unset |
//! | [`parse_decision`] | `DECISION: CONTINUE\|CONCLUDE` + `REASONING:` | `None` (caller falls back) |
//! | [`parse_summary`] | `CONSENSUS`, list and text sections | per-field defaults |
//! | [`split_text_tool_calls`] | `TOOL_CALL: name({json})` lines | empty call list |

use crate::debate::entities::{DebateSummary, RoundDecision, Verdict};
use crate::tool::ToolCall;
use std::collections::HashMap;

/// Line prefix of the text-convention tool protocol.
pub const TEXT_TOOL_CALL_PREFIX: &str = "TOOL_CALL:";

const DEFAULT_CONSENSUS: u8 = 50;
const DEFAULT_RECOMMENDATION: &str = "No clear recommendation emerged from the debate.";
const DEFAULT_REASONING: &str = "The debate concluded without explicit reasoning.";

/// Strip self-assessment markers from an argument and return
/// `(content, score, confidence)`.
///
/// `SCORE:` takes an integer 1-5, `CONFIDENCE:` a float 0.0-1.0; both are
/// clamped into range. Markers are removed wherever they appear; when a
/// marker is not followed by a number it is left in place as ordinary text.
/// Absent markers are not an error — the fields simply stay unset.
///
/// # Examples
///
/// ```
/// use agora_domain::debate::parsing::extract_assessment;
///
/// let (content, score, confidence) =
///     extract_assessment("The plan is sound.\nSCORE: 4\nCONFIDENCE: 0.85");
/// assert_eq!(content, "The plan is sound.");
/// assert_eq!(score, Some(4));
/// assert_eq!(confidence, Some(0.85));
/// ```
pub fn extract_assessment(text: &str) -> (String, Option<u8>, Option<f32>) {
    let (without_score, score_token) = strip_marker(text, "SCORE:");
    let (stripped, confidence_token) = strip_marker(&without_score, "CONFIDENCE:");

    let score = score_token
        .and_then(|t| t.trim_end_matches('.').parse::<f32>().ok())
        .map(|s| (s.round().clamp(1.0, 5.0)) as u8);
    let confidence = confidence_token
        .and_then(|t| t.trim_end_matches('.').parse::<f32>().ok())
        .map(|c| c.clamp(0.0, 1.0));

    let content = stripped
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    (content, score, confidence)
}

/// Remove every `MARKER <number>` occurrence from `text`, returning the
/// cleaned text and the last captured number token.
fn strip_marker(text: &str, marker: &str) -> (String, Option<String>) {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut captured = None;

    while let Some(pos) = rest.find(marker) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + marker.len()..];
        let after_ws = after.trim_start_matches([' ', '\t']);
        let num_len = after_ws
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .count();
        if num_len > 0 {
            captured = Some(after_ws[..num_len].to_string());
            let ws_len = after.len() - after_ws.len();
            rest = &after[ws_len + num_len..];
        } else {
            // Marker without a number stays as ordinary text.
            out.push_str(marker);
            rest = after;
        }
    }
    out.push_str(rest);
    (out, captured)
}

/// Extract the moderator's explicit round decision.
///
/// Looks for a line starting with `DECISION:` followed by `CONTINUE` or
/// `CONCLUDE` (case-insensitive), and an optional `REASONING:` line.
/// Returns `None` when no explicit decision is present so the caller can
/// apply its heuristic fallback.
pub fn parse_decision(text: &str) -> Option<RoundDecision> {
    let mut verdict = None;
    let mut reasoning = None;

    for line in text.lines() {
        let upper = line.trim().to_uppercase();
        if verdict.is_none()
            && let Some(rest) = upper.strip_prefix("DECISION:")
        {
            let word = rest.trim();
            if word.starts_with("CONTINUE") {
                verdict = Some(Verdict::Continue);
            } else if word.starts_with("CONCLUDE") {
                verdict = Some(Verdict::Conclude);
            }
        } else if reasoning.is_none()
            && upper.starts_with("REASONING:")
            && let Some((_, rest)) = line.split_once(':')
        {
            let rest = rest.trim();
            if !rest.is_empty() {
                reasoning = Some(rest.to_string());
            }
        }
    }

    verdict.map(|v| {
        RoundDecision::new(
            v,
            reasoning.unwrap_or_else(|| "No reasoning provided.".to_string()),
        )
    })
}

/// Parse the final summary response into a [`DebateSummary`].
///
/// Recognized section headers (a leading keyword on its own line, `_` and
/// space interchangeable): `CONSENSUS`, `KEY_AGREEMENTS`,
/// `KEY_DISAGREEMENTS`, `RECOMMENDATION`, `REASONING`. Never fails; any
/// missing section gets its default:
///
/// | Section | Default |
/// |---------|---------|
/// | consensus | 50 (clamped 0-100) |
/// | key agreements / disagreements | empty list |
/// | recommendation | generic no-recommendation text |
/// | reasoning | generic no-reasoning text |
pub fn parse_summary(text: &str) -> DebateSummary {
    #[derive(PartialEq, Clone, Copy)]
    enum Section {
        None,
        Agreements,
        Disagreements,
        Recommendation,
        Reasoning,
    }

    let mut consensus = None;
    let mut agreements = Vec::new();
    let mut disagreements = Vec::new();
    let mut recommendation: Vec<String> = Vec::new();
    let mut reasoning: Vec<String> = Vec::new();
    let mut section = Section::None;

    for line in text.lines() {
        let trimmed = line.trim();
        let normalized = trimmed.to_uppercase().replace(' ', "_");

        if normalized.starts_with("CONSENSUS") {
            consensus = first_integer(trimmed).map(|n| n.clamp(0, 100) as u8);
            section = Section::None;
        } else if normalized.starts_with("KEY_AGREEMENTS") {
            section = Section::Agreements;
        } else if normalized.starts_with("KEY_DISAGREEMENTS") {
            section = Section::Disagreements;
        } else if normalized.starts_with("RECOMMENDATION") {
            section = Section::Recommendation;
            push_header_rest(trimmed, &mut recommendation);
        } else if normalized.starts_with("REASONING") {
            section = Section::Reasoning;
            push_header_rest(trimmed, &mut reasoning);
        } else if !trimmed.is_empty() {
            match section {
                Section::Agreements => agreements.push(strip_bullet(trimmed)),
                Section::Disagreements => disagreements.push(strip_bullet(trimmed)),
                Section::Recommendation => recommendation.push(trimmed.to_string()),
                Section::Reasoning => reasoning.push(trimmed.to_string()),
                Section::None => {}
            }
        }
    }

    DebateSummary {
        consensus: consensus.unwrap_or(DEFAULT_CONSENSUS),
        key_agreements: agreements,
        key_disagreements: disagreements,
        recommendation: join_or_default(recommendation, DEFAULT_RECOMMENDATION),
        reasoning: join_or_default(reasoning, DEFAULT_REASONING),
    }
}

fn first_integer(line: &str) -> Option<u32> {
    let digits: String = line
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn push_header_rest(line: &str, target: &mut Vec<String>) {
    if let Some((_, rest)) = line.split_once(':') {
        let rest = rest.trim();
        if !rest.is_empty() {
            target.push(rest.to_string());
        }
    }
}

fn strip_bullet(line: &str) -> String {
    let trimmed = line.trim_start_matches(['-', '*', '•']).trim_start();
    // Numbered bullets: "1. point" / "2) point"
    let without_number = trimmed
        .strip_prefix(|c: char| c.is_ascii_digit())
        .map(|rest| rest.trim_start_matches(|c: char| c.is_ascii_digit()))
        .and_then(|rest| rest.strip_prefix(['.', ')']))
        .map(str::trim_start);
    without_number.unwrap_or(trimmed).to_string()
}

fn join_or_default(parts: Vec<String>, default: &str) -> String {
    if parts.is_empty() {
        default.to_string()
    } else {
        parts.join(" ")
    }
}

/// Split a response into prose and `TOOL_CALL:` invocations.
///
/// The text convention asks the model for lines of the form
/// `TOOL_CALL: name({"arg": "value"})`. Every line starting with the prefix
/// is removed from the content; lines whose argument blob is not a JSON
/// object are dropped without producing a call, and a malformed call is
/// not an error. Call ids are synthesized in order (`call_1`, `call_2`, ...).
///
/// # Examples
///
/// ```
/// use agora_domain::debate::parsing::split_text_tool_calls;
///
/// let (content, calls) =
///     split_text_tool_calls("Let me check.\nTOOL_CALL: calculator({\"expression\": \"2+2\"})");
/// assert_eq!(content, "Let me check.");
/// assert_eq!(calls.len(), 1);
/// assert_eq!(calls[0].name, "calculator");
/// ```
pub fn split_text_tool_calls(text: &str) -> (String, Vec<ToolCall>) {
    let mut content_lines = Vec::new();
    let mut calls = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(invocation) = trimmed.strip_prefix(TEXT_TOOL_CALL_PREFIX) {
            if let Some((name, arguments)) = parse_invocation(invocation) {
                let id = format!("call_{}", calls.len() + 1);
                calls.push(ToolCall::new(id, name).with_arguments(arguments));
            }
            // Protocol lines never appear in the content, parsed or not.
        } else {
            content_lines.push(line);
        }
    }

    (content_lines.join("\n").trim().to_string(), calls)
}

/// Parse `name({json})` from a single invocation line.
fn parse_invocation(invocation: &str) -> Option<(String, HashMap<String, serde_json::Value>)> {
    let invocation = invocation.trim();
    let open = invocation.find('(')?;
    let close = invocation.rfind(')')?;
    if close < open {
        return None;
    }

    let name = invocation[..open].trim();
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }

    let blob = invocation[open + 1..close].trim();
    if blob.is_empty() {
        return Some((name.to_string(), HashMap::new()));
    }

    let start = blob.find('{')?;
    let end = blob.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(&blob[start..=end]) {
        Ok(serde_json::Value::Object(map)) => {
            Some((name.to_string(), map.into_iter().collect()))
        }
        _ => None,
    }
}
