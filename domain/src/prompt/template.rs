//! Prompt templates for the debate flow

use crate::persona::PersonaConfig;
use crate::tool::ToolDefinition;

/// Templates for every prompt the engine sends
pub struct DebatePrompt;

impl DebatePrompt {
    /// System prompt for a persona's turn
    pub fn persona_system(persona: &PersonaConfig) -> String {
        let mut prompt = format!(
            r#"You are {name}, a debate panelist who {role}.
You argue in structured, multi-round debates. Make one focused argument per turn.
Engage directly with prior arguments when they exist: support, refute, or refine them.
Be concrete. Prefer evidence and numbers over rhetoric."#,
            name = persona.name,
            role = persona.role,
        );

        if !persona.instructions.trim().is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(persona.instructions.trim());
        }

        prompt.push_str(
            r#"

End your argument with two lines assessing it yourself:
SCORE: <1-5, how strong you judge this argument>
CONFIDENCE: <0.0-1.0, how confident you are in it>"#,
        );
        prompt
    }

    /// User prompt for a persona's turn
    pub fn persona_turn(
        task: &str,
        document_excerpt: Option<&str>,
        prior_arguments: &[(String, String)],
        insights: &[String],
    ) -> String {
        let mut prompt = format!(
            r#"The debate topic:

{}"#,
            task
        );

        if let Some(excerpt) = document_excerpt {
            prompt.push_str(&format!(
                "\n\nReference document (excerpt):\n---\n{}\n---",
                excerpt
            ));
        }

        if !prior_arguments.is_empty() {
            prompt.push_str("\n\nThe debate so far:\n");
            for (speaker, content) in prior_arguments {
                prompt.push_str(&format!("\n--- {} ---\n{}\n", speaker, content));
            }
        }

        if !insights.is_empty() {
            prompt.push_str("\n\nYour notes from earlier rounds:\n");
            for insight in insights {
                prompt.push_str(&format!("- {}\n", insight));
            }
        }

        if prior_arguments.is_empty() {
            prompt.push_str("\n\nOpen the debate with your strongest argument.");
        } else {
            prompt.push_str("\n\nMake your next argument.");
        }
        prompt
    }

    /// System prompt for the moderator's round evaluation
    pub fn moderator_system() -> &'static str {
        r#"You are the moderator of a structured debate. You do not argue a position.
Your job is to judge whether another round would produce new substance,
or whether the debate has converged enough to conclude.
Use your evaluation tools to measure consensus, conflict, and progress before deciding."#
    }

    /// User prompt asking for a round decision
    pub fn round_evaluation(round: u32, max_rounds: u32, arguments: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"Round {} of at most {} has finished. The arguments made this round:
"#,
            round, max_rounds
        );

        for (speaker, content) in arguments {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", speaker, content));
        }

        prompt.push_str(
            r#"
Decide whether the debate should continue into another round or conclude now.

Answer with exactly these two lines:
DECISION: CONTINUE or CONCLUDE
REASONING: <one sentence explaining the decision>"#,
        );
        prompt
    }

    /// System prompt for the final summary
    pub fn summary_system() -> &'static str {
        r#"You are the moderator of a concluded debate, writing its final synthesis.
Weigh every argument on its merits. Represent disagreements honestly instead of
papering over them. Your synthesis is the single artifact readers will see."#
    }

    /// User prompt requesting the final summary
    pub fn summary_request(task: &str, arguments: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"The debate topic was:

{}

The full debate:
"#,
            task
        );

        for (speaker, content) in arguments {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", speaker, content));
        }

        prompt.push_str(
            r#"
Write the final synthesis in exactly this format:

CONSENSUS: <0-100, how much the panel converged>
KEY_AGREEMENTS:
- <point the panel agreed on>
KEY_DISAGREEMENTS:
- <point that stayed contested>
RECOMMENDATION: <the single actionable recommendation>
REASONING: <why, in one or two sentences>"#,
        );
        prompt
    }

    /// Tool-calling instructions for backends without native tool support.
    ///
    /// Appended to the system prompt; the adapter extracts `TOOL_CALL:`
    /// lines from responses and feeds results back as `TOOL_RESULT` lines.
    pub fn text_tool_protocol(tools: &[&ToolDefinition]) -> String {
        let mut prompt = String::from(
            r#"You may call tools. To call one, emit a line in exactly this form:
TOOL_CALL: tool_name({"argument": "value"})

Results come back in the next message as lines of the form:
TOOL_RESULT[tool_name]: output

Available tools:
"#,
        );

        for tool in tools {
            let params: Vec<String> = tool
                .parameters
                .iter()
                .map(|p| {
                    format!(
                        "{} ({}{})",
                        p.name,
                        p.param_type,
                        if p.required { ", required" } else { "" }
                    )
                })
                .collect();
            prompt.push_str(&format!(
                "- {}: {}{}\n",
                tool.name,
                tool.description,
                if params.is_empty() {
                    String::new()
                } else {
                    format!(" - parameters: {}", params.join(", "))
                }
            ));
        }

        prompt.push_str("\nCall at most one tool per line. When you have what you need, answer normally without TOOL_CALL lines.");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolParameter;

    #[test]
    fn test_persona_system_includes_role_and_markers() {
        let persona = PersonaConfig::new("skeptic", "The Skeptic", "stress-tests every claim")
            .with_instructions("Demand evidence.");
        let prompt = DebatePrompt::persona_system(&persona);
        assert!(prompt.contains("The Skeptic"));
        assert!(prompt.contains("stress-tests every claim"));
        assert!(prompt.contains("Demand evidence."));
        assert!(prompt.contains("SCORE:"));
        assert!(prompt.contains("CONFIDENCE:"));
    }

    #[test]
    fn test_persona_turn_sections_appear_when_present() {
        let prior = vec![("The Optimist (round 1)".to_string(), "It pays off.".to_string())];
        let insights = vec!["maintenance costs were contested".to_string()];
        let prompt = DebatePrompt::persona_turn(
            "Should the city build the tram line?",
            Some("Projected ridership: 12,000/day"),
            &prior,
            &insights,
        );
        assert!(prompt.contains("tram line"));
        assert!(prompt.contains("Projected ridership"));
        assert!(prompt.contains("The Optimist (round 1)"));
        assert!(prompt.contains("maintenance costs"));
        assert!(prompt.contains("Make your next argument."));
    }

    #[test]
    fn test_persona_turn_opening_variant() {
        let prompt = DebatePrompt::persona_turn("Topic", None, &[], &[]);
        assert!(prompt.contains("Open the debate"));
        assert!(!prompt.contains("The debate so far"));
        assert!(!prompt.contains("Reference document"));
    }

    #[test]
    fn test_round_evaluation_format() {
        let args = vec![("The Skeptic".to_string(), "The numbers are stale.".to_string())];
        let prompt = DebatePrompt::round_evaluation(2, 5, &args);
        assert!(prompt.contains("Round 2 of at most 5"));
        assert!(prompt.contains("DECISION: CONTINUE or CONCLUDE"));
        assert!(prompt.contains("The numbers are stale."));
    }

    #[test]
    fn test_summary_request_format() {
        let args = vec![("The Optimist (round 1)".to_string(), "Build it.".to_string())];
        let prompt = DebatePrompt::summary_request("Tram line?", &args);
        assert!(prompt.contains("CONSENSUS:"));
        assert!(prompt.contains("KEY_AGREEMENTS:"));
        assert!(prompt.contains("RECOMMENDATION:"));
        assert!(prompt.contains("Build it."));
    }

    #[test]
    fn test_text_tool_protocol_lists_tools() {
        let calculator = ToolDefinition::new("calculator", "Evaluate an arithmetic expression")
            .with_parameter(ToolParameter::new("expression", "The expression", true));
        let prompt = DebatePrompt::text_tool_protocol(&[&calculator]);
        assert!(prompt.contains("TOOL_CALL: tool_name"));
        assert!(prompt.contains("calculator: Evaluate an arithmetic expression"));
        assert!(prompt.contains("expression (string, required)"));
    }
}
