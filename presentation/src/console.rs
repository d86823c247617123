//! Console output formatter for finished debates

use agora_domain::OutputFormat;
use agora_domain::debate::{DebateState, DebateSummary};
use agora_domain::persona::PersonaColor;
use colored::{Color, Colorize};

/// Map a persona's configured color onto the terminal palette.
pub fn terminal_color(color: PersonaColor) -> Color {
    match color {
        PersonaColor::Red => Color::Red,
        PersonaColor::Green => Color::Green,
        PersonaColor::Yellow => Color::Yellow,
        PersonaColor::Blue => Color::Blue,
        PersonaColor::Magenta => Color::Magenta,
        PersonaColor::Cyan => Color::Cyan,
        PersonaColor::White => Color::White,
    }
}

/// One-line self-assessment, or `None` when the argument carries neither value.
pub(crate) fn assessment_line(score: Option<u8>, confidence: Option<f32>) -> Option<String> {
    match (score, confidence) {
        (Some(score), Some(confidence)) => {
            Some(format!("score {}/5, confidence {:.2}", score, confidence))
        }
        (Some(score), None) => Some(format!("score {}/5", score)),
        (None, Some(confidence)) => Some(format!("confidence {:.2}", confidence)),
        (None, None) => None,
    }
}

/// Formats debate state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render the state in the requested format.
    pub fn format(state: &DebateState, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format_full(state),
            OutputFormat::Summary => Self::format_summary(state),
            OutputFormat::Json => Self::format_json(state),
        }
    }

    /// Format the complete debate: every round and argument, then the summary
    pub fn format_full(state: &DebateState) -> String {
        let mut output = String::new();

        // Header
        output.push_str(&Self::header("Debate"));
        output.push('\n');

        output.push_str(&format!("{} {}\n\n", "Task:".cyan().bold(), state.task));
        output.push_str(&format!(
            "{} {}\n",
            "Panel:".cyan().bold(),
            state
                .personas
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        for round in &state.rounds {
            output.push_str(&Self::section_header(&format!("Round {}", round.number)));

            for argument in &round.arguments {
                let persona = state.persona(&argument.persona_id);
                let name = persona
                    .map(|p| p.name.as_str())
                    .unwrap_or(argument.persona_id.as_str());
                let color = terminal_color(
                    persona.map(|p| p.color).unwrap_or_default(),
                );

                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", name).color(color).bold(),
                    argument.content
                ));
                if let Some(line) = assessment_line(argument.score, argument.confidence) {
                    output.push_str(&format!("{}\n", line.dimmed()));
                }
                if !argument.tools_used.is_empty() {
                    output.push_str(&format!(
                        "{}\n",
                        format!("tools: {}", argument.tools_used.join(", ")).dimmed()
                    ));
                }
            }

            if let Some(decision) = &round.decision {
                let verdict = if decision.forced {
                    format!("{} (round ceiling reached)", decision.verdict)
                } else {
                    decision.verdict.to_string()
                };
                output.push_str(&format!(
                    "\n{} {}\n  {}\n",
                    "Moderator:".bold(),
                    verdict.bold(),
                    decision.reasoning
                ));
            }
        }

        if let Some(summary) = &state.summary {
            output.push_str(&Self::section_header("Summary"));
            output.push_str(&Self::summary_body(summary));
        }
        if let Some(error) = &state.error {
            output.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format only the final summary (concise output)
    pub fn format_summary(state: &DebateState) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n\n", "=== Debate Conclusion ===".cyan().bold()));
        output.push_str(&format!("{} {}\n\n", "Task:".bold(), state.task));

        if let Some(summary) = &state.summary {
            output.push_str(&Self::summary_body(summary));
        } else if let Some(error) = &state.error {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
        } else {
            output.push_str("The debate did not produce a summary.\n");
        }

        output
    }

    /// Format as JSON
    pub fn format_json(state: &DebateState) -> String {
        serde_json::to_string_pretty(state).unwrap_or_else(|_| "{}".to_string())
    }

    fn summary_body(summary: &DebateSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}%\n",
            "Consensus:".cyan().bold(),
            summary.consensus
        ));

        if !summary.key_agreements.is_empty() {
            output.push_str(&format!("\n{}\n", "Agreements:".green().bold()));
            for point in &summary.key_agreements {
                output.push_str(&format!("  * {}\n", point));
            }
        }

        if !summary.key_disagreements.is_empty() {
            output.push_str(&format!("\n{}\n", "Disagreements:".yellow().bold()));
            for point in &summary.key_disagreements {
                output.push_str(&format!("  * {}\n", point));
            }
        }

        output.push_str(&format!(
            "\n{}\n{}\n",
            "Recommendation:".cyan().bold(),
            summary.recommendation
        ));

        if !summary.reasoning.is_empty() {
            output.push_str(&format!(
                "\n{}\n{}\n",
                "Moderator reasoning:".cyan().bold(),
                summary.reasoning
            ));
        }

        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
