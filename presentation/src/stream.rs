//! Live rendering of the debate event stream.

use agora_application::EventSubscription;
use agora_domain::core::string::preview;
use agora_domain::debate::DebateEvent;
use agora_domain::persona::PersonaConfig;
use colored::Colorize;

use crate::console::{assessment_line, terminal_color};

/// Longest slice of a thinking step shown on one line.
const THINKING_PREVIEW_LEN: usize = 120;

/// Prints debate events as they arrive.
///
/// Holds a copy of the panel so persona ids can be rendered with their
/// display names and colors. In quiet mode everything except errors is
/// suppressed.
pub struct EventPrinter {
    personas: Vec<PersonaConfig>,
    quiet: bool,
}

impl EventPrinter {
    pub fn new(personas: Vec<PersonaConfig>, quiet: bool) -> Self {
        Self { personas, quiet }
    }

    /// Drain the subscription until a terminal event arrives.
    ///
    /// Returns the terminal event, or `None` if the channel closed without
    /// one (the debate task panicked or was dropped).
    pub async fn run(&self, subscription: &mut EventSubscription) -> Option<DebateEvent> {
        while let Some(event) = subscription.next().await {
            self.print(&event);
            if event.is_terminal() {
                return Some(event);
            }
        }
        None
    }

    /// Render a single event to stdout (errors go to stderr).
    pub fn print(&self, event: &DebateEvent) {
        // Errors are always shown; quiet mode swallows the rest.
        if self.quiet && !matches!(event, DebateEvent::DebateError { .. }) {
            return;
        }

        match event {
            DebateEvent::DebateStarted { task, personas, .. } => {
                println!("{} {}", "Debate:".cyan().bold(), task);
                let names: Vec<&str> = personas.iter().map(|id| self.display_name(id)).collect();
                println!("{} {}\n", "Panel:".cyan().bold(), names.join(", "));
            }
            DebateEvent::RoundStarted { round, .. } => {
                println!("{}", format!("── Round {} ──", round).cyan().bold());
            }
            DebateEvent::AgentThinking {
                persona_id, content, ..
            } => {
                let line = format!(
                    "{} thinking: {}",
                    self.display_name(persona_id),
                    preview(content, THINKING_PREVIEW_LEN)
                );
                println!("{}", line.dimmed());
            }
            DebateEvent::AgentToolUse {
                persona_id,
                tool,
                input,
                ..
            } => {
                let line = format!("{} -> {}({})", self.display_name(persona_id), tool, input);
                println!("{}", line.yellow());
            }
            DebateEvent::AgentArgument { argument, .. } => {
                let persona = self.persona(&argument.persona_id);
                let name = persona
                    .map(|p| p.name.as_str())
                    .unwrap_or(argument.persona_id.as_str());
                let color = terminal_color(persona.map(|p| p.color).unwrap_or_default());
                println!("\n{}", format!("── {} ──", name).color(color).bold());
                println!("{}", argument.content);
                if let Some(line) = assessment_line(argument.score, argument.confidence) {
                    println!("{}", line.dimmed());
                }
                println!();
            }
            DebateEvent::RoundComplete {
                verdict, reasoning, ..
            } => {
                println!(
                    "{} {}\n  {}\n",
                    "Moderator:".bold(),
                    verdict.to_string().bold(),
                    reasoning
                );
            }
            DebateEvent::DebateComplete { .. } => {
                println!("{}", "Debate complete.".green().bold());
            }
            DebateEvent::DebateError { message, .. } => {
                eprintln!("{} {}", "Debate failed:".red().bold(), message);
            }
            DebateEvent::DebatePaused { .. } => {
                println!("{}", "Debate paused.".dimmed());
            }
            DebateEvent::DebateResumed { .. } => {
                println!("{}", "Debate resumed.".dimmed());
            }
        }
    }

    fn persona(&self, id: &str) -> Option<&PersonaConfig> {
        self.personas.iter().find(|p| p.id == id)
    }

    fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.persona(id).map(|p| p.name.as_str()).unwrap_or(id)
    }
}
