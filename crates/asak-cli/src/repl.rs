//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history. The
//! conversation is kept across turns, and each turn is routed independently, so
//! consecutive replies may come from different models.

use std::path::Path;

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use asak_core::Message;
use asak_router::Selector;

use crate::chat::{self, ChatOptions};
use crate::{helpers, usage_cmd};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Clears the conversation, keeping the system prompt.
const RESET_COMMAND: &str = "/reset";

/// Run the interactive REPL loop.
pub async fn run(selector: &Selector, options: &ChatOptions, usage_path: &Path) -> Result<()> {
    helpers::print_banner(options.mode.as_str(), &options.filter);

    let mut editor = create_editor()?;
    let mut conversation = Conversation::new(options.system.as_deref());

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C — exit cleanly
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D — exit cleanly
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye! 👋");
            break;
        }

        let _ = editor.add_history_entry(&input);

        if trimmed.eq_ignore_ascii_case(RESET_COMMAND) {
            conversation.reset();
            println!("(conversation cleared)\n");
            continue;
        }

        debug!(turns = conversation.turns(), input = trimmed, "processing input");

        let messages = conversation.with_user(trimmed);
        let result = chat::ask(selector, options, messages).await;

        // Every attempt reserved quota, successful or not.
        if let Err(e) = usage_cmd::save(selector, usage_path) {
            debug!("failed to save usage: {e}");
        }

        match result {
            Ok(reply) => conversation.push_turn(trimmed, reply),
            Err(e) => helpers::print_error(&e),
        }
    }

    save_history(&mut editor);

    Ok(())
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

/// Message history sent with every turn.
#[derive(Debug, Default)]
struct Conversation {
    system: Option<String>,
    history: Vec<Message>,
}

impl Conversation {
    fn new(system: Option<&str>) -> Self {
        Self {
            system: system.filter(|s| !s.trim().is_empty()).map(String::from),
            history: Vec::new(),
        }
    }

    /// Full message list for a new user input, without recording it yet.
    fn with_user(&self, input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        if let Some(system) = &self.system {
            messages.push(Message::system(system.as_str()));
        }
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(input));
        messages
    }

    /// Record a completed exchange.
    fn push_turn(&mut self, input: &str, reply: String) {
        self.history.push(Message::user(input));
        self.history.push(Message::assistant(reply));
    }

    fn turns(&self) -> usize {
        self.history.len() / 2
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}

// ─────────────────────────────────────────────
// Editor
// ─────────────────────────────────────────────

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    asak_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
