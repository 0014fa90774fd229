//! Console mode — type LINE commands in a terminal.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Each line goes straight to the router as if the chosen user sent it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use stayclock_core::bus::types::InboundMessage;
use stayclock_core::config::load_config;
use stayclock_core::{SessionStore, SystemClock};
use stayclock_router::CommandRouter;

use crate::helpers;

const CHANNEL: &str = "console";

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Prefix for switching the acting user.
const USER_COMMAND: &str = "/user ";

/// Run the console loop as `user_id`.
pub fn run(user_id: &str) -> Result<()> {
    let config = load_config(None);
    let router = CommandRouter::from_config(&config, Arc::new(SessionStore::new()), Arc::new(SystemClock));

    helpers::print_banner();
    println!("  Commands: {}", router.keywords().join(" / "));
    println!(
        "{}",
        "  \"/user ID\" switches user, \"exit\" quits.".dimmed()
    );
    println!();

    let mut user = user_id.to_string();
    let mut editor = create_editor()?;
    let mut seq: u64 = 0;

    loop {
        let input = match editor.readline(&format!("{user}> ")) {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        // Commands are matched exactly, so only the line ending is dropped.
        let text = input.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(text);

        if is_exit_command(text.trim()) {
            break;
        }
        if let Some(next) = parse_user_switch(text) {
            user = next;
            println!("{}", format!("  acting as {user}").dimmed());
            continue;
        }

        seq += 1;
        let msg = InboundMessage::new(CHANNEL, user.as_str(), user.as_str(), text)
            .with_reply_token(format!("console-{seq}"));
        debug!(user_id = %user, "console input");

        let outbound = router.handle(&msg);
        helpers::print_delivery(&outbound);
    }

    save_history(&mut editor);
    println!("\nGoodbye!");
    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let path = history_path();
    if path.exists() {
        let _ = editor.load_history(&path);
        debug!("loaded console history from {}", path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> PathBuf {
    stayclock_core::utils::get_data_path()
        .join("history")
        .join("console_history")
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

fn parse_user_switch(input: &str) -> Option<String> {
    let id = input.strip_prefix(USER_COMMAND)?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
