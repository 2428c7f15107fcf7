//! `asak chat` — send a conversation through the selector and print the reply.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use futures_util::StreamExt;
use tracing::debug;

use asak_core::Message;
use asak_router::{Mode, ModelFilter, ResponseBody, Selector};

use crate::helpers;

/// How each chat turn is routed.
#[derive(Clone, Debug)]
pub struct ChatOptions {
    pub mode: Mode,
    pub filter: ModelFilter,
    pub system: Option<String>,
    pub stream: bool,
}

/// Optional system prompt followed by the user's first message.
pub fn initial_messages(system: Option<&str>, user: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if let Some(prompt) = system.filter(|s| !s.trim().is_empty()) {
        messages.push(Message::system(prompt));
    }
    messages.push(Message::user(user));
    messages
}

/// Route `messages` to a model, print the reply as it arrives, and return its full text.
pub async fn ask(selector: &Selector, options: &ChatOptions, messages: Vec<Message>) -> Result<String> {
    debug!(
        mode = %options.mode,
        filter = %options.filter,
        messages = messages.len(),
        "sending chat turn"
    );

    if !options.stream {
        helpers::print_thinking();
    }
    let response = selector
        .request_with(options.mode, &options.filter, messages, options.stream)
        .await;
    if !options.stream {
        helpers::clear_thinking();
    }
    let response = response?;

    println!();
    println!("{}", helpers::reply_header(&response.selected).cyan().bold());

    let text = match response.body {
        ResponseBody::Delta(mut deltas) => {
            let mut text = String::new();
            let mut stdout = std::io::stdout();
            while let Some(delta) = deltas.next().await {
                let delta = delta?;
                print!("{delta}");
                stdout.flush()?;
                text.push_str(&delta);
            }
            println!();
            text
        }
        ResponseBody::Message { message, .. } => {
            let text = message.content.unwrap_or_default();
            if text.is_empty() {
                println!("{}", "(no response)".dimmed());
            } else {
                println!("{text}");
            }
            text
        }
    };
    println!();

    Ok(text)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
