//! Non-interactive "say" command: one turn, reply on stdout.

use std::error::Error;

use crate::cli::chat::describe_notice;
use crate::cli::context::{AppContext, SessionOverrides};

pub async fn run_say(
    context: &AppContext,
    overrides: &SessionOverrides,
    prompt: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: chitchat say <prompt>");
        std::process::exit(1);
    }

    let mut session = context.open_session(overrides)?;
    let outcome = session.send(&prompt).await?;

    for notice in &outcome.notices {
        if let Some(text) = describe_notice(notice) {
            eprintln!("{text}");
        }
    }
    println!("{}", outcome.reply.text);
    Ok(())
}
