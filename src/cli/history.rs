//! `history` and `clear`.

use std::error::Error;

use crate::cli::chat::format_message;
use crate::cli::context::AppContext;
use crate::cli::prompt::confirm;
use crate::core::message::Message;

pub fn print_history(context: &AppContext) -> Result<(), Box<dyn Error>> {
    let conversation = context.conversation();
    if conversation.is_empty() {
        println!("No messages yet.");
        return Ok(());
    }
    print!("{}", render_history(conversation.messages()));
    Ok(())
}

pub fn clear_history(context: &AppContext, assume_yes: bool) -> Result<(), Box<dyn Error>> {
    let mut conversation = context.conversation();
    if conversation.is_empty() {
        println!("Nothing to clear.");
        return Ok(());
    }

    let question = format!("Delete all {} messages?", conversation.len());
    if !assume_yes && !confirm(&question)? {
        println!("Cancelled.");
        return Ok(());
    }

    conversation.clear();
    println!("✅ Conversation cleared.");
    Ok(())
}

pub fn render_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| {
            format!(
                "[{}] {}\n",
                message.timestamp.format("%Y-%m-%d %H:%M"),
                format_message(message)
            )
        })
        .collect()
}
