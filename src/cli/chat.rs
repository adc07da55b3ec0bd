//! Interactive line-based chat loop.

use std::error::Error;

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::context::{AppContext, SessionOverrides};
use crate::cli::prompt::{parse_confirmation, ConfirmationChoice};
use crate::cli::provider_list::render_provider_table;
use crate::core::chat::{ChatSession, SubmitError};
use crate::core::events::ChatEvent;
use crate::core::message::{Message, Sender};
use crate::core::settings::Verbosity;

const HELP_TEXT: &str = "\
Commands:
  /quick              Short replies
  /detailed           Longer, more thorough replies
  /provider [id]      Show or switch the provider
  /providers          List providers and key status
  /key <secret>       Store an API key for the current provider
  /clear              Delete the whole conversation (asks first)
  /history            Print the conversation so far
  /log [file]         Log the transcript to a file, or pause/resume logging
  /help               Show this help
  /quit               Leave chitchat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Quick,
    Detailed,
    Provider(Option<String>),
    Providers,
    Key(Option<String>),
    Clear,
    History,
    Log(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine<'a> {
    Blank,
    Message(&'a str),
    Command(SlashCommand),
}

pub fn parse_input(line: &str) -> InputLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputLine::Blank;
    }
    let Some(body) = trimmed.strip_prefix('/') else {
        return InputLine::Message(trimmed);
    };

    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    let command = match name.to_ascii_lowercase().as_str() {
        "quick" => SlashCommand::Quick,
        "detailed" => SlashCommand::Detailed,
        "provider" => SlashCommand::Provider(arg),
        "providers" => SlashCommand::Providers,
        "key" => SlashCommand::Key(arg),
        "clear" => SlashCommand::Clear,
        "history" => SlashCommand::History,
        "log" => SlashCommand::Log(arg),
        "help" | "?" => SlashCommand::Help,
        "quit" | "exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(name.to_string()),
    };
    InputLine::Command(command)
}

/// User-facing text for a side signal, if it needs one.
pub fn describe_notice(event: &ChatEvent) -> Option<String> {
    match event {
        ChatEvent::CredentialMissing {
            provider_id,
            provider_display_name,
        } => Some(format!(
            "🔑 No API key for {provider_display_name}. Run 'chitchat auth {provider_id}' or type /key <secret>."
        )),
        ChatEvent::BusyChanged(_) | ChatEvent::Reply(_) => None,
    }
}

pub fn format_message(message: &Message) -> String {
    format!("{}: {}", message.sender.label(), message.text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct ChatLoop {
    session: ChatSession,
    awaiting_clear_confirmation: bool,
}

pub async fn run_chat(
    context: &AppContext,
    overrides: &SessionOverrides,
) -> Result<(), Box<dyn Error>> {
    let session = context.open_session(overrides)?;
    let mut chat = ChatLoop {
        session,
        awaiting_clear_confirmation: false,
    };
    chat.print_banner();

    let mut lines = BufReader::new(io::stdin()).lines();
    show_prompt().await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if chat.handle_line(&line) == Flow::Quit {
                    break;
                }
                if !chat.session.is_busy() {
                    show_prompt().await?;
                }
            }
            Some(event) = chat.session.next_event() => {
                if chat.handle_event(&event) {
                    show_prompt().await?;
                }
            }
        }
    }

    if chat.session.is_busy() {
        println!("Waiting for the last reply...");
    }
    while chat.session.is_busy() {
        let Some(event) = chat.session.next_event().await else {
            break;
        };
        chat.handle_event(&event);
    }
    Ok(())
}

async fn show_prompt() -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    stdout.write_all(b"> ").await?;
    stdout.flush().await?;
    Ok(())
}

impl ChatLoop {
    fn print_banner(&self) {
        let profile = self.session.provider();
        println!(
            "💬 Chitchat: talking to {} ({} mode). Type /help for commands.",
            profile.display_name,
            self.session.settings().verbosity.label()
        );
        if profile.requires_auth && !self.session.credentials().has_credential(&profile.id) {
            println!(
                "No API key stored for {}. Replies will be canned until you add one with /key.",
                profile.display_name
            );
        }
        let history = self.session.messages();
        if !history.is_empty() {
            println!("({} earlier messages, /history to show them)", history.len());
        }
        if self.session.logging().is_active() {
            println!("Transcript logging: {}", self.session.logging().get_status_string());
        }
    }

    /// Returns whether the prompt should be shown again.
    fn handle_event(&mut self, event: &ChatEvent) -> bool {
        match event {
            ChatEvent::Reply(_) => {
                match self.session.messages().last() {
                    Some(reply) if reply.sender == Sender::Bot => {
                        println!("{}", format_message(reply))
                    }
                    _ => println!("⚠️ {}", SubmitError::Disconnected),
                }
                true
            }
            ChatEvent::BusyChanged(_) => false,
            other => {
                if let Some(text) = describe_notice(other) {
                    println!("{text}");
                }
                false
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        if self.awaiting_clear_confirmation {
            self.awaiting_clear_confirmation = false;
            match parse_confirmation(line) {
                Ok(ConfirmationChoice::Yes) => match self.session.clear() {
                    Ok(()) => println!("Conversation cleared."),
                    Err(err) => println!("⏳ {err}; nothing was cleared."),
                },
                _ => println!("Cancelled."),
            }
            return Flow::Continue;
        }

        match parse_input(line) {
            InputLine::Blank => Flow::Continue,
            InputLine::Message(text) => {
                match self.session.submit(text) {
                    Ok(_) => println!("…"),
                    Err(SubmitError::Busy) => println!("⏳ {}", SubmitError::Busy),
                    Err(SubmitError::Empty | SubmitError::Disconnected) => {}
                }
                Flow::Continue
            }
            InputLine::Command(command) => self.handle_command(command),
        }
    }

    fn handle_command(&mut self, command: SlashCommand) -> Flow {
        match command {
            SlashCommand::Quick => {
                self.session.set_verbosity(Verbosity::Quick);
                println!("Quick mode.");
            }
            SlashCommand::Detailed => {
                self.session.set_verbosity(Verbosity::Detailed);
                println!("Detailed mode.");
            }
            SlashCommand::Provider(None) => {
                let profile = self.session.provider();
                println!(
                    "Current provider: {} ({}), model {}",
                    profile.display_name, profile.id, profile.model
                );
            }
            SlashCommand::Provider(Some(id)) => match self.session.select_provider(&id) {
                Ok(profile) => {
                    println!("Switched to {}.", profile.display_name);
                    if profile.requires_auth
                        && !self.session.credentials().has_credential(&profile.id)
                    {
                        println!("No API key stored yet. Use /key <secret>.");
                    }
                }
                Err(err) => println!("❌ {err}. Try /providers."),
            },
            SlashCommand::Providers => {
                let selected = self.session.settings().selected_provider.clone();
                print!(
                    "{}",
                    render_provider_table(self.session.credentials(), &selected)
                );
            }
            SlashCommand::Key(None) => println!("Usage: /key <secret>"),
            SlashCommand::Key(Some(secret)) => {
                let name = &self.session.provider().display_name;
                if self.session.set_api_key(&secret) {
                    println!("✓ Key stored for {name}");
                } else {
                    println!("❌ Could not store the key for {name}");
                }
            }
            SlashCommand::Clear => {
                if self.session.is_busy() {
                    println!("⏳ Wait for the reply before clearing the conversation.");
                } else if self.session.messages().is_empty() {
                    println!("Nothing to clear.");
                } else {
                    self.awaiting_clear_confirmation = true;
                    println!("Delete the whole conversation? (y/N)");
                }
            }
            SlashCommand::History => {
                if self.session.messages().is_empty() {
                    println!("No messages yet.");
                }
                for message in self.session.messages() {
                    println!("{}", format_message(message));
                }
            }
            SlashCommand::Log(path) => {
                let logging = self.session.logging_mut();
                let result = match path {
                    Some(path) => logging.set_log_file(path),
                    None => logging.toggle_logging(),
                };
                match result {
                    Ok(status) => println!("{status}"),
                    Err(err) => println!("❌ {err}"),
                }
            }
            SlashCommand::Help => println!("{HELP_TEXT}"),
            SlashCommand::Quit => return Flow::Quit,
            SlashCommand::Unknown(name) => {
                println!("Unknown command: /{name}. Type /help for commands.")
            }
        }
        Flow::Continue
    }
}
