//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod auth;
pub mod chat;
pub mod context;
pub mod history;
pub mod prompt;
pub mod provider_list;
pub mod say;
pub mod settings;

#[cfg(test)]
mod tests;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::cli::auth::{run_auth, run_deauth};
use crate::cli::chat::run_chat;
use crate::cli::context::{AppContext, SessionOverrides};
use crate::cli::history::{clear_history, print_history};
use crate::cli::provider_list::{list_providers, select_provider};
use crate::cli::say::run_say;
use crate::cli::settings::{run_set, run_unset};

#[derive(Parser)]
#[command(name = "chitchat")]
#[command(version)]
#[command(about = "A terminal chat client for hosted LLM providers")]
#[command(
    long_about = "Chitchat relays your messages to one of several hosted LLM providers \
(Hugging Face, Groq, Together.ai, OpenRouter, Gemini) and always answers: when a \
provider is unreachable or has no API key, a canned reply stands in.\n\n\
Conversation history, the selected provider and API keys persist between runs.\n\n\
Authentication:\n\
  Use 'chitchat auth' to store an API key for a provider.\n\n\
Environment Variables:\n\
  CHITCHAT_LOG      Diagnostic log filter, e.g. 'debug' (default: warn)\n\n\
Commands:\n\
  /help             Show all chat commands\n\
  /quick, /detailed Switch reply length\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Provider to use for this run (not saved)
    #[arg(short = 'p', long, global = true, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Ask for detailed replies
    #[arg(short = 'd', long, global = true)]
    pub detailed: bool,

    /// Enable logging to specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

impl Args {
    fn overrides(&self) -> SessionOverrides {
        SessionOverrides {
            provider: self.provider.clone(),
            detailed: self.detailed,
            log_file: self.log.clone(),
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message and print the reply
    Say {
        /// Message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// List providers, their key status and the current selection
    Providers,
    /// Save the provider used by future sessions
    Select {
        /// Provider id, e.g. groq
        provider: String,
    },
    /// Store an API key for a provider
    Auth {
        /// Provider id (prompted for when omitted)
        provider: Option<String>,
    },
    /// Remove a stored API key
    Deauth {
        /// Provider id (prompted for when omitted)
        provider: Option<String>,
    },
    /// Print the saved conversation
    History,
    /// Delete the saved conversation
    Clear {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show or change saved settings in config.toml
    Set {
        /// Setting to change (lists all settings when omitted)
        key: Option<String>,
        /// New value; `endpoint` takes a provider id and a URL
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a saved setting to its default
    Unset {
        /// Setting to reset
        key: String,
        /// Provider id, for `endpoint`
        value: Option<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let overrides = args.overrides();

    let command = match args.command {
        Some(Commands::Set { key, value }) => return run_set(key, value),
        Some(Commands::Unset { key, value }) => return run_unset(key, value),
        other => other.unwrap_or(Commands::Chat),
    };
    let context = AppContext::load()?;

    match command {
        Commands::Chat => run_chat(&context, &overrides).await,
        Commands::Say { prompt } => run_say(&context, &overrides, prompt).await,
        Commands::Providers => list_providers(&context),
        Commands::Select { provider } => select_provider(&context, &provider),
        Commands::Auth { provider } => {
            if let Err(e) = run_auth(&context, provider.or(args.provider)) {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth { provider } => {
            if let Err(e) = run_deauth(&context, provider.or(args.provider)) {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::History => print_history(&context),
        Commands::Clear { yes } => clear_history(&context, yes),
        Commands::Set { .. } | Commands::Unset { .. } => Ok(()),
    }
}
