//! Chitchat is a terminal chat client that relays each message to one of
//! several hosted LLM providers and always answers, falling back to a canned
//! reply when the provider cannot.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the provider registry, credential and conversation
//!   persistence, per-session settings, and the reply dispatcher.
//! - [`api`] defines the request/response shapes of each provider API style.
//! - [`cli`] parses arguments and runs the interactive loop and one-shot
//!   commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod utils;
