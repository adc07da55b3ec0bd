pub mod builtin_providers;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod dispatcher;
pub mod events;
pub mod message;
pub mod settings;
pub mod store;
