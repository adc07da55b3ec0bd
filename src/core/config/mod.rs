pub mod data;
pub mod io;


pub use data::{path_display, Config, CredentialBackend};
pub use io::ConfigError;
