//! CLI library for castctl.

pub mod commands;
pub mod parser;

pub use commands::{Commands, ServeArgs};
pub use parser::Cli;
