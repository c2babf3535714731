//! Chat-command side of the config subsystem.

pub mod config;
pub mod parse;
mod render;

pub use config::ConfigCommand;
pub use parse::{ArgumentParser, MentionParser};
