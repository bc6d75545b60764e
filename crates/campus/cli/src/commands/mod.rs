//! Subcommand implementations. Each returns the text to print.

pub mod accounts;
pub mod resolve;
pub mod seeds;
