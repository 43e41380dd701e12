//! Command implementations shared by the CLI

pub mod grade;
pub mod search;
pub mod util;

#[cfg(test)]
mod cli_integration_tests;
