//! Terminal front end: a cliclack-backed [`Prompter`](crate::prompt::Prompter)
//! and the `run` entry point used by the binaries.
//!
//! Only compiled with the `tui` feature.

mod prompts;

pub use prompts::{run, CliclackPrompter};
