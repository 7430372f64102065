//! Scaffolder Core - Shared library for boilerplate scaffolding CLIs
//!
//! This library turns a boilerplate (a template tree fetched from a remote
//! archive host) into a new project directory. It is designed to be used by
//! CLI binaries that share the same scaffolding logic but have different
//! product configurations.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Text/binary classification, placeholder
//!   substitution, variable collection, staged tree copying, fetching
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait, boilerplate
//!   catalog, target resolution and the `Pipeline` tying them together
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompter (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompter and `run`
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffolder_core::{InitArgs, Logger, Pipeline, ScriptedPrompter};
//!
//! let prompter = ScriptedPrompter::new([]);
//! let args = InitArgs {
//!     directory: Some("lweb-shop".into()),
//!     package: Some("boilerplates/egg-backend".into()),
//!     silent: true,
//!     ..Default::default()
//! };
//! let report = Pipeline::new(&MyConfig, &prompter, Logger::new("my-init"))?
//!     .run(&args)
//!     .await?;
//! ```

pub mod catalog;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod product;
pub mod prompt;
pub mod target;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use catalog::{group_by, select_boilerplate, BoilerplateDescriptor, Catalog};
pub use error::ScaffoldError;
pub use logger::Logger;
pub use pipeline::{InitArgs, InitReport, Pipeline};
pub use product::ProductConfig;
pub use prompt::{Answer, Choice, InputQuestion, Prompter, ScriptedPrompter};
pub use target::{resolve_target_directory, TargetDirectoryState};
pub use templates::{
    collect_variables, materialize, render, BoilerplateFetcher, TemplateSource, VariableScope,
};

#[cfg(feature = "tui")]
pub use tui::run;
