//! Boilerplate fetching, variable collection and materialization
//!
//! This module provides:
//! - Text/binary classification of template files
//! - `{{ key }}` placeholder substitution
//! - Question schemas and variable collection
//! - Staged copying of a template tree into the target directory
//! - Boilerplate fetching from remote archives or local directories

pub mod classify;
pub mod collector;
pub mod engine;
pub mod fetcher;
pub mod materializer;
pub mod schema;

pub use collector::{collect_variables, default_project_name, CollectOptions};
pub use engine::{render, render_bytes, VariableScope};
pub use fetcher::{BoilerplateFetcher, TemplateSource};
pub use materializer::{materialize, SourceFile, StagedWrite, WriteBatch};
pub use schema::{
    DefaultValue, Question, QuestionSchema, SchemaContext, SchemaLoader, SchemaSource,
    YamlSchemaLoader, SCHEMA_FILE,
};
