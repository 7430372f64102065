//! Variable collection for a fetched boilerplate

use super::engine::VariableScope;
use super::schema::{DefaultValue, QuestionSchema, SchemaContext, SchemaLoader};
use crate::logger::Logger;
use crate::prompt::{InputQuestion, Prompter};
use anyhow::Result;
use std::path::Path;

/// Inputs for [`collect_variables`]
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions<'a> {
    pub target_dir: &'a Path,
    pub template_dir: &'a Path,
    /// Take every default instead of asking
    pub silent: bool,
    /// Stripped from the target directory name for the `name` default
    pub scaffold_prefix: &'a str,
}

/// Build the variable scope for a boilerplate.
///
/// A missing schema yields an empty scope. A schema that fails to load is
/// reported as a warning and also yields an empty scope.
pub fn collect_variables(
    loader: &dyn SchemaLoader,
    options: &CollectOptions<'_>,
    prompter: &dyn Prompter,
    logger: &Logger,
) -> Result<VariableScope> {
    let source = match loader.load(options.template_dir) {
        Ok(Some(source)) => source,
        Ok(None) => return Ok(VariableScope::new()),
        Err(e) => {
            logger.warn(format!(
                "load boilerplate config got trouble, skip and use defaults, {:#}",
                e
            ));
            return Ok(VariableScope::new());
        }
    };

    let ctx = SchemaContext {
        target_dir: options.target_dir,
        template_dir: options.template_dir,
        silent: options.silent,
    };
    let mut schema = source.resolve(&ctx);

    if let Some(name) = schema.get_mut("name") {
        let unset = match &name.default {
            None => true,
            Some(default) => default.literal() == Some(""),
        };
        if unset {
            name.default = Some(DefaultValue::Literal(default_project_name(
                options.target_dir,
                options.scaffold_prefix,
            )));
        }
    }

    logger.info("collecting boilerplate config...");

    if options.silent {
        let scope = resolve_silently(&schema);
        logger.info(format!("use default due to --silent, {:?}", scope));
        Ok(scope)
    } else {
        ask(&schema, prompter)
    }
}

/// Target directory name without the scaffold prefix
pub fn default_project_name(target_dir: &Path, prefix: &str) -> String {
    let base = target_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match base.strip_prefix(prefix) {
        Some(stripped) if !prefix.is_empty() => stripped.to_string(),
        _ => base,
    }
}

/// Evaluate defaults in declaration order; computed defaults see the
/// answers resolved before them
pub fn resolve_silently(schema: &QuestionSchema) -> VariableScope {
    let mut scope = VariableScope::new();
    for (key, question) in schema {
        let value = question
            .default
            .as_ref()
            .map(|d| d.evaluate(&scope))
            .unwrap_or_default();
        let value = match &question.filter {
            Some(filter) => filter(&value),
            None => value,
        };
        scope.insert(key.clone(), value);
    }
    scope
}

/// Ask every question as one batch.
///
/// Only literal defaults are offered; computed defaults are not evaluated
/// interactively.
fn ask(schema: &QuestionSchema, prompter: &dyn Prompter) -> Result<VariableScope> {
    let questions: Vec<InputQuestion> = schema
        .iter()
        .map(|(key, question)| {
            let mut input = InputQuestion::new(key, &question.message);
            if let Some(literal) = question.default.as_ref().and_then(|d| d.literal()) {
                input = input.with_default(literal);
            }
            if let Some(filter) = &question.filter {
                input = input.with_filter(filter.clone());
            }
            input
        })
        .collect();

    let mut answers = prompter.inputs(&questions)?;

    Ok(schema
        .keys()
        .map(|key| {
            let value = answers.swap_remove(key).unwrap_or_default();
            (key.clone(), value)
        })
        .collect())
}
