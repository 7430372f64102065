//! Per-boilerplate question schema (`vars.yaml`)
//!
//! ```yaml
//! name:
//!   message: project name
//! description:
//!   desc: project description
//!   default: a lilith web project
//! package_name:
//!   message: npm package name
//!   default: "@lilith/{{ name }}"
//!   filter: kebab-case
//! ```
//!
//! A string default containing placeholders is computed: it is rendered
//! against the answers collected before it.

use super::engine::{self, VariableScope};
use crate::prompt::Filter;
use anyhow::{Context, Result};
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Schema file name at the template root
pub const SCHEMA_FILE: &str = "vars.yaml";

/// Default evaluated against the scope accumulated so far
pub type ComputedDefault = Arc<dyn Fn(&VariableScope) -> String + Send + Sync>;

#[derive(Clone)]
pub enum DefaultValue {
    Literal(String),
    Computed(ComputedDefault),
}

impl DefaultValue {
    pub fn computed(f: impl Fn(&VariableScope) -> String + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    /// The literal value, if this default does not depend on other answers
    pub fn literal(&self) -> Option<&str> {
        match self {
            DefaultValue::Literal(value) => Some(value.as_str()),
            DefaultValue::Computed(_) => None,
        }
    }

    pub fn evaluate(&self, scope: &VariableScope) -> String {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Computed(f) => f(scope),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// One variable to collect
#[derive(Clone)]
pub struct Question {
    pub message: String,
    pub default: Option<DefaultValue>,
    pub filter: Option<Filter>,
}

impl Question {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: None,
            filter: None,
        }
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("message", &self.message)
            .field("default", &self.default)
            .field("filter", &self.filter.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Questions keyed by variable name, in declaration order
pub type QuestionSchema = IndexMap<String, Question>;

/// State a computed schema may inspect
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    pub target_dir: &'a Path,
    pub template_dir: &'a Path,
    pub silent: bool,
}

pub type SchemaFn = Box<dyn FnOnce(&SchemaContext<'_>) -> QuestionSchema + Send>;

/// A schema as loaded: either ready to use or built on demand
pub enum SchemaSource {
    Static(QuestionSchema),
    Computed(SchemaFn),
}

impl SchemaSource {
    pub fn computed(f: impl FnOnce(&SchemaContext<'_>) -> QuestionSchema + Send + 'static) -> Self {
        Self::Computed(Box::new(f))
    }

    /// Produce the concrete mapping
    pub fn resolve(self, ctx: &SchemaContext<'_>) -> QuestionSchema {
        match self {
            SchemaSource::Static(schema) => schema,
            SchemaSource::Computed(f) => f(ctx),
        }
    }
}

/// Where question schemas come from
pub trait SchemaLoader: Send + Sync {
    /// `Ok(None)` when the template declares no schema
    fn load(&self, template_dir: &Path) -> Result<Option<SchemaSource>>;
}

/// Loads [`SCHEMA_FILE`] from the template root
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSchemaLoader;

impl SchemaLoader for YamlSchemaLoader {
    fn load(&self, template_dir: &Path) -> Result<Option<SchemaSource>> {
        let path = template_dir.join(SCHEMA_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let schema = parse_schema(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(SchemaSource::Static(schema)))
    }
}

/// Built-in answer transforms usable from YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamedFilter {
    Trim,
    Lowercase,
    Uppercase,
    KebabCase,
    SnakeCase,
    CamelCase,
    PascalCase,
}

impl NamedFilter {
    pub fn apply(self, value: &str) -> String {
        match self {
            NamedFilter::Trim => value.trim().to_string(),
            NamedFilter::Lowercase => value.to_lowercase(),
            NamedFilter::Uppercase => value.to_uppercase(),
            NamedFilter::KebabCase => value.to_kebab_case(),
            NamedFilter::SnakeCase => value.to_snake_case(),
            NamedFilter::CamelCase => value.to_lower_camel_case(),
            NamedFilter::PascalCase => value.to_upper_camel_case(),
        }
    }

    pub fn into_filter(self) -> Filter {
        Arc::new(move |value: &str| self.apply(value))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawQuestion {
    #[serde(default, alias = "description", alias = "desc")]
    message: Option<String>,

    #[serde(default)]
    default: Option<serde_yaml::Value>,

    #[serde(default)]
    filter: Option<NamedFilter>,
}

/// Parse schema YAML into questions
pub fn parse_schema(content: &str) -> Result<QuestionSchema> {
    if content.trim().is_empty() {
        return Ok(QuestionSchema::new());
    }

    let raw: IndexMap<String, Option<RawQuestion>> =
        serde_yaml::from_str(content).context("Invalid question schema")?;

    raw.into_iter()
        .map(|(key, question)| {
            let question = question.unwrap_or_default();
            let default = match question.default {
                Some(value) => default_from_yaml(&key, value)?,
                None => None,
            };
            let parsed = Question {
                message: question.message.unwrap_or_else(|| key.clone()),
                default,
                filter: question.filter.map(NamedFilter::into_filter),
            };
            Ok::<_, anyhow::Error>((key, parsed))
        })
        .collect()
}

fn default_from_yaml(key: &str, value: serde_yaml::Value) -> Result<Option<DefaultValue>> {
    use serde_yaml::Value;

    // null, false, 0 and "" all mean "no default"
    let default = match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some(DefaultValue::Literal("true".to_string())),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(DefaultValue::Literal(n.to_string())),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) if engine::has_placeholders(&s) => Some(DefaultValue::computed(
            move |scope: &VariableScope| engine::render(&s, scope),
        )),
        Value::String(s) => Some(DefaultValue::Literal(s)),
        other => anyhow::bail!(
            "default for '{}' must be a scalar, got {}",
            key,
            serde_yaml::to_string(&other).unwrap_or_default().trim()
        ),
    };
    Ok(default)
}
