//! Scaffolding pipeline
//!
//! resolve target -> pick boilerplate -> fetch -> collect variables ->
//! materialize -> usage report. Each step finishes before the next starts and
//! the first error ends the run.

use crate::catalog::{select_boilerplate, Catalog};
use crate::logger::Logger;
use crate::product::ProductConfig;
use crate::prompt::Prompter;
use crate::target::resolve_target_directory;
use crate::templates::{
    collect_variables, materialize, BoilerplateFetcher, CollectOptions, SchemaLoader,
    VariableScope, YamlSchemaLoader,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Options for one `init` run
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Positional target directory
    pub directory: Option<String>,

    /// `--dir`, used when no positional directory is given
    pub dir: Option<String>,

    /// `--type`: registry key of the boilerplate
    pub boilerplate_type: Option<String>,

    /// `--package`: fetch this package and skip the catalog
    pub package: Option<String>,

    /// Accept a non-empty target directory
    pub force: bool,

    /// Take variable defaults instead of asking
    pub silent: bool,

    /// Local directory to fetch boilerplates from instead of the remote host
    pub template_dir: Option<PathBuf>,

    /// Registry file to use instead of the built-in one
    pub registry: Option<PathBuf>,
}

impl InitArgs {
    /// Directory hint: positional argument first, then `--dir`
    pub fn target_hint(&self) -> &str {
        self.directory
            .as_deref()
            .or(self.dir.as_deref())
            .unwrap_or("")
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct InitReport {
    pub target_dir: PathBuf,
    pub package: String,
    pub scope: VariableScope,
    pub files: Vec<PathBuf>,
    pub next_steps: Vec<String>,
}

/// Runs the scaffolding steps for a product
pub struct Pipeline<'a, C: ProductConfig> {
    config: &'a C,
    prompter: &'a dyn Prompter,
    logger: Logger,
    schema_loader: Box<dyn SchemaLoader>,
    cwd: PathBuf,
    scratch_dir: PathBuf,
}

impl<'a, C: ProductConfig> Pipeline<'a, C> {
    pub fn new(config: &'a C, prompter: &'a dyn Prompter, logger: Logger) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Ok(Self {
            config,
            prompter,
            logger,
            schema_loader: Box::new(YamlSchemaLoader),
            cwd,
            scratch_dir: config.scratch_dir(),
        })
    }

    /// Resolve relative target hints against `cwd` instead of the process cwd
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }

    pub fn with_schema_loader(mut self, loader: Box<dyn SchemaLoader>) -> Self {
        self.schema_loader = loader;
        self
    }

    pub async fn run(&self, args: &InitArgs) -> Result<InitReport> {
        let target_dir = resolve_target_directory(
            &self.cwd,
            args.target_hint(),
            args.force,
            self.prompter,
            &self.logger,
        )?;

        let package = match &args.package {
            Some(package) => package.clone(),
            None => self.choose_package(args)?,
        };

        let template_dir = self.fetch(args, &package).await?;

        let scope = collect_variables(
            self.schema_loader.as_ref(),
            &CollectOptions {
                target_dir: &target_dir,
                template_dir: &template_dir,
                silent: args.silent,
                scaffold_prefix: self.config.scaffold_prefix(),
            },
            self.prompter,
            &self.logger,
        )?;

        let files = materialize(&template_dir, &target_dir, &scope, &self.logger).await?;

        let next_steps = self.config.next_steps(&target_dir, &self.cwd);
        self.print_usage(&next_steps);

        Ok(InitReport {
            target_dir,
            package,
            scope,
            files,
            next_steps,
        })
    }

    fn choose_package(&self, args: &InitArgs) -> Result<String> {
        let catalog = match &args.registry {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::from_yaml(self.config.registry())?,
        };
        let boilerplate =
            select_boilerplate(&catalog, args.boilerplate_type.as_deref(), self.prompter)?;
        self.logger.info(format!(
            "use boilerplate: {}({})",
            boilerplate.name, boilerplate.package
        ));
        Ok(boilerplate.package.clone())
    }

    async fn fetch(&self, args: &InitArgs, package: &str) -> Result<PathBuf> {
        let fetcher = match &args.template_dir {
            Some(path) => BoilerplateFetcher::from_local(path.clone(), self.config.user_agent()),
            None => BoilerplateFetcher::from_config(self.config)?,
        };

        self.logger.info(format!("downloading {}", package));
        let template_dir = fetcher.fetch(package, &self.scratch_dir).await?;
        self.logger
            .info(format!("download to {}", template_dir.display()));
        Ok(template_dir)
    }

    fn print_usage(&self, steps: &[String]) {
        let mut usage = String::from("usage:");
        for step in steps {
            usage.push_str("\n  - ");
            usage.push_str(step);
        }
        self.logger.success(usage);
    }
}
