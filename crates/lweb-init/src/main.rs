//! lweb-init - Project scaffolding from Lilith web boilerplates

use anyhow::Result;
use clap::Parser;
use scaffolder_core::product::npm_next_steps;
use scaffolder_core::{InitArgs, ProductConfig};
use std::path::{Path, PathBuf};

/// lweb-init product configuration
#[derive(Clone)]
pub struct LwebConfig;

impl ProductConfig for LwebConfig {
    fn name(&self) -> &'static str {
        "lweb-init"
    }

    fn display_name(&self) -> &'static str {
        "lweb-init"
    }

    fn scaffold_prefix(&self) -> &'static str {
        "lweb-"
    }

    fn default_repository_url(&self) -> &'static str {
        "https://gitlab.lilith.com/lweb/boilerplates/-/archive"
    }

    fn repository_url_env(&self) -> &'static str {
        "LWEB_INIT_REPOSITORY_URL"
    }

    fn registry(&self) -> &'static str {
        include_str!("../boilerplates.yaml")
    }

    fn next_steps(&self, dir: &Path, cwd: &Path) -> Vec<String> {
        npm_next_steps(dir, cwd)
    }
}

#[derive(Parser, Debug)]
#[command(name = "lweb-init")]
#[command(about = "CLI for scaffolding Lilith web projects from boilerplates")]
#[command(version)]
pub struct Args {
    /// Project directory to create
    pub directory: Option<String>,

    /// Project directory, used when no positional directory is given
    #[arg(long)]
    pub dir: Option<String>,

    /// Boilerplate type from the registry
    #[arg(long = "type")]
    pub boilerplate_type: Option<String>,

    /// Boilerplate package to fetch directly, skipping the registry
    #[arg(long)]
    pub package: Option<String>,

    /// Scaffold into a non-empty directory
    #[arg(short, long)]
    pub force: bool,

    /// Use boilerplate defaults instead of asking
    #[arg(long)]
    pub silent: bool,

    /// Local directory to use for boilerplates instead of fetching from remote (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Registry file to use instead of the built-in one
    #[arg(long)]
    pub registry: Option<PathBuf>,
}

impl From<Args> for InitArgs {
    fn from(args: Args) -> Self {
        InitArgs {
            directory: args.directory,
            dir: args.dir,
            boilerplate_type: args.boilerplate_type,
            package: args.package,
            force: args.force,
            silent: args.silent,
            template_dir: args.template_dir,
            registry: args.registry,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = LwebConfig;

    let result = scaffolder_core::run(&config, args.into()).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    // Failures are already reported by the logger
    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
