//! Product configuration trait for CLI binaries
//!
//! Each binary built on this library implements the trait to configure the
//! scaffolding behavior: where boilerplates live, which registry to offer,
//! and what to print once a project is created.

use std::path::Path;

/// Configuration trait for different CLI products
///
/// Each product implements this trait to define:
/// - Product identity (name, display name, scaffold prefix)
/// - Boilerplate repository URL
/// - The boilerplate registry
/// - Post-setup instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for log prefix and scratch directory)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Prefix stripped from the target directory name when deriving the
    /// default project `name` (e.g. `lweb-`)
    fn scaffold_prefix(&self) -> &'static str;

    /// Default base URL boilerplate archives are fetched from
    fn default_repository_url(&self) -> &'static str;

    /// Environment variable name for overriding the repository URL
    fn repository_url_env(&self) -> &'static str;

    /// Registry document (YAML) listing the available boilerplates
    fn registry(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation;
    /// `cwd` is the directory the run was started from
    fn next_steps(&self, dir: &Path, cwd: &Path) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Scratch directory boilerplates are fetched into (cleared on every run)
    fn scratch_dir(&self) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}-boilerplate", self.name()))
    }
}

/// Default usage summary for npm-based boilerplates
pub fn npm_next_steps(dir: &Path, cwd: &Path) -> Vec<String> {
    let mut steps = Vec::new();

    if dir != cwd {
        steps.push(format!("cd {}", dir.display()));
    }
    steps.push("npm install".to_string());
    steps.push("npm start / npm run dev / npm test".to_string());

    steps
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub const REGISTRY: &str = r#"
name: lweb-init
version: 0.1.0
boilerplate:
  demo:
    package: boilerplates/demo
    description: demo boilerplate
"#;

    /// Product config used across unit tests
    #[derive(Clone)]
    pub struct TestConfig;

    impl ProductConfig for TestConfig {
        fn name(&self) -> &'static str {
            "lweb-init-test"
        }

        fn display_name(&self) -> &'static str {
            "lweb-init"
        }

        fn scaffold_prefix(&self) -> &'static str {
            "lweb-"
        }

        fn default_repository_url(&self) -> &'static str {
            "https://gitlab.example.com/boilerplates"
        }

        fn repository_url_env(&self) -> &'static str {
            "LWEB_INIT_TEST_REPOSITORY_URL"
        }

        fn registry(&self) -> &'static str {
            REGISTRY
        }

        fn next_steps(&self, dir: &Path, cwd: &Path) -> Vec<String> {
            npm_next_steps(dir, cwd)
        }
    }
}
