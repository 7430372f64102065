//! Boilerplate fetching from a remote archive host or a local directory
//!
//! - Remote: downloads `<base>/<package>.zip` and extracts it
//! - Local: copies `<dir>/<package>` (for developing boilerplates)
//!
//! Either way the tree lands in a scratch directory that is wiped at the
//! start of every fetch.

use super::materializer::confined_join;
use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use url::Url;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Boilerplate source - either remote URL or local directory
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    /// Create a remote source from a product config (env var wins over the default)
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.repository_url_env())
            .unwrap_or_else(|_| config.default_repository_url().to_string());
        let url =
            Url::parse(&url_str).with_context(|| format!("Invalid repository URL: {}", url_str))?;
        Ok(Self::Remote(url))
    }

    /// Create a local boilerplate source from a path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// Boilerplate fetcher - retrieves a package's tree into a scratch directory
pub struct BoilerplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
}

impl BoilerplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a fetcher from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let source = TemplateSource::from_config(config)?;
        Ok(Self::new(source, config.user_agent()))
    }

    /// Create a fetcher for local boilerplates
    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(TemplateSource::local(path), user_agent)
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// URL of a package archive: each `/`-separated package segment becomes a
    /// path segment, the last one gets `.zip`
    pub fn archive_url(base: &Url, package: &str) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?;
            segments.pop_if_empty();
            let parts: Vec<&str> = package.split('/').filter(|s| !s.is_empty()).collect();
            for (i, part) in parts.iter().enumerate() {
                if i + 1 == parts.len() {
                    segments.push(&format!("{}.zip", part));
                } else {
                    segments.push(part);
                }
            }
        }
        Ok(url)
    }

    /// Fetch `package` into `scratch_dir/<package>` and return that path.
    ///
    /// `scratch_dir` is removed and recreated first. Concurrent fetches into
    /// the same scratch directory clobber each other.
    pub async fn fetch(&self, package: &str, scratch_dir: &Path) -> Result<PathBuf> {
        self.fetch_inner(package, scratch_dir)
            .await
            .map_err(|e| {
                ScaffoldError::Fetch {
                    package: package.to_string(),
                    reason: format!("{:#}", e),
                }
                .into()
            })
    }

    async fn fetch_inner(&self, package: &str, scratch_dir: &Path) -> Result<PathBuf> {
        if fs::try_exists(scratch_dir).await.unwrap_or(false) {
            fs::remove_dir_all(scratch_dir)
                .await
                .with_context(|| format!("Failed to clear {}", scratch_dir.display()))?;
        }
        let dest = confined_join(scratch_dir, package)?;
        fs::create_dir_all(&dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        match &self.source {
            TemplateSource::Remote(base_url) => {
                let url = Self::archive_url(base_url, package)?;
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to download {}", url))?;

                if !response.status().is_success() {
                    anyhow::bail!("Failed to download {}: HTTP {}", url, response.status());
                }

                let bytes = response.bytes().await?;
                extract_zip(&bytes, &dest)?;
            }
            TemplateSource::Local(root) => {
                let src = confined_join(root, package)?;
                if !src.is_dir() {
                    anyhow::bail!("Boilerplate directory not found: {}", src.display());
                }
                copy_tree(&src, &dest)?;
            }
        }

        let git_dir = dest.join(".git");
        if git_dir.is_dir() {
            fs::remove_dir_all(&git_dir)
                .await
                .with_context(|| format!("Failed to remove {}", git_dir.display()))?;
        }

        Ok(dest)
    }
}

/// Extract an archive into `dest`, dropping a single wrapping directory
/// (`repo-main/...`) if every entry lives under one
pub fn extract_zip(zip_bytes: &[u8], dest: &Path) -> Result<()> {
    let mut archive =
        ZipArchive::new(Cursor::new(zip_bytes)).context("Failed to read boilerplate archive")?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let name = file
            .enclosed_name()
            .ok_or_else(|| anyhow::anyhow!("Unsafe path in archive: {}", file.name()))?;
        entries.push((i, name, file.is_dir()));
    }

    let wrapper = common_root(
        entries
            .iter()
            .map(|(_, name, is_dir)| (name.as_path(), *is_dir)),
    );

    for (i, name, is_dir) in entries {
        let relative = match &wrapper {
            Some(root) => name
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| name.clone()),
            None => name,
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let out = dest.join(&relative);
        if is_dir {
            std::fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            continue;
        }

        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut contents = Vec::new();
        archive.by_index(i)?.read_to_end(&mut contents)?;
        std::fs::write(&out, &contents)
            .with_context(|| format!("Failed to write {}", out.display()))?;
    }

    Ok(())
}

/// First path component shared by all entries, if every file is nested below it
fn common_root<'a>(entries: impl Iterator<Item = (&'a Path, bool)>) -> Option<PathBuf> {
    let mut root: Option<&OsStr> = None;
    for (name, is_dir) in entries {
        let mut components = name.components();
        let first = match components.next() {
            Some(Component::Normal(first)) => first,
            _ => return None,
        };
        if !is_dir && components.next().is_none() {
            return None;
        }
        match root {
            None => root = Some(first),
            Some(r) if r == first => {}
            Some(_) => return None,
        }
    }
    root.map(PathBuf::from)
}

/// Recursively copy a directory tree
fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let out = dest.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
        } else if entry.path().is_file() {
            std::fs::copy(entry.path(), &out)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}
