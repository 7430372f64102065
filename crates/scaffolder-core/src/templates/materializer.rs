//! Copy a fetched boilerplate tree into the target directory
//!
//! Every file is read and transformed first; nothing touches the target until
//! the whole tree has been staged. The commit then writes file by file (temp
//! file + rename), so each file is either old or new, but a failure halfway
//! leaves the files flushed before it in place.

use super::classify;
use super::engine::{self, VariableScope};
use super::schema::SCHEMA_FILE;
use crate::error::ScaffoldError;
use crate::logger::Logger;
use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// A file of the boilerplate tree
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub relative_path: PathBuf,
    pub raw_bytes: Vec<u8>,
    pub is_text: bool,
}

/// A pending write into the target directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedWrite {
    pub target_path: PathBuf,
    pub final_bytes: Vec<u8>,
}

/// Writes staged for one commit
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<StagedWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, write: StagedWrite) {
        self.writes.push(write);
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[StagedWrite] {
        &self.writes
    }

    /// Flush every staged write, in staging order. Not atomic across files.
    pub async fn commit(self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.writes.len());
        for write in self.writes {
            write_file(&write.target_path, &write.final_bytes).await?;
            written.push(write.target_path);
        }
        Ok(written)
    }
}

/// Replace a single file through a sibling temp file
async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("No parent directory for {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("Failed to write file: {}", path.display()));
    }
    Ok(())
}

/// List every file under `template_dir` (dotfiles included), sorted by path
pub fn enumerate_files(template_dir: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(template_dir).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("Failed to walk template {}", template_dir.display()))?;
        if entry.file_type().is_dir() || !entry.path().is_file() {
            continue;
        }

        let relative_path = entry
            .path()
            .strip_prefix(template_dir)
            .with_context(|| format!("{} is outside the template", entry.path().display()))?
            .to_path_buf();
        let raw_bytes = std::fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        let is_text = classify::is_text(&relative_path, &raw_bytes);

        files.push(SourceFile {
            relative_path,
            raw_bytes,
            is_text,
        });
    }
    Ok(files)
}

/// Join a templated relative path onto `target_dir`, refusing anything that
/// would leave it
pub fn confined_join(target_dir: &Path, relative: &str) -> Result<PathBuf> {
    let mut path = target_dir.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ScaffoldError::PathEscape(target_dir.join(relative)).into());
            }
        }
    }
    if depth == 0 {
        return Err(ScaffoldError::PathEscape(target_dir.join(relative)).into());
    }
    Ok(path)
}

/// Compute the write for one source file
pub fn stage_file(
    file: &SourceFile,
    target_dir: &Path,
    scope: &VariableScope,
) -> Result<StagedWrite> {
    let relative = engine::render(&file.relative_path.to_string_lossy(), scope);
    // An empty leading variable leaves a separator at the front
    let target_path = confined_join(
        target_dir,
        relative.trim_start_matches(std::path::is_separator),
    )?;
    let final_bytes = if file.is_text {
        engine::render_bytes(&file.raw_bytes, scope)
    } else {
        file.raw_bytes.clone()
    };
    Ok(StagedWrite {
        target_path,
        final_bytes,
    })
}

/// Copy the whole boilerplate tree into `target_dir`.
///
/// Returns the paths written. The question schema is removed from the
/// target afterwards since it only matters while scaffolding.
pub async fn materialize(
    template_dir: &Path,
    target_dir: &Path,
    scope: &VariableScope,
    logger: &Logger,
) -> Result<Vec<PathBuf>> {
    let files = enumerate_files(template_dir)?;

    let mut batch = WriteBatch::new();
    for file in &files {
        let write = stage_file(file, target_dir, scope)?;
        logger.info(format!("write to {}", write.target_path.display()));
        batch.stage(write);
    }

    let mut written = batch.commit().await?;

    let schema_path = target_dir.join(SCHEMA_FILE);
    if fs::try_exists(&schema_path).await.unwrap_or(false) {
        fs::remove_file(&schema_path)
            .await
            .with_context(|| format!("Failed to remove {}", schema_path.display()))?;
        written.retain(|p| p != &schema_path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, b'{', b'{', b' ',
        b'n', b'a', b'm', b'e', b' ', b'}', b'}',
    ];

    fn scope(pairs: &[(&str, &str)]) -> VariableScope {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn write(root: &Path, rel: &str, bytes: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_enumerate_includes_dotfiles_and_skips_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".gitignore", b"node_modules\n");
        write(dir.path(), "src/index.js", b"console.log(1)\n");
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();

        let files = enumerate_files(dir.path()).unwrap();
        let paths: Vec<String> = files
            .iter()
            .map(|f| f.relative_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths, vec![".gitignore", "src/index.js"]);
        assert!(files.iter().all(|f| f.is_text));
    }

    #[test]
    fn test_confined_join_rejects_escapes() {
        let target = Path::new("/work/app");
        assert_eq!(
            confined_join(target, "src/./index.js").unwrap(),
            PathBuf::from("/work/app/src/index.js")
        );

        let err = confined_join(target, "../evil.sh").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScaffoldError>(),
            Some(ScaffoldError::PathEscape(_))
        ));
        assert!(confined_join(target, "/etc/passwd").is_err());
        assert!(confined_join(target, "").is_err());
    }

    #[test]
    fn test_stage_file_renames_and_substitutes_text() {
        let file = SourceFile {
            relative_path: PathBuf::from("src/{{ name }}.js"),
            raw_bytes: b"export const name = '{{ name }}';".to_vec(),
            is_text: true,
        };
        let staged = stage_file(&file, Path::new("/work/app"), &scope(&[("name", "shop")])).unwrap();

        assert_eq!(staged.target_path, PathBuf::from("/work/app/src/shop.js"));
        assert_eq!(staged.final_bytes, b"export const name = 'shop';".to_vec());
    }

    #[test]
    fn test_stage_file_leaves_binary_untouched() {
        let file = SourceFile {
            relative_path: PathBuf::from("logo.png"),
            raw_bytes: PNG.to_vec(),
            is_text: false,
        };
        let staged = stage_file(&file, Path::new("/work/app"), &scope(&[("name", "shop")])).unwrap();
        assert_eq!(staged.final_bytes, PNG.to_vec());
    }

    #[test]
    fn test_stage_file_rejects_escaping_variable() {
        let file = SourceFile {
            relative_path: PathBuf::from("{{ name }}/x.txt"),
            raw_bytes: Vec::new(),
            is_text: true,
        };
        assert!(stage_file(&file, Path::new("/work/app"), &scope(&[("name", "..")])).is_err());
    }

    #[test]
    fn test_stage_file_empty_leading_variable_stays_in_target() {
        let file = SourceFile {
            relative_path: PathBuf::from("{{ module }}/index.js"),
            raw_bytes: b"module.exports = {};".to_vec(),
            is_text: true,
        };
        let staged = stage_file(&file, Path::new("/work/app"), &scope(&[("module", "")])).unwrap();
        assert_eq!(staged.target_path, PathBuf::from("/work/app/index.js"));
    }

    #[tokio::test]
    async fn test_materialize_empty_path_variable() {
        let template = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(template.path(), "{{ module }}/index.js", b"// {{ module }}\n");

        let written = materialize(
            template.path(),
            target.path(),
            &scope(&[("module", "")]),
            &Logger::capture("test"),
        )
        .await
        .unwrap();

        assert_eq!(written, vec![target.path().join("index.js")]);
        assert!(target.path().join("index.js").is_file());
    }

    #[tokio::test]
    async fn test_materialize_whole_tree() {
        let template = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(template.path(), "README.md", b"# {{ name }}\n\\{{ name }} {{ missing }}\n");
        write(template.path(), "logo.png", PNG);
        write(template.path(), ".env", b"APP={{ name }}\n");
        write(template.path(), "{{ name }}/main.js", b"// {{ name }}\n");
        write(template.path(), SCHEMA_FILE, b"name:\n  message: project name\n");

        let logger = Logger::capture("test");
        let written = materialize(
            template.path(),
            target.path(),
            &scope(&[("name", "shop")]),
            &logger,
        )
        .await
        .unwrap();

        let read = |rel: &str| std::fs::read(target.path().join(rel)).unwrap();
        assert_eq!(read("README.md"), b"# shop\n{{ name }} {{ missing }}\n".to_vec());
        assert_eq!(read("logo.png"), PNG.to_vec());
        assert_eq!(read(".env"), b"APP=shop\n".to_vec());
        assert_eq!(read("shop/main.js"), b"// shop\n".to_vec());
        assert!(!target.path().join(SCHEMA_FILE).exists());
        assert_eq!(written.len(), 4);
        assert!(logger.contains(crate::logger::Level::Info, "write to"));
    }

    #[tokio::test]
    async fn test_materialize_is_idempotent() {
        let template = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(template.path(), "a.txt", b"{{ name }}");

        let s = scope(&[("name", "shop")]);
        let logger = Logger::capture("test");
        materialize(template.path(), target.path(), &s, &logger).await.unwrap();
        materialize(template.path(), target.path(), &s, &logger).await.unwrap();

        assert_eq!(std::fs::read(target.path().join("a.txt")).unwrap(), b"shop".to_vec());
        let leftovers: Vec<_> = std::fs::read_dir(target.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn test_escape_fails_before_anything_is_written() {
        let template = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(template.path(), "a.txt", b"ok");
        write(template.path(), "{{ name }}/b.txt", b"bad");

        let result = materialize(
            template.path(),
            target.path(),
            &scope(&[("name", "..")]),
            &Logger::capture("test"),
        )
        .await;

        assert!(result.is_err());
        assert!(!target.path().join("a.txt").exists());
    }
}
