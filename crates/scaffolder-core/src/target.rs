//! Target directory resolution
//!
//! A target is accepted when it did not exist (it is created on the spot), is
//! an empty directory (dotfiles do not count), or is non-empty and `--force`
//! was given. Anything else is a conflict and the user is asked for another
//! path until one is accepted.

use crate::error::ScaffoldError;
use crate::logger::Logger;
use crate::prompt::{InputQuestion, Prompter};
use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// What currently sits at the target path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDirectoryState {
    Absent,
    Empty,
    /// Visible (non-dot) entries, sorted
    NonEmpty(Vec<String>),
    NotADirectory,
}

/// Resolve `hint` against `cwd` and normalize `.`/`..` lexically
pub fn resolve_against(cwd: &Path, hint: &str) -> PathBuf {
    let joined = if hint.is_empty() {
        cwd.to_path_buf()
    } else {
        cwd.join(hint)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

pub fn classify(path: &Path) -> Result<TargetDirectoryState> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(TargetDirectoryState::Absent)
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to inspect {}", path.display())),
    };

    if !metadata.is_dir() {
        return Ok(TargetDirectoryState::NotADirectory);
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory {}", path.display()))?
    {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            entries.push(name);
        }
    }
    entries.sort();

    if entries.is_empty() {
        Ok(TargetDirectoryState::Empty)
    } else {
        Ok(TargetDirectoryState::NonEmpty(entries))
    }
}

/// Accept or reject `path`; `Err` carries the message shown to the user.
///
/// Creates the directory when it does not exist yet.
pub fn validate(path: &Path, force: bool, logger: &Logger) -> std::result::Result<(), String> {
    let state = classify(path).map_err(|e| format!("{:#}", e))?;
    match state {
        TargetDirectoryState::Absent => std::fs::create_dir_all(path)
            .map_err(|e| format!("failed to create {}: {}", path.display(), e)),
        TargetDirectoryState::Empty => Ok(()),
        TargetDirectoryState::NotADirectory => Err(ScaffoldError::Conflict(format!(
            "{} already exists as a file",
            path.display()
        ))
        .to_string()),
        TargetDirectoryState::NonEmpty(entries) => {
            if force {
                logger.warn(format!(
                    "{} already exists and will be override due to --force",
                    path.display()
                ));
                Ok(())
            } else {
                Err(ScaffoldError::Conflict(format!(
                    "{} already exists and not empty: {:?}",
                    path.display(),
                    entries
                ))
                .to_string())
            }
        }
    }
}

/// Produce an accepted target directory, asking again on conflicts
pub fn resolve_target_directory(
    cwd: &Path,
    hint: &str,
    force: bool,
    prompter: &dyn Prompter,
    logger: &Logger,
) -> Result<PathBuf> {
    let mut target = resolve_against(cwd, hint);

    loop {
        match validate(&target, force, logger) {
            Ok(()) => break,
            Err(message) => {
                logger.error(&message);

                let filter_cwd = cwd.to_path_buf();
                let validate_logger = logger.clone();
                let question = InputQuestion::new("dir", "Please enter target dir: ")
                    .with_default(if hint.is_empty() { "." } else { hint })
                    .with_filter(Arc::new(move |answer: &str| {
                        resolve_against(&filter_cwd, answer)
                            .to_string_lossy()
                            .into_owned()
                    }))
                    .with_validate(Arc::new(move |answer: &str| {
                        validate(Path::new(answer), force, &validate_logger)
                    }));

                let answer = prompter.input(&question)?;
                target = resolve_against(cwd, &answer);
            }
        }
    }

    logger.info(format!("target dir is {}", target.display()));
    Ok(target)
}
