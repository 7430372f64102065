//! `{{ key }}` placeholder substitution
//!
//! - `{{ key }}` with a known key becomes the scope value
//! - `{{ key }}` with an unknown key is left untouched
//! - `\{{ key }}` is emitted as `{{ key }}` and never substituted
//!
//! Keys are ASCII letters, digits and underscores; any whitespace may
//! surround the key inside the braces.

use indexmap::IndexMap;
use regex::bytes::{Captures as ByteCaptures, Regex as ByteRegex};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Resolved variables, in question order
pub type VariableScope = IndexMap<String, String>;

const PLACEHOLDER_PATTERN: &str = r"(\\)?\{\{\s*([A-Za-z0-9_]+)\s*\}\}";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"));

static PLACEHOLDER_BYTES: LazyLock<ByteRegex> =
    LazyLock::new(|| ByteRegex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"));

/// Substitute placeholders in a string (file contents or relative paths)
pub fn render(content: &str, scope: &VariableScope) -> String {
    PLACEHOLDER
        .replace_all(content, |caps: &Captures| {
            let block = &caps[0];
            if caps.get(1).is_some() {
                return block[1..].to_string();
            }
            match scope.get(&caps[2]) {
                Some(value) => value.clone(),
                None => block.to_string(),
            }
        })
        .into_owned()
}

/// Byte-level variant of [`render`]
///
/// Bytes outside of placeholders are copied as-is, so text files with the
/// odd invalid sequence past the sniffed prefix survive unchanged.
pub fn render_bytes(content: &[u8], scope: &VariableScope) -> Vec<u8> {
    PLACEHOLDER_BYTES
        .replace_all(content, |caps: &ByteCaptures| {
            let block = &caps[0];
            if caps.get(1).is_some() {
                return block[1..].to_vec();
            }
            let value = std::str::from_utf8(&caps[2])
                .ok()
                .and_then(|key| scope.get(key));
            match value {
                Some(value) => value.as_bytes().to_vec(),
                None => block.to_vec(),
            }
        })
        .into_owned()
}

/// True if `content` contains at least one unescaped placeholder
pub fn has_placeholders(content: &str) -> bool {
    PLACEHOLDER
        .captures_iter(content)
        .any(|caps| caps.get(1).is_none())
}
