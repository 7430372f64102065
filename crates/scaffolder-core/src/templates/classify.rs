//! Text/binary detection for template files
//!
//! The extension decides when it is a well-known one; otherwise the first
//! chunk of content is inspected.

use std::path::Path;

/// Bytes inspected when the extension is inconclusive
const SAMPLE_LEN: usize = 1024;

const TEXT_EXTENSIONS: &[&str] = &[
    "c", "cc", "cjs", "conf", "cpp", "cs", "css", "csv", "ejs", "env", "go", "graphql", "h",
    "hbs", "htm", "html", "ini", "java", "js", "json", "jsx", "less", "lock", "md", "mjs",
    "nunjucks", "php", "properties", "py", "rb", "rs", "sass", "scss", "sh", "sql", "styl",
    "svg", "toml", "ts", "tsx", "txt", "vue", "xml", "yaml", "yml",
];

const BINARY_EXTENSIONS: &[&str] = &[
    "7z", "avi", "bin", "bmp", "class", "dll", "doc", "docx", "eot", "exe", "gif", "gz", "ico",
    "jar", "jpeg", "jpg", "mov", "mp3", "mp4", "o", "otf", "pdf", "png", "psd", "so", "tar",
    "tgz", "ttf", "wasm", "wav", "webm", "webp", "woff", "woff2", "xls", "xlsx", "zip",
];

/// Decide whether a file should go through placeholder substitution
pub fn is_text(path: &Path, content: &[u8]) -> bool {
    match extension_hint(path) {
        Some(hint) => hint,
        None => content_is_text(content),
    }
}

/// `Some(true)` for known text extensions, `Some(false)` for known binary ones
fn extension_hint(path: &Path) -> Option<bool> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Some(true)
    } else if BINARY_EXTENSIONS.contains(&ext.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Content heuristic: NUL or low control bytes, or invalid UTF-8 in the sample
fn content_is_text(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(SAMPLE_LEN)];

    if sample.iter().any(|&b| b < 0x08 || (0x0e..0x1a).contains(&b)) {
        return false;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // A multi-byte character cut off by the sample boundary is still text
        Err(e) => e.error_len().is_none() && sample.len() == SAMPLE_LEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00];

    #[test]
    fn test_known_extensions_win() {
        assert!(is_text(Path::new("README.md"), PNG_HEADER));
        assert!(!is_text(Path::new("logo.png"), b"plain words"));
    }

    #[test]
    fn test_unknown_extension_sniffs_content() {
        assert!(is_text(Path::new(".gitignore"), b"node_modules\n.env\n"));
        assert!(is_text(Path::new("Dockerfile"), "FROM node:18 # ünïcode\n".as_bytes()));
        assert!(!is_text(Path::new("blob.dat"), PNG_HEADER));
    }

    #[test]
    fn test_invalid_utf8_is_binary() {
        assert!(!is_text(Path::new("data.raw"), &[0xff, 0xfe, b'a', b'b']));
    }

    #[test]
    fn test_truncated_multibyte_at_sample_edge_is_text() {
        let mut content = vec![b'a'; SAMPLE_LEN - 1];
        content.extend_from_slice("é".as_bytes());
        assert!(is_text(Path::new("notes"), &content));
    }

    #[test]
    fn test_empty_file_is_text() {
        assert!(is_text(Path::new("empty"), b""));
    }
}
