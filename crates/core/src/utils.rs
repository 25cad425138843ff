//! Utility functions

use once_cell::sync::Lazy;
use regex::Regex;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};

/// A regex matching every run of characters that is not allowed in a chunk
/// basename.
pub static RE_UNSAFE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").unwrap());

/// Number of hex characters kept from a content digest.
pub const SHORT_HASH_LEN: usize = 12;

/// Returns the canonicalized form of `path`, falling back to the path itself
/// when it does not exist on disk (virtual and test ids).
///
/// Uses [`dunce`] so Windows results stay free of `\\?\` prefixes.
pub fn canonicalized(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Returns `path` with all separators forward-slashed, the form fed into
/// chunk-name hashing so the same module hashes identically across
/// platforms.
pub fn slash_path(path: &Path) -> String {
    use path_slash::PathExt;
    path.to_slash_lossy().into_owned()
}

/// Derives the sanitized basename of a module id: extension stripped,
/// every run of characters outside `[A-Za-z0-9_-]` replaced by `_`.
pub fn sanitize_basename(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let sanitized = RE_UNSAFE_NAME.replace_all(stem, "_").into_owned();
    if sanitized.is_empty() {
        "module".to_string()
    } else {
        sanitized
    }
}

/// Returns the first [`SHORT_HASH_LEN`] hex characters of the SHA-1 digest
/// of `bytes`.
pub fn short_hash(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes.as_ref());
    let mut out = hex::encode(hasher.finalize());
    out.truncate(SHORT_HASH_LEN);
    out
}

/// Returns the short digest of several parts hashed in order.
pub fn short_hash_parts<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> String {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = hex::encode(hasher.finalize());
    out.truncate(SHORT_HASH_LEN);
    out
}

/// Strips a `?query` suffix from a module id.
pub fn strip_query(id: &str) -> &str {
    match id.split_once('?') {
        Some((path, _)) => path,
        None => id,
    }
}

/// Returns the byte length of the leading trivia of `text`: BOM, shebang,
/// whitespace, `//` and `/* */` comments, up to the first real token.
///
/// Used to recover the constant offset between parser-reported spans and
/// byte positions in the text.
pub fn leading_trivia_len(text: &str) -> usize {
    let mut pos = 0usize;

    if text.starts_with('\u{feff}') {
        pos += '\u{feff}'.len_utf8();
    }
    if text[pos..].starts_with("#!") {
        pos += text[pos..].find('\n').map_or(text.len() - pos, |i| i + 1);
    }

    while pos < text.len() {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.starts_with("//") {
            pos += trimmed.find('\n').map_or(trimmed.len(), |i| i + 1);
        } else if trimmed.starts_with("/*") {
            match trimmed[2..].find("*/") {
                Some(i) => pos += 2 + i + 2,
                // Unterminated comment: everything is trivia, the parser
                // reports the failure.
                None => return text.len(),
            }
        } else {
            break;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_basenames() {
        assert_eq!(sanitize_basename(Path::new("/app/src/my page.tsx")), "my_page");
        assert_eq!(sanitize_basename(Path::new("/app/src/héllo.ts")), "h_llo");
        assert_eq!(sanitize_basename(Path::new("/app/src/ok-name_0.tsx")), "ok-name_0");
        assert_eq!(sanitize_basename(Path::new("/")), "module");
    }

    #[test]
    fn short_hash_is_stable_and_short() {
        let a = short_hash("use client");
        let b = short_hash("use client");
        assert_eq!(a, b);
        assert_eq!(a.len(), SHORT_HASH_LEN);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(short_hash("use client"), short_hash("use server"));
    }

    #[test]
    fn hash_parts_differ_by_order() {
        let ab = short_hash_parts([b"a".as_slice(), b"b".as_slice()]);
        let ba = short_hash_parts([b"b".as_slice(), b"a".as_slice()]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn strips_queries() {
        assert_eq!(strip_query("/app/a.tsx?v=1"), "/app/a.tsx");
        assert_eq!(strip_query("/app/a.tsx"), "/app/a.tsx");
    }

    #[test]
    fn trivia_skips_comments_and_shebang() {
        assert_eq!(leading_trivia_len("const a = 1;"), 0);
        assert_eq!(leading_trivia_len("  const a = 1;"), 2);
        assert_eq!(leading_trivia_len("// hi\nconst a = 1;"), 6);
        assert_eq!(leading_trivia_len("/* x */ const a = 1;"), 8);
        assert_eq!(leading_trivia_len("#!/usr/bin/env node\nlet x;"), 20);
        let bom = "\u{feff}let x;";
        assert_eq!(leading_trivia_len(bom), 3);
        assert_eq!(leading_trivia_len("/* a */// b\n /*c*/ x"), 19);
    }

    #[test]
    fn slash_paths_are_forward_slashed() {
        let p = Path::new("/app/src/page.tsx");
        assert_eq!(slash_path(p), "/app/src/page.tsx");
    }
}
