//! Content-addressed chunk naming and the per-instance module registry.

use client_extract_core::utils;
use rustc_hash::FxHashMap;
use std::{
    path::Path,
    sync::{PoisonError, RwLock},
};

/// Extension of synthesized client modules.
pub const CLIENT_EXT: &str = "tsx";

/// Reserved marker prefixing every inline module id. The leading null byte
/// keeps the ids out of normal resolution.
pub const INLINE_PREFIX: &str = "\0use-client:";

/// Derives the chunk file name for one handler:
/// `<sanitizedBasename>.<12-hex>.client.<ext>`.
///
/// The digest covers the source's own content hash, the handler's start
/// index, and the canonical forward-slashed module path, so identical
/// handlers in different files (or at different offsets) still get distinct
/// names, and any edit to the source changes them all.
pub(crate) fn chunk_name(source: &str, handler_start: usize, canonical_id: &str) -> String {
    let file_hash = utils::short_hash(source);
    let digest = utils::short_hash_parts([
        file_hash.as_bytes(),
        handler_start.to_string().as_bytes(),
        canonical_id.as_bytes(),
    ]);
    let base = utils::sanitize_basename(Path::new(canonical_id));
    format!("{base}.{digest}.client.{CLIENT_EXT}")
}

/// The proposed output file name for a chunk: the chunk name with a JS
/// extension, under `assets/`.
pub(crate) fn asset_file_name(chunk_name: &str) -> String {
    let stem = chunk_name.strip_suffix(&format!(".{CLIENT_EXT}")).unwrap_or(chunk_name);
    format!("assets/{stem}.js")
}

/// Forms the virtual id of a synthesized module: the reserved prefix plus an
/// absolute-looking path next to the source.
pub(crate) fn inline_module_id(source_id: &Path, chunk_name: &str) -> String {
    let dir = source_id.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("/"));
    format!("{INLINE_PREFIX}{}/{chunk_name}", utils::slash_path(dir))
}

/// Returns `true` when `id` carries the inline-module prefix.
pub fn is_inline_id(id: &str) -> bool {
    id.starts_with(INLINE_PREFIX)
}

/// Recovers the synthesized path from an inline module id, stripping the
/// prefix and any query string.
pub fn parse_inline_id(id: &str) -> Option<&str> {
    id.strip_prefix(INLINE_PREFIX).map(utils::strip_query)
}

/// Synthesized module code keyed by inline module id.
///
/// Owned by one plugin value, never process-global: two plugin instances
/// must not observe each other's chunks. Cleared at every build start;
/// written during transform; read by the load hook.
#[derive(Debug, Default)]
pub struct ChunkRegistry {
    modules: RwLock<FxHashMap<String, String>>,
}

impl ChunkRegistry {
    /// Drops every entry. Runs at build start.
    pub fn clear(&self) {
        self.write().clear();
    }

    pub(crate) fn insert(&self, id: String, code: String) {
        self.write().insert(id, code);
    }

    /// Returns the synthesized code stored under `id`, if this instance
    /// produced it.
    pub fn get(&self, id: &str) -> Option<String> {
        self.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FxHashMap<String, String>> {
        self.modules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FxHashMap<String, String>> {
        self.modules.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_names_are_stable_and_content_addressed() {
        let a = chunk_name("source text", 17, "/app/src/page.tsx");
        let b = chunk_name("source text", 17, "/app/src/page.tsx");
        assert_eq!(a, b);
        assert!(a.starts_with("page."));
        assert!(a.ends_with(".client.tsx"));

        // Any input difference changes the name.
        assert_ne!(a, chunk_name("source text!", 17, "/app/src/page.tsx"));
        assert_ne!(a, chunk_name("source text", 18, "/app/src/page.tsx"));
        assert_ne!(a, chunk_name("source text", 17, "/app/src/other.tsx"));
    }

    #[test]
    fn chunk_name_shape() {
        let name = chunk_name("x", 0, "/app/my page!.tsx");
        let re = regex::Regex::new(r"^my_page_\.[0-9a-f]{12}\.client\.tsx$").unwrap();
        assert!(re.is_match(&name), "unexpected chunk name {name}");
    }

    #[test]
    fn asset_names_swap_the_extension() {
        assert_eq!(
            asset_file_name("page.0123456789ab.client.tsx"),
            "assets/page.0123456789ab.client.js"
        );
    }

    #[test]
    fn inline_ids_round_trip() {
        let id = inline_module_id(Path::new("/app/src/page.tsx"), "page.ab.client.tsx");
        assert!(is_inline_id(&id));
        assert_eq!(parse_inline_id(&id), Some("/app/src/page.ab.client.tsx"));
        assert_eq!(
            parse_inline_id(&format!("{id}?import")),
            Some("/app/src/page.ab.client.tsx")
        );
        assert!(!is_inline_id("/app/src/page.tsx"));
        assert_eq!(parse_inline_id("/app/src/page.tsx"), None);
    }

    #[test]
    fn registry_is_per_instance_and_clearable() {
        let a = ChunkRegistry::default();
        let b = ChunkRegistry::default();
        a.insert("\0use-client:/x".to_string(), "code".to_string());
        assert_eq!(a.get("\0use-client:/x").as_deref(), Some("code"));
        assert_eq!(b.get("\0use-client:/x"), None);
        assert_eq!(a.len(), 1);
        a.clear();
        assert!(a.is_empty());
    }
}
