//! Mapping between request names, relative paths, and artifact kinds.

use crate::error::{EngineError, EngineResult};
use crate::ArtifactKind;
use std::path::{Component, Path, PathBuf};

/// Join `rel` onto `root`, rejecting anything that could escape it.
pub fn safe_join(root: &Path, rel: &str) -> EngineResult<PathBuf> {
    let rel_path = Path::new(rel.trim_start_matches('/'));
    let mut out = root.to_path_buf();
    for component in rel_path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(EngineError::InvalidPath(rel.to_string()));
            }
        }
    }
    Ok(out)
}

/// Candidate files for a document URL, most specific first.
///
/// The query string and fragment are ignored. Extensionless paths try
/// `<path>.html` and `<path>/index.html`; every URL falls back to the
/// root `index.html` so client-side routes resolve.
pub fn document_candidates(url: &str) -> Vec<String> {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('/');

    let mut candidates = Vec::new();
    if path.is_empty() || path.ends_with('/') {
        candidates.push(format!("{}index.html", path));
    } else if Path::new(path).extension().is_some() {
        candidates.push(path.to_string());
    } else {
        candidates.push(format!("{}.html", path));
        candidates.push(format!("{}/index.html", path));
    }

    if candidates.iter().all(|c| c != "index.html") {
        candidates.push("index.html".to_string());
    }
    candidates
}

/// Classify a file relative to the engine root.
///
/// Returns the artifact kind and the variant name a change event carries.
pub fn classify(rel: &Path) -> Option<(ArtifactKind, String)> {
    let rel_str = rel.to_string_lossy().replace('\\', "/");
    let file_name = rel.file_name()?.to_string_lossy().into_owned();

    if rel_str.starts_with("assets/") {
        return Some((ArtifactKind::Assets, rel_str));
    }

    match file_name.as_str() {
        "manifest.json" => return Some((ArtifactKind::Manifest, file_name)),
        "service-worker.js" | "sw.js" => return Some((ArtifactKind::ServiceWorker, file_name)),
        _ => {}
    }

    match rel.extension().and_then(|ext| ext.to_str()) {
        Some("js") => {
            let stem = rel.file_stem()?.to_string_lossy().into_owned();
            Some((ArtifactKind::Script, stem))
        }
        Some("css") => Some((ArtifactKind::Style, file_name)),
        Some("html") => Some((ArtifactKind::Document, rel_str)),
        _ => None,
    }
}

/// MIME type for an asset path.
pub fn asset_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
