//! Catalog path helpers
//!
//! Catalog paths are `/`-delimited and rooted at `/`. A path uniquely
//! identifies one folder or report.

/// Root-anchored path without a trailing slash; empty input means root
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.trim().is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Parent folder of `path`; the root is its own parent
pub fn parent(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => normalized[..idx].to_string(),
    }
}

/// Last segment of the path, `None` for the root
pub fn item_name(path: &str) -> Option<String> {
    path.split('/')
        .filter(|s| !s.trim().is_empty())
        .next_back()
        .map(str::to_string)
}

pub fn join(parent_path: &str, name: &str) -> String {
    let parent_path = normalize(parent_path);
    let name = name.trim_matches('/');
    if parent_path == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent_path, name)
    }
}

/// `(label, path)` pairs from the root down to `path`
pub fn breadcrumbs(path: &str) -> Vec<(String, String)> {
    let mut crumbs = vec![("Home".to_string(), "/".to_string())];
    let mut current = String::new();
    for segment in path.split('/').filter(|s| !s.trim().is_empty()) {
        current.push('/');
        current.push_str(segment);
        crumbs.push((segment.to_string(), current.clone()));
    }
    crumbs
}
