//! Bounded textual summary of a repository listing for planning prompts.

use crate::config::ExploreConfig;

const RECOGNIZED_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".go", ".java", ".cpp", ".h", ".rs", ".md", ".json", ".yml", ".yaml",
];

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn is_readme(path: &str) -> bool {
    file_name(path).eq_ignore_ascii_case("readme.md")
}

fn is_recognized(path: &str) -> bool {
    file_name(path) == "Dockerfile" || RECOGNIZED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// The README to read first: the root one, otherwise the shallowest.
/// Ties keep listing order.
#[must_use]
pub fn find_readme(paths: &[String]) -> Option<&str> {
    paths
        .iter()
        .filter(|p| is_readme(p))
        .min_by_key(|p| p.matches('/').count())
        .map(String::as_str)
}

/// Render the listing for the planner.
///
/// Small repositories get every README plus all recognized files (bounded by
/// `small_repo_max_entries`). Larger ones get the READMEs plus the first
/// `large_repo_source_cap` recognized files and a count of what was left out.
#[must_use]
pub fn smart_file_tree(paths: &[String], config: &ExploreConfig) -> String {
    let readme = find_readme(paths);
    let mut priority: Vec<&str> = readme.into_iter().collect();
    priority.extend(
        paths
            .iter()
            .map(String::as_str)
            .filter(|p| is_readme(p) && Some(*p) != readme),
    );
    let code: Vec<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|p| !is_readme(p) && is_recognized(p))
        .collect();

    if paths.len() < config.small_repo_threshold {
        return priority
            .into_iter()
            .chain(code)
            .take(config.small_repo_max_entries)
            .collect::<Vec<_>>()
            .join("\n");
    }

    let shown = code.len().min(config.large_repo_source_cap);
    let hidden = code.len() - shown;
    let mut tree = priority
        .into_iter()
        .chain(code[..shown].iter().copied())
        .collect::<Vec<_>>()
        .join("\n");
    if hidden > 0 {
        tree.push_str(&format!("\n... (and {hidden} more files hidden)"));
    }
    tree
}
