use std::path::{Component, Path};

use super::NotesError;

/// Normalize a caller-supplied path into a vault-relative `a/b/c` string.
///
/// Purely lexical: no filesystem access happens here. Leading slashes, `.`
/// and empty segments are dropped and `\` is treated as a separator. A `..`
/// that would climb above the vault root is rejected. The empty string
/// stands for the vault root itself.
pub fn normalize_relative(requested: &str) -> Result<String, NotesError> {
    let cleaned = requested.trim().replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();

    for part in cleaned.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                if parts.pop().is_none() {
                    return Err(NotesError::Validation(format!(
                        "path escapes the vault root: {}",
                        requested
                    )));
                }
            }
            other => {
                // Rejects drive prefixes and anything else that is not a plain name.
                let mut components = Path::new(other).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => parts.push(other),
                    _ => {
                        return Err(NotesError::Validation(format!(
                            "invalid path segment `{}` in {}",
                            other, requested
                        )))
                    }
                }
            }
        }
    }

    Ok(parts.join("/"))
}

/// Whether any segment of a normalized relative path is a dot-entry.
pub fn has_hidden_segment(relative: &str) -> bool {
    relative.split('/').any(|part| part.starts_with('.'))
}

/// Vault-relative path of `path` with `/` separators.
pub fn relative_to(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_paths() {
        assert_eq!(normalize_relative("a.md").unwrap(), "a.md");
        assert_eq!(normalize_relative("/projects/plan.md").unwrap(), "projects/plan.md");
        assert_eq!(normalize_relative("projects\\plan.md").unwrap(), "projects/plan.md");
        assert_eq!(normalize_relative("./a//b/./c.md").unwrap(), "a/b/c.md");
    }

    #[test]
    fn test_normalize_root_aliases() {
        for root in ["", "/", ".", "  ", "./"] {
            assert_eq!(normalize_relative(root).unwrap(), "");
        }
    }

    #[test]
    fn test_parent_segments_inside_vault_are_folded() {
        assert_eq!(normalize_relative("a/../b.md").unwrap(), "b.md");
        assert_eq!(normalize_relative("a/b/../../c.md").unwrap(), "c.md");
    }

    #[test]
    fn test_escaping_the_root_is_rejected() {
        for path in ["../secret.md", "a/../../secret.md", "/../etc/passwd", "..\\x.md"] {
            let err = normalize_relative(path).unwrap_err();
            assert!(matches!(err, NotesError::Validation(_)), "{}", path);
        }
    }

    #[test]
    fn test_hidden_segments() {
        assert!(has_hidden_segment(".obsidian/workspace.md"));
        assert!(has_hidden_segment("daily/.draft.md"));
        assert!(!has_hidden_segment("daily/2024-01-15.md"));
        assert!(!has_hidden_segment(""));
    }

    #[test]
    fn test_relative_to_uses_forward_slashes() {
        let root = Path::new("/vault");
        let path = Path::new("/vault").join("daily").join("2024-01-15.md");
        assert_eq!(relative_to(root, &path), "daily/2024-01-15.md");
    }
}
