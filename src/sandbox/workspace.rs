// src/sandbox/workspace.rs

//! Workspace root confinement.
//!
//! Every file tool resolves its path through [`Workspace::resolve`]. The
//! returned path is absolute, free of `.`/`..` components, has every symlink
//! on it resolved (dangling ones included), and is equal to or nested under
//! the root.

use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::ToolError;

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Canonicalizes `root` once. Fails if it does not exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ToolError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|_| ToolError::DirNotFound(root.display().to_string()))?;
        if !root.is_dir() {
            return Err(ToolError::DirNotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` (relative to the root, or absolute) and check confinement.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, ToolError> {
        let input = Path::new(path.trim());
        let joined = if input.is_absolute() {
            input.to_path_buf()
        } else {
            self.root.join(input)
        };

        let escape = || ToolError::PathEscape {
            path: PathBuf::from(path),
            root: self.root.clone(),
        };

        let resolved = resolve_links(&normalize_lexically(&joined)).ok_or_else(escape)?;
        if !resolved.starts_with(&self.root) {
            return Err(escape());
        }
        Ok(resolved)
    }
}

/// Drop `.` and fold `..` into its parent without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Symlinks followed before a path is rejected as a loop.
const MAX_LINK_HOPS: usize = 40;

/// Canonicalize the deepest existing ancestor and re-append the rest.
///
/// A component that exists only as a dangling symlink is followed by hand,
/// since `canonicalize` cannot see through it. `None` on a symlink loop.
fn resolve_links(path: &Path) -> Option<PathBuf> {
    let mut current = path.to_path_buf();

    for _ in 0..MAX_LINK_HOPS {
        let mut existing = current.clone();
        let mut tail: Vec<OsString> = Vec::new();

        loop {
            if let Ok(canonical) = existing.canonicalize() {
                return Some(append_tail(canonical, &tail));
            }
            if let Ok(target) = fs::read_link(&existing) {
                let base = existing.parent().map(Path::to_path_buf).unwrap_or_default();
                current = normalize_lexically(&append_tail(base.join(target), &tail));
                break;
            }
            match (existing.file_name().map(|n| n.to_os_string()), existing.parent()) {
                (Some(name), Some(parent)) => {
                    tail.push(name);
                    existing = parent.to_path_buf();
                }
                _ => return Some(current),
            }
        }
    }

    tracing::warn!(path = %path.display(), "too many symlink hops");
    None
}

/// `tail` holds components deepest-first.
fn append_tail(mut base: PathBuf, tail: &[OsString]) -> PathBuf {
    for part in tail.iter().rev() {
        base.push(part);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        (dir, ws)
    }

    #[test]
    fn relative_paths_land_under_root() {
        let (_dir, ws) = workspace();
        let resolved = ws.resolve("notes/today.txt").unwrap();
        assert!(resolved.starts_with(ws.root()));
        assert!(resolved.ends_with("notes/today.txt"));
    }

    #[test]
    fn dot_resolves_to_root() {
        let (_dir, ws) = workspace();
        assert_eq!(ws.resolve(".").unwrap(), ws.root());
    }

    #[test]
    fn parent_segments_cannot_escape() {
        let (_dir, ws) = workspace();
        for attempt in ["../outside.txt", "a/../../outside.txt", "../../../../etc/passwd"] {
            let err = ws.resolve(attempt).unwrap_err();
            assert!(matches!(err, ToolError::PathEscape { .. }), "{attempt}");
            assert!(err.to_string().contains("outside workspace root"));
        }
    }

    #[test]
    fn inner_parent_segments_are_fine() {
        let (_dir, ws) = workspace();
        let resolved = ws.resolve("a/b/../c.txt").unwrap();
        assert_eq!(resolved, ws.root().join("a").join("c.txt"));
    }

    #[test]
    fn absolute_outside_path_is_rejected() {
        let (_dir, ws) = workspace();
        assert!(matches!(
            ws.resolve("/etc/passwd"),
            Err(ToolError::PathEscape { .. })
        ));
    }

    #[test]
    fn absolute_inside_path_is_accepted() {
        let (_dir, ws) = workspace();
        let inside = ws.root().join("x.txt");
        assert_eq!(ws.resolve(inside.to_str().unwrap()).unwrap(), inside);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_pointing_outside_is_rejected() {
        let (dir, ws) = workspace();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "s").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        assert!(matches!(
            ws.resolve("link/secret.txt"),
            Err(ToolError::PathEscape { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_pointing_outside_is_rejected() {
        let (dir, ws) = workspace();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("pwned.txt"), dir.path().join("link"))
            .unwrap();

        assert!(matches!(ws.resolve("link"), Err(ToolError::PathEscape { .. })));
        assert!(matches!(
            ws.resolve("link/deeper.txt"),
            Err(ToolError::PathEscape { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_inside_resolves_to_target() {
        let (dir, ws) = workspace();
        std::os::unix::fs::symlink("later.txt", dir.path().join("alias")).unwrap();

        assert_eq!(ws.resolve("alias").unwrap(), ws.root().join("later.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_rejected() {
        let (dir, ws) = workspace();
        std::os::unix::fs::symlink("b", dir.path().join("a")).unwrap();
        std::os::unix::fs::symlink("a", dir.path().join("b")).unwrap();

        assert!(matches!(ws.resolve("a"), Err(ToolError::PathEscape { .. })));
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(Workspace::new("/definitely/not/here/kov").is_err());
    }
}
