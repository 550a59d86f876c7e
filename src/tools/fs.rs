// src/tools/fs.rs

use std::fs;

use crate::confirm::Confirmer;
use crate::error::ToolError;
use crate::sandbox::Workspace;
use crate::tools::ToolResult;

pub fn read_file(workspace: &Workspace, path: &str) -> Result<ToolResult, ToolError> {
    let resolved = workspace.resolve(path)?;
    if !resolved.is_file() {
        return Err(ToolError::FileNotFound(path.to_string()));
    }
    let content = fs::read_to_string(&resolved)?;
    tracing::info!(path = %resolved.display(), "read file");

    Ok(ToolResult::success(content).with_meta("path", resolved.display().to_string()))
}

pub fn write_file(workspace: &Workspace, path: &str, content: &str) -> Result<ToolResult, ToolError> {
    let resolved = workspace.resolve(path)?;
    if let Some(parent) = resolved.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&resolved, content)?;
    tracing::info!(path = %resolved.display(), bytes = content.len(), "wrote file");

    let shown = resolved.display().to_string();
    Ok(ToolResult::success(shown.clone())
        .with_meta("path", shown)
        .with_meta("bytes", content.len()))
}

/// Entry names sorted alphabetically, not recursive.
pub fn list_dir(workspace: &Workspace, path: &str) -> Result<ToolResult, ToolError> {
    let path = if path.trim().is_empty() { "." } else { path };
    let resolved = workspace.resolve(path)?;
    if !resolved.is_dir() {
        return Err(ToolError::DirNotFound(path.to_string()));
    }

    let mut entries = fs::read_dir(&resolved)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    tracing::info!(path = %resolved.display(), count = entries.len(), "listed directory");

    let count = entries.len();
    Ok(ToolResult::success(entries)
        .with_meta("path", resolved.display().to_string())
        .with_meta("count", count))
}

/// Deletes only after an affirmative answer from `confirmer`.
pub fn delete_file(
    workspace: &Workspace,
    path: &str,
    confirmer: &dyn Confirmer,
) -> Result<ToolResult, ToolError> {
    let resolved = workspace.resolve(path)?;
    if !resolved.is_file() {
        return Err(ToolError::FileNotFound(path.to_string()));
    }

    if !confirmer.confirm(&format!("Are you sure you want to delete '{path}'?")) {
        tracing::info!(path = %resolved.display(), "deletion declined");
        return Err(ToolError::UserCancelled);
    }
    fs::remove_file(&resolved)?;
    tracing::info!(path = %resolved.display(), "deleted file");

    let shown = resolved.display().to_string();
    Ok(ToolResult::success(format!("Deleted {shown}")).with_meta("path", shown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AutoConfirmer;
    use crate::tools::ToolData;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        (dir, ws)
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_dir, ws) = workspace();
        let written = write_file(&ws, "nested/dir/notes.txt", "hello\nworld").unwrap();
        assert!(written.ok);

        let read = read_file(&ws, "nested/dir/notes.txt").unwrap();
        assert_eq!(read.data, Some(ToolData::Text("hello\nworld".into())));
    }

    #[test]
    fn reading_a_directory_is_not_found() {
        let (dir, ws) = workspace();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(matches!(read_file(&ws, "sub"), Err(ToolError::FileNotFound(_))));
        assert!(matches!(read_file(&ws, "missing.txt"), Err(ToolError::FileNotFound(_))));
    }

    #[test]
    fn list_is_sorted_and_flat() {
        let (dir, ws) = workspace();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir_all(dir.path().join("c/deep")).unwrap();

        let listed = list_dir(&ws, ".").unwrap();
        assert_eq!(
            listed.data,
            Some(ToolData::Lines(vec!["a.txt".into(), "b.txt".into(), "c".into()]))
        );
        assert_eq!(listed.meta["count"], 3);
    }

    #[test]
    fn listing_a_file_is_dir_not_found() {
        let (dir, ws) = workspace();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        assert!(matches!(list_dir(&ws, "a.txt"), Err(ToolError::DirNotFound(_))));
    }

    #[test]
    fn declined_delete_keeps_file() {
        let (dir, ws) = workspace();
        let target = dir.path().join("keep.txt");
        fs::write(&target, "x").unwrap();

        let err = delete_file(&ws, "keep.txt", &AutoConfirmer { answer: false }).unwrap_err();
        assert!(matches!(err, ToolError::UserCancelled));
        assert!(target.exists());
    }

    #[test]
    fn confirmed_delete_removes_file() {
        let (dir, ws) = workspace();
        let target = dir.path().join("gone.txt");
        fs::write(&target, "x").unwrap();

        assert!(delete_file(&ws, "gone.txt", &AutoConfirmer { answer: true }).unwrap().ok);
        assert!(!target.exists());
    }

    #[test]
    fn escape_attempts_never_touch_disk() {
        let (_dir, ws) = workspace();
        assert!(matches!(
            write_file(&ws, "../escaped.txt", "x"),
            Err(ToolError::PathEscape { .. })
        ));
    }
}
