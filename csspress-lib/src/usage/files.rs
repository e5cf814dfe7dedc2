//! Project file discovery for the usage scanner.

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expands `paths` into the list of files to scan.
///
/// Directories are walked recursively, sorted by file name, without following
/// symlinks, and filtered by extension case-insensitively. Any other path is
/// kept whatever its extension and left for [`read`] to open. Walk errors are
/// logged and skipped.
pub fn collect<P: AsRef<Path>>(paths: &[P], extensions: &[String]) -> Vec<PathBuf> {
    let extensions: Vec<String> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            walk(path, &extensions, &mut files);
        } else {
            files.push(path.to_path_buf());
        }
    }
    files
}

fn walk(root: &Path, extensions: &[String], files: &mut Vec<PathBuf>) {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(e)))
}

/// Reads a file as text, replacing invalid UTF-8. Unreadable files yield `None`.
pub fn read(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => {
            debug!("Scanning {} ({} bytes)", path.display(), bytes.len());
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(err) => {
            warn!("Skipping unreadable file {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn extensions(list: &str) -> Vec<String> {
        list.split(',').map(str::to_string).collect()
    }

    #[test]
    fn test_collect_filters_and_recurses() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("views")).unwrap();
        fs::write(dir.path().join("app.JS"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("views").join("index.html"), "x").unwrap();

        let files = collect(&[dir.path()], &extensions("html,js"));

        assert_eq!(
            files,
            vec![dir.path().join("app.JS"), dir.path().join("views").join("index.html")]
        );
    }

    #[test]
    fn test_explicit_file_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("template.txt");
        fs::write(&file, "x").unwrap();

        assert_eq!(collect(&[&file], &extensions("html")), vec![file]);
    }

    #[test]
    fn test_missing_path_is_left_to_read() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.html");

        assert_eq!(collect(&[&missing], &extensions("html")), vec![missing.clone()]);
        assert_eq!(read(&missing), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loops_are_not_followed() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "x").unwrap();
        symlink(dir.path(), dir.path().join("a")).unwrap();
        symlink(dir.path(), dir.path().join("b")).unwrap();
        symlink(dir.path().join("gone.html"), dir.path().join("broken.html")).unwrap();

        let files = collect(&[dir.path()], &extensions("html"));

        assert_eq!(files, vec![dir.path().join("index.html")]);
    }

    #[test]
    fn test_read_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bin.html");
        fs::write(&file, [b'o', b'k', 0xff]).unwrap();

        assert_eq!(read(&file).unwrap(), "ok\u{fffd}");
    }
}
