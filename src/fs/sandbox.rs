//! Sandbox - confines every file operation to a base directory
//!
//! A [`SandboxedPath`] can only be obtained through [`Sandbox::resolve`],
//! so holding one proves the path resolved inside the base directory.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::FsError;

/// The base directory all file operations are confined to
#[derive(Debug, Clone)]
pub struct Sandbox {
    /// Canonical base directory
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `base`, which must be an existing directory
    pub fn new(base: impl AsRef<Path>) -> Result<Self, FsError> {
        let base = base.as_ref();
        debug!(?base, "Sandbox::new: called");

        let root = base.canonicalize().map_err(|source| FsError::InvalidBase {
            path: base.to_path_buf(),
            source,
        })?;

        if !root.is_dir() {
            debug!("Sandbox::new: base is not a directory");
            return Err(FsError::InvalidBase {
                path: base.to_path_buf(),
                source: std::io::Error::other("not a directory"),
            });
        }

        Ok(Self { root })
    }

    /// Canonical base directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a caller-supplied path against the base directory
    ///
    /// Relative paths are joined onto the base; absolute paths are taken as
    /// given. `.` and `..` are collapsed, then symlinks along the longest
    /// existing prefix are resolved. The result must lie inside the base.
    pub fn resolve(&self, requested: &str) -> Result<SandboxedPath, FsError> {
        debug!(%requested, "Sandbox::resolve: called");
        let trimmed = requested.trim();
        let raw = if trimmed.is_empty() { "." } else { trimmed };
        let raw_path = Path::new(raw);

        let joined = if raw_path.is_absolute() {
            raw_path.to_path_buf()
        } else {
            self.root.join(raw_path)
        };

        let normalized = normalize_lexically(&joined);

        let resolved = match resolve_symlinks(&normalized) {
            Some(p) => p,
            None => {
                debug!("Sandbox::resolve: dangling symlink on path");
                return Err(self.denied(raw));
            }
        };

        if resolved.starts_with(&self.root) {
            debug!(?resolved, "Sandbox::resolve: path is within base directory");
            Ok(SandboxedPath {
                resolved,
                requested: raw.to_string(),
            })
        } else {
            debug!(?resolved, "Sandbox::resolve: sandbox violation detected");
            Err(self.denied(raw))
        }
    }

    fn denied(&self, raw: &str) -> FsError {
        FsError::PermissionDenied {
            path: raw.to_string(),
            base: self.root.clone(),
        }
    }
}

/// A path proven to resolve inside a [`Sandbox`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxedPath {
    resolved: PathBuf,
    requested: String,
}

impl SandboxedPath {
    /// The fully resolved filesystem path
    pub fn as_path(&self) -> &Path {
        &self.resolved
    }

    /// The path as the caller wrote it, for display
    pub fn requested(&self) -> &str {
        &self.requested
    }
}

impl AsRef<Path> for SandboxedPath {
    fn as_ref(&self) -> &Path {
        &self.resolved
    }
}

/// Collapse `.` and `..` without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Canonicalize the longest existing prefix and re-append the rest
///
/// Returns `None` when an existing entry cannot be canonicalized, which is
/// the case for dangling symlinks.
fn resolve_symlinks(normalized: &Path) -> Option<PathBuf> {
    for ancestor in normalized.ancestors() {
        match ancestor.canonicalize() {
            Ok(canonical) => {
                let rest = normalized.strip_prefix(ancestor).ok()?;
                return Some(if rest.as_os_str().is_empty() {
                    canonical
                } else {
                    canonical.join(rest)
                });
            }
            Err(_) if ancestor.symlink_metadata().is_ok() => return None,
            Err(_) => continue,
        }
    }
    Some(normalized.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_within_base() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("test.txt"), "content").unwrap();
        let sandbox = Sandbox::new(temp.path()).unwrap();

        let path = sandbox.resolve("test.txt").unwrap();
        assert!(path.as_path().starts_with(sandbox.root()));
        assert_eq!(path.requested(), "test.txt");
    }

    #[test]
    fn test_resolve_base_itself() {
        let temp = tempdir().unwrap();
        let sandbox = Sandbox::new(temp.path()).unwrap();

        assert_eq!(sandbox.resolve(".").unwrap().as_path(), sandbox.root());
        assert_eq!(sandbox.resolve("").unwrap().as_path(), sandbox.root());
    }

    #[test]
    fn test_resolve_absolute_outside_denied() {
        let temp = tempdir().unwrap();
        let sandbox = Sandbox::new(temp.path()).unwrap();

        let err = sandbox.resolve("/etc/passwd").unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_resolve_absolute_inside_allowed() {
        let temp = tempdir().unwrap();
        let sandbox = Sandbox::new(temp.path()).unwrap();
        let inside = sandbox.root().join("notes.txt");

        let path = sandbox.resolve(inside.to_str().unwrap()).unwrap();
        assert_eq!(path.as_path(), inside);
    }

    #[test]
    fn test_resolve_parent_escape_denied() {
        let temp = tempdir().unwrap();
        let base = temp.path().join("base");
        fs::create_dir(&base).unwrap();
        fs::write(temp.path().join("outside.txt"), "secret").unwrap();
        let sandbox = Sandbox::new(&base).unwrap();

        let err = sandbox.resolve("../outside.txt").unwrap_err();
        assert!(err.is_permission_denied());

        let err = sandbox.resolve("sub/../../outside.txt").unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_resolve_parent_that_stays_inside() {
        let temp = tempdir().unwrap();
        let sandbox = Sandbox::new(temp.path()).unwrap();

        let path = sandbox.resolve("a/b/../c.txt").unwrap();
        assert_eq!(path.as_path(), sandbox.root().join("a").join("c.txt"));
    }

    #[test]
    fn test_resolve_new_nested_path_allowed() {
        let temp = tempdir().unwrap();
        let sandbox = Sandbox::new(temp.path()).unwrap();

        let path = sandbox.resolve("new/dir/file.txt").unwrap();
        assert_eq!(path.as_path(), sandbox.root().join("new/dir/file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_symlink_escape_denied() {
        let temp = tempdir().unwrap();
        let base = temp.path().join("base");
        let outside = temp.path().join("outside");
        fs::create_dir(&base).unwrap();
        fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, base.join("link")).unwrap();
        let sandbox = Sandbox::new(&base).unwrap();

        assert!(sandbox.resolve("link").unwrap_err().is_permission_denied());
        assert!(sandbox.resolve("link/new.txt").unwrap_err().is_permission_denied());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_dangling_symlink_denied() {
        let temp = tempdir().unwrap();
        let base = temp.path().join("base");
        fs::create_dir(&base).unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), base.join("dangling")).unwrap();
        let sandbox = Sandbox::new(&base).unwrap();

        assert!(sandbox.resolve("dangling").unwrap_err().is_permission_denied());
    }

    #[test]
    fn test_new_rejects_missing_base() {
        let temp = tempdir().unwrap();
        let result = Sandbox::new(temp.path().join("missing"));
        assert!(matches!(result, Err(FsError::InvalidBase { .. })));
    }

    #[test]
    fn test_new_rejects_file_base() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(Sandbox::new(&file), Err(FsError::InvalidBase { .. })));
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vec!["..", ".", "a", "b", "c.txt", ""]), 0..8)
            .prop_map(|parts| parts.join("/"))
    }

    proptest! {
        #[test]
        fn prop_resolved_paths_stay_inside(raw in path_strategy()) {
            let temp = tempdir().unwrap();
            let base = temp.path().join("base");
            fs::create_dir(&base).unwrap();
            let sandbox = Sandbox::new(&base).unwrap();

            match sandbox.resolve(&raw) {
                Ok(path) => prop_assert!(path.as_path().starts_with(sandbox.root())),
                Err(e) => prop_assert!(e.is_permission_denied()),
            }
        }

        #[test]
        fn prop_leading_parent_escapes_are_denied(depth in 1usize..5, name in "[a-z]{1,8}") {
            let temp = tempdir().unwrap();
            let base = temp.path().join("base_0");
            fs::create_dir(&base).unwrap();
            let sandbox = Sandbox::new(&base).unwrap();

            let raw = format!("{}{}", "../".repeat(depth), name);
            prop_assert!(sandbox.resolve(&raw).unwrap_err().is_permission_denied());
        }
    }
}
