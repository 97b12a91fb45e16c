//! FileOperations - the five sandboxed file operations
//!
//! Every operation resolves its path through the [`Sandbox`] before any
//! filesystem access. Results are typed; their `Display` impls produce the
//! text handed back to the model.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::RegexBuilder;
use tracing::debug;
use walkdir::WalkDir;

use super::{FsError, Sandbox, SandboxedPath};

/// Matching lines shown per file in search results
pub const MAX_LINES_PER_FILE: usize = 3;

/// Sandboxed file operations rooted at a base directory
#[derive(Debug, Clone)]
pub struct FileOperations {
    sandbox: Sandbox,
}

impl FileOperations {
    /// Create operations confined to `base`
    pub fn new(base: impl AsRef<Path>) -> Result<Self, FsError> {
        Ok(Self {
            sandbox: Sandbox::new(base)?,
        })
    }

    /// The sandbox these operations are confined to
    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Read a text file
    pub async fn read(&self, path: &str) -> Result<FileContents, FsError> {
        debug!(%path, "FileOperations::read: called");
        let target = self.sandbox.resolve(path)?;

        let metadata = tokio::fs::metadata(&target)
            .await
            .map_err(|e| FsError::io(target.requested(), e))?;
        if metadata.is_dir() {
            debug!("FileOperations::read: path is a directory");
            return Err(FsError::NotAFile {
                path: target.requested().to_string(),
            });
        }

        let bytes = tokio::fs::read(&target)
            .await
            .map_err(|e| FsError::io(target.requested(), e))?;
        let content = String::from_utf8(bytes).map_err(|_| FsError::UnsupportedEncoding {
            path: target.requested().to_string(),
        })?;

        debug!(bytes = %content.len(), "FileOperations::read: success");
        Ok(FileContents {
            path: target.requested().to_string(),
            resolved: target.as_path().to_path_buf(),
            content,
        })
    }

    /// Write a text file, creating parent directories and overwriting any existing file
    pub async fn write(&self, path: &str, content: &str) -> Result<WriteReceipt, FsError> {
        debug!(%path, content_len = %content.len(), "FileOperations::write: called");
        let target = self.sandbox.resolve(path)?;

        if target.as_path().is_dir() {
            debug!("FileOperations::write: path is a directory");
            return Err(FsError::NotAFile {
                path: target.requested().to_string(),
            });
        }

        if let Some(parent) = target.as_path().parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            debug!(%e, "FileOperations::write: failed to create parent directories");
            return Err(FsError::io(target.requested(), e));
        }

        tokio::fs::write(&target, content)
            .await
            .map_err(|e| FsError::io(target.requested(), e))?;

        debug!("FileOperations::write: file written");
        Ok(WriteReceipt {
            path: target.requested().to_string(),
            bytes_written: content.len(),
        })
    }

    /// List a directory, sorted by name
    pub async fn list(&self, path: &str) -> Result<DirectoryListing, FsError> {
        debug!(%path, "FileOperations::list: called");
        let target = self.require_directory(path).await?;

        let mut dir = tokio::fs::read_dir(&target)
            .await
            .map_err(|e| FsError::io(target.requested(), e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| FsError::io(target.requested(), e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let metadata = match self.entry_metadata(&entry.path()).await {
                Ok(m) => m,
                Err(_) => {
                    debug!(%name, "FileOperations::list: failed to get metadata, skipping entry");
                    continue;
                }
            };

            entries.push(if metadata.is_dir() {
                DirEntry {
                    name,
                    kind: EntryKind::Directory,
                    size: None,
                }
            } else {
                DirEntry {
                    name,
                    kind: EntryKind::File,
                    size: Some(metadata.len()),
                }
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(entries_count = %entries.len(), "FileOperations::list: entries collected");

        Ok(DirectoryListing {
            path: target.requested().to_string(),
            contents: if entries.is_empty() {
                ListingContents::Empty
            } else {
                ListingContents::Entries(entries)
            },
        })
    }

    /// Case-insensitive substring search over every text file below `path`
    ///
    /// `extension` filters by file-name suffix when non-empty. Files that are
    /// not valid UTF-8 are skipped.
    pub async fn search(&self, term: &str, path: &str, extension: &str) -> Result<SearchReport, FsError> {
        debug!(%term, %path, %extension, "FileOperations::search: called");
        let target = self.require_directory(path).await?;

        let matcher = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .map_err(|e| FsError::Io {
                path: target.requested().to_string(),
                source: std::io::Error::other(e),
            })?;

        let mut files = Vec::new();
        let walker = WalkDir::new(target.as_path())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| extension.is_empty() || e.file_name().to_string_lossy().ends_with(extension));

        for entry in walker {
            let content = match std::fs::read(entry.path()).map(String::from_utf8) {
                Ok(Ok(c)) => c,
                _ => {
                    debug!(path = ?entry.path(), "FileOperations::search: skipping unreadable file");
                    continue;
                }
            };

            let mut matched = content
                .lines()
                .enumerate()
                .filter(|(_, line)| matcher.is_match(line))
                .map(|(i, line)| LineMatch {
                    line_number: i as u64 + 1,
                    text: line.trim().to_string(),
                });

            let first: Vec<LineMatch> = matched.by_ref().take(MAX_LINES_PER_FILE).collect();
            if first.is_empty() {
                continue;
            }
            let additional = matched.count();

            let relative = entry
                .path()
                .strip_prefix(target.as_path())
                .unwrap_or(entry.path())
                .to_string_lossy()
                .to_string();

            files.push(FileMatches {
                path: relative,
                first,
                additional,
            });
        }

        debug!(file_count = %files.len(), "FileOperations::search: done");
        Ok(SearchReport {
            term: term.to_string(),
            path: target.requested().to_string(),
            files,
        })
    }

    /// Describe a file or directory
    pub async fn info(&self, path: &str) -> Result<FileInfo, FsError> {
        debug!(%path, "FileOperations::info: called");
        let target = self.sandbox.resolve(path)?;

        let metadata = tokio::fs::metadata(&target)
            .await
            .map_err(|e| FsError::io(target.requested(), e))?;

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        let text = if kind == EntryKind::File {
            match tokio::fs::read(&target).await {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(content) => TextStats::Lines(content.lines().count()),
                    Err(_) => TextStats::Binary,
                },
                Err(e) => return Err(FsError::io(target.requested(), e)),
            }
        } else {
            TextStats::NotApplicable
        };

        Ok(FileInfo {
            path: target.requested().to_string(),
            kind,
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            permissions: permission_bits(&metadata),
            text,
        })
    }

    /// Metadata for a listed entry; links leaving the sandbox report the link itself
    async fn entry_metadata(&self, path: &Path) -> std::io::Result<std::fs::Metadata> {
        match self.sandbox.resolve(&path.to_string_lossy()) {
            Ok(inside) => tokio::fs::metadata(inside.as_path()).await,
            Err(_) => {
                debug!(?path, "FileOperations::entry_metadata: entry escapes sandbox, not following");
                tokio::fs::symlink_metadata(path).await
            }
        }
    }

    async fn require_directory(&self, path: &str) -> Result<SandboxedPath, FsError> {
        let target = self.sandbox.resolve(path)?;
        let metadata = tokio::fs::metadata(&target)
            .await
            .map_err(|e| FsError::io(target.requested(), e))?;
        if !metadata.is_dir() {
            debug!("FileOperations::require_directory: not a directory");
            return Err(FsError::NotADirectory {
                path: target.requested().to_string(),
            });
        }
        Ok(target)
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_bits(_metadata: &std::fs::Metadata) -> Option<u32> {
    None
}

/// Contents of a text file
#[derive(Debug, Clone)]
pub struct FileContents {
    pub path: String,
    pub resolved: PathBuf,
    pub content: String,
}

impl fmt::Display for FileContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File: {}\n---\n{}", self.path, self.content)
    }
}

/// Outcome of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub path: String,
    pub bytes_written: usize,
}

impl fmt::Display for WriteReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Successfully wrote {} bytes to: {}", self.bytes_written, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "File"),
            EntryKind::Directory => write!(f, "Directory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes, files only
    pub size: Option<u64>,
}

/// A directory listing; `Empty` is explicit so it can't be mistaken for a swallowed error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingContents {
    Empty,
    Entries(Vec<DirEntry>),
}

#[derive(Debug, Clone)]
pub struct DirectoryListing {
    pub path: String,
    pub contents: ListingContents,
}

impl fmt::Display for DirectoryListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Directory: {}\n---\n", self.path)?;
        match &self.contents {
            ListingContents::Empty => write!(f, "(empty directory)"),
            ListingContents::Entries(entries) => {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|e| match (e.kind, e.size) {
                        (EntryKind::Directory, _) => format!("[DIR]  {}/", e.name),
                        (EntryKind::File, Some(size)) => format!("[FILE] {} ({} bytes)", e.name, size),
                        (EntryKind::File, None) => format!("[FILE] {}", e.name),
                    })
                    .collect();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub line_number: u64,
    pub text: String,
}

/// Matches within one file
#[derive(Debug, Clone)]
pub struct FileMatches {
    /// Path relative to the search root
    pub path: String,
    /// Up to [`MAX_LINES_PER_FILE`] matching lines
    pub first: Vec<LineMatch>,
    /// Matching lines beyond `first`
    pub additional: usize,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub term: String,
    pub path: String,
    pub files: Vec<FileMatches>,
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.files.is_empty() {
            return write!(f, "No matches found for '{}' in {}", self.term, self.path);
        }

        write!(f, "Search results for '{}' in {}:\n---", self.term, self.path)?;
        for file in &self.files {
            write!(f, "\n{}:", file.path)?;
            for m in &file.first {
                write!(f, "\n  Line {}: {}", m.line_number, m.text)?;
            }
            if file.additional > 0 {
                write!(f, "\n  ... and {} more matches", file.additional)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStats {
    Lines(usize),
    Binary,
    NotApplicable,
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Unix permission bits
    pub permissions: Option<u32>,
    pub text: TextStats,
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File Information:\n---\n")?;
        write!(f, "Path: {}\nType: {}\nSize: {} bytes", self.path, self.kind, self.size)?;
        if let Some(modified) = self.modified {
            write!(f, "\nLast modified: {}", modified.to_rfc3339())?;
        }
        if let Some(mode) = self.permissions {
            write!(f, "\nPermissions: {:o}", mode)?;
        }
        match self.text {
            TextStats::Lines(n) => write!(f, "\nLines: {}", n),
            TextStats::Binary => write!(f, "\nContent: binary"),
            TextStats::NotApplicable => Ok(()),
        }
    }
}
