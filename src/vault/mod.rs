pub mod excerpt;
pub mod frontmatter;
pub mod paths;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use walkdir::{DirEntry, WalkDir};

use crate::config::NotesConfig;
use excerpt::excerpt_with;
use paths::{has_hidden_segment, normalize_relative, relative_to};

#[derive(Debug, Error)]
pub enum NotesError {
    /// Unusable vault settings, detected at startup.
    #[error("vault configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl NotesError {
    fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        NotesError::Io {
            path: path.into(),
            source,
        }
    }
}

/// One search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub path: String,
    pub title: String,
    pub excerpt: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResult {
    pub path: String,
    pub title: String,
    pub content: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEntry {
    pub path: String,
    pub name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult {
    pub path: String,
    pub files: Vec<ListEntry>,
    /// Number of note files under `path` before `limit` was applied.
    pub total: usize,
}

/// A note file found while walking the vault.
#[derive(Debug)]
struct NoteFile {
    full_path: PathBuf,
    relative: String,
}

impl NoteFile {
    fn name(&self) -> String {
        self.full_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    fn title(&self) -> String {
        title_of(&self.full_path)
    }
}

/// Read-only view over a directory tree of notes.
#[derive(Debug, Clone)]
pub struct NotesVault {
    root: PathBuf,
    extensions: Vec<String>,
    default_limit: usize,
    max_limit: usize,
    excerpt_chars: usize,
}

impl NotesVault {
    /// Validate the notes configuration and resolve the vault root.
    pub async fn open(config: &NotesConfig) -> Result<Self, NotesError> {
        let root = fs::canonicalize(&config.vault_path).await.map_err(|e| {
            NotesError::Configuration(format!(
                "vault root {} is not accessible: {}",
                config.vault_path, e
            ))
        })?;

        let metadata = fs::metadata(&root)
            .await
            .map_err(|e| NotesError::Configuration(format!("{}: {}", root.display(), e)))?;
        if !metadata.is_dir() {
            return Err(NotesError::Configuration(format!(
                "vault root {} is not a directory",
                root.display()
            )));
        }

        let extensions: Vec<String> = config
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(NotesError::Configuration(
                "at least one note extension is required".to_string(),
            ));
        }

        if config.max_limit == 0 || config.default_limit == 0 {
            return Err(NotesError::Configuration(
                "default_limit and max_limit must be positive".to_string(),
            ));
        }
        if config.default_limit > config.max_limit {
            return Err(NotesError::Configuration(format!(
                "default_limit ({}) exceeds max_limit ({})",
                config.default_limit, config.max_limit
            )));
        }

        log::info!(
            "NotesVault: serving {} (extensions: {})",
            root.display(),
            extensions.join(", ")
        );

        Ok(Self {
            root,
            extensions,
            default_limit: config.default_limit,
            max_limit: config.max_limit,
            excerpt_chars: config.excerpt_chars,
        })
    }

    /// Search note names and contents for `query`, case-insensitively.
    ///
    /// Files are scanned in lexicographic order of their vault-relative path
    /// and scanning stops at the first `limit` matches, so the visible results
    /// are always the alphabetically first matching notes.
    pub async fn search_notes(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<SearchResults, NotesError> {
        if query.trim().is_empty() {
            return Err(NotesError::Validation("query must not be empty".to_string()));
        }
        let limit = self.resolve_limit(limit)?;
        let re = excerpt::matcher(query)
            .map_err(|e| NotesError::Validation(format!("unusable query: {}", e)))?;

        let files = self.note_files(&self.root).await?;
        let results = self.collect_matches(files, &re, limit).await;

        log::debug!("NotesVault: search {:?} matched {} note(s)", query, results.len());
        Ok(SearchResults {
            query: query.to_string(),
            total: results.len(),
            results,
        })
    }

    /// Check `files` in order and keep the first `limit` that match `re`.
    ///
    /// A file that cannot be read is skipped; the rest are still searched.
    async fn collect_matches(
        &self,
        files: Vec<NoteFile>,
        re: &Regex,
        limit: usize,
    ) -> Vec<SearchResult> {
        let mut results = Vec::new();
        for file in files {
            if results.len() >= limit {
                break;
            }

            let content = match read_text(&file.full_path).await {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("NotesVault: skipping unreadable {}: {}", file.relative, e);
                    continue;
                }
            };

            if !re.is_match(&file.name()) && !re.is_match(&content) {
                continue;
            }

            let metadata = fs::metadata(&file.full_path).await.ok();
            results.push(SearchResult {
                title: file.title(),
                excerpt: excerpt_with(&content, re, self.excerpt_chars),
                size: metadata.as_ref().map_or(content.len() as u64, Metadata::len),
                modified: metadata.as_ref().and_then(modified_time),
                path: file.relative,
            });
        }
        results
    }

    /// Read a single note by its vault-relative path.
    pub async fn read_note(&self, path: &str) -> Result<ReadResult, NotesError> {
        let relative = normalize_relative(path)?;
        if relative.is_empty() {
            return Err(NotesError::Validation("note path is required".to_string()));
        }
        if has_hidden_segment(&relative) {
            return Err(NotesError::NotFound(format!("{} is hidden", relative)));
        }

        let full_path = self.contained(&relative).await?;
        let metadata = fs::metadata(&full_path)
            .await
            .map_err(|e| NotesError::io(relative.as_str(), e))?;
        if !metadata.is_file() || !self.is_note(&full_path) {
            return Err(NotesError::NotFound(format!("{} is not a note file", relative)));
        }

        let content = read_text(&full_path)
            .await
            .map_err(|e| NotesError::io(relative.as_str(), e))?;
        let meta = frontmatter::parse(&content).unwrap_or_default();

        Ok(ReadResult {
            title: title_of(Path::new(&relative)),
            size: metadata.len(),
            created: metadata.created().ok().map(DateTime::<Utc>::from),
            modified: modified_time(&metadata),
            content,
            tags: meta.tags,
            aliases: meta.aliases,
            path: relative,
        })
    }

    /// List note files under `directory`, recursively.
    ///
    /// `total` counts every note under the directory, so callers can tell
    /// when `files` was truncated.
    pub async fn list_notes(
        &self,
        directory: Option<&str>,
        limit: Option<usize>,
    ) -> Result<ListResult, NotesError> {
        let relative = normalize_relative(directory.unwrap_or(""))?;
        let limit = self.resolve_limit(limit)?;
        if has_hidden_segment(&relative) {
            return Err(NotesError::NotFound(format!("{} is hidden", relative)));
        }

        let dir = if relative.is_empty() {
            self.root.clone()
        } else {
            self.contained(&relative).await?
        };
        let metadata = fs::metadata(&dir)
            .await
            .map_err(|e| NotesError::io(relative.as_str(), e))?;
        if !metadata.is_dir() {
            return Err(NotesError::NotFound(format!("{} is not a directory", relative)));
        }

        let notes = self.note_files(&dir).await?;
        let total = notes.len();

        let mut files = Vec::new();
        for file in notes.into_iter().take(limit) {
            match fs::metadata(&file.full_path).await {
                Ok(metadata) => files.push(ListEntry {
                    name: file.name(),
                    size: metadata.len(),
                    modified: modified_time(&metadata),
                    path: file.relative,
                }),
                Err(e) => log::warn!("NotesVault: cannot stat {}: {}", file.relative, e),
            }
        }

        Ok(ListResult {
            path: if relative.is_empty() {
                "/".to_string()
            } else {
                relative
            },
            files,
            total,
        })
    }

    /// Apply the default and clamp to the configured maximum.
    fn resolve_limit(&self, limit: Option<usize>) -> Result<usize, NotesError> {
        match limit {
            None => Ok(self.default_limit),
            Some(0) => Err(NotesError::Validation(
                "limit must be a positive integer".to_string(),
            )),
            Some(n) => Ok(n.min(self.max_limit)),
        }
    }

    /// Resolve a normalized relative path and make sure symlinks do not lead
    /// outside the vault.
    async fn contained(&self, relative: &str) -> Result<PathBuf, NotesError> {
        let joined = self.root.join(relative);
        let resolved = fs::canonicalize(&joined).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => NotesError::NotFound(relative.to_string()),
            _ => NotesError::io(relative, e),
        })?;

        if !resolved.starts_with(&self.root) {
            return Err(NotesError::Validation(format!(
                "path escapes the vault root: {}",
                relative
            )));
        }
        Ok(resolved)
    }

    fn is_note(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Every note file under `start`, sorted by vault-relative path.
    ///
    /// The walk runs on the blocking pool. Hidden entries are skipped and
    /// symlinks are not followed.
    async fn note_files(&self, start: &Path) -> Result<Vec<NoteFile>, NotesError> {
        let vault = self.clone();
        let start = start.to_path_buf();
        let relative = relative_to(&self.root, &start);

        tokio::task::spawn_blocking(move || vault.walk(&start))
            .await
            .map_err(|e| {
                NotesError::io(relative, std::io::Error::new(std::io::ErrorKind::Other, e))
            })?
    }

    fn walk(&self, start: &Path) -> Result<Vec<NoteFile>, NotesError> {
        let mut files = Vec::new();
        let walker = WalkDir::new(start)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(NotesError::io(relative_to(&self.root, start), e.into()));
                }
                Err(e) => {
                    log::warn!("NotesVault: skipping entry during walk: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_note(entry.path()) {
                files.push(NoteFile {
                    relative: relative_to(&self.root, entry.path()),
                    full_path: entry.into_path(),
                });
            }
        }

        // Per-directory name order differs from full-path order ("a.md" vs "a/b.md").
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(files)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Read a file as text, replacing invalid UTF-8 rather than failing.
async fn read_text(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path).await?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

fn modified_time(metadata: &Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

fn title_of(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}
