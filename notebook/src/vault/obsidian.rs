use chrono::{SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{NotebookError, Result};
use crate::models::{SourceDocument, SourceType};
use crate::vault::frontmatter::{self, NoteFrontmatter, NOTEBOOK_TAG};

/// Folder inside the vault that saved notes go to.
pub const NOTEBOOK_FOLDER: &str = "AI_Notebook";

const MAX_TITLE_CHARS: usize = 100;

/// A directory of Markdown notes.
#[derive(Debug, Clone)]
pub struct ObsidianVault {
    root: PathBuf,
}

impl ObsidianVault {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(NotebookError::Vault(format!(
                "Vault path does not exist: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every Markdown note under the vault, or under `subfolder` of it.
    ///
    /// Hidden directories such as `.obsidian` and `.trash` are skipped.
    /// Frontmatter is stripped and notes with no body are left out. Entries
    /// that cannot be read are skipped with a warning.
    pub fn load_notes(&self, subfolder: Option<&str>) -> Result<Vec<SourceDocument>> {
        let start = match subfolder.map(str::trim).filter(|s| !s.is_empty()) {
            Some(sub) => self.root.join(sub),
            None => self.root.clone(),
        };
        if !start.is_dir() {
            return Err(NotebookError::Vault(format!(
                "Vault folder does not exist: {}",
                start.display()
            )));
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(&start)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }

            let raw = match std::fs::read_to_string(entry.path()) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Skipping unreadable note");
                    continue;
                }
            };
            let body = frontmatter::strip(&raw).trim();
            if body.is_empty() {
                tracing::debug!(path = %entry.path().display(), "Skipping empty note");
                continue;
            }

            let name = entry
                .path()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();

            found.push((
                relative,
                SourceDocument::new(name, entry.path(), body, SourceType::Note),
            ));
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        tracing::info!(count = found.len(), root = %start.display(), "Loaded vault notes");

        Ok(found.into_iter().map(|(_, doc)| doc).collect())
    }

    /// Write a generated note to `AI_Notebook/<title>.md` and return its path.
    ///
    /// Never overwrites: an existing file gets the next free ` 2`, ` 3`, … suffix.
    pub fn save_note(&self, title: &str, body: &str, citations: &[String]) -> Result<PathBuf> {
        let folder = self.root.join(NOTEBOOK_FOLDER);
        std::fs::create_dir_all(&folder)?;

        let meta = NoteFrontmatter {
            title: title.trim(),
            created: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tags: vec![NOTEBOOK_TAG],
            sources: citations,
        };
        let rendered = frontmatter::render(&meta, body)?;

        let (path, mut file) = create_unique(&folder, &sanitize_title(title))?;
        file.write_all(rendered.as_bytes())?;

        tracing::info!(path = %path.display(), "Saved note to vault");
        Ok(path)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Create `<title>.md`, or the first free `<title> N.md`, atomically.
fn create_unique(folder: &Path, title: &str) -> Result<(PathBuf, File)> {
    let mut n = 1u32;
    loop {
        let path = if n == 1 {
            folder.join(format!("{title}.md"))
        } else {
            folder.join(format!("{title} {n}.md"))
        };

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Make a title safe to use as a file name on every platform.
pub fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '-',
            c if c.is_whitespace() => ' ',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed
        .trim_matches(['.', ' '])
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    let cleaned = capped.trim_matches(['.', ' ']);

    if cleaned.is_empty() {
        "Untitled".to_string()
    } else {
        cleaned.to_string()
    }
}
