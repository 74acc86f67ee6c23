//! The JSON-file store.
//!
//! Every command is a fresh load → mutate → save cycle; nothing is cached
//! between invocations. No inter-process lock is taken, so two invocations
//! racing on the same file can lose an update.

pub mod schema;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::models::*;

use self::schema::SchemaError;

pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Self { path })
    }

    /// Upgrade the data file in place. A missing file is left alone.
    /// Returns whether the file was rewritten.
    pub fn migrate(&self) -> Result<bool> {
        let Some(mut doc) = self.read_document()? else {
            return Ok(false);
        };
        let report = schema::run_migrations(&mut doc).map_err(|e| self.schema_error(e))?;
        if !report.changed {
            return Ok(false);
        }

        let book = self.decode(doc)?;
        self.save(&book)?;
        tracing::info!(
            "Upgraded {} from {} to {}",
            self.path.display(),
            report.from,
            book.version
        );
        Ok(true)
    }

    // ============================================================
    // Load / save
    // ============================================================

    /// Read the whole notebook. A missing or blank file is an empty notebook.
    /// Older files are migrated in memory; the upgrade reaches disk on the
    /// next save.
    pub fn load(&self) -> Result<Notebook> {
        let Some(mut doc) = self.read_document()? else {
            tracing::debug!("No data at {}, starting empty", self.path.display());
            return Ok(Notebook::empty(schema::latest_version()));
        };
        schema::run_migrations(&mut doc).map_err(|e| self.schema_error(e))?;
        self.decode(doc)
    }

    /// Replace the data file with `book`.
    ///
    /// The JSON is written to a sibling `.tmp` file, synced, then renamed over
    /// the target, so a crash leaves either the old file or the new one. A
    /// failed write removes the `.tmp` file again.
    pub fn save(&self, book: &Notebook) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(book)?;
        bytes.push(b'\n');

        let tmp_path = self.tmp_path();
        if let Err(e) = write_atomically(&tmp_path, &self.path, &bytes) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
                }
            }
            return Err(io_error(&self.path, e));
        }

        tracing::debug!(
            "Saved {} notes (max id {}) to {}",
            book.notes.len(),
            book.max_id,
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_document(&self) -> Result<Option<Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| self.corrupt(e.to_string()))
    }

    fn decode(&self, doc: Value) -> Result<Notebook> {
        let mut book: Notebook =
            serde_json::from_value(doc).map_err(|e| self.corrupt(e.to_string()))?;
        book.reindex();
        Ok(book)
    }

    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::CorruptData {
            path: self.path.clone(),
            reason,
        }
    }

    fn schema_error(&self, error: SchemaError) -> StoreError {
        match error {
            SchemaError::UnsupportedVersion { found, latest } => {
                StoreError::UnsupportedVersion { found, latest }
            }
            other => self.corrupt(other.to_string()),
        }
    }

    /// Run one mutation as a load → mutate → save transaction. Nothing is
    /// written when the mutation fails.
    fn update<T>(&self, mutate: impl FnOnce(&mut Notebook, NaiveDateTime) -> Result<T>) -> Result<T> {
        let mut book = self.load()?;
        let out = mutate(&mut book, Local::now().naive_local())?;
        self.save(&book)?;
        Ok(out)
    }

    // ============================================================
    // Note operations
    // ============================================================

    pub fn create_note(&self, input: CreateNoteInput) -> Result<Note> {
        let note = self.update(|book, now| Ok(book.create(input, now)))?;
        tracing::info!("Created note {} in '{}'", note.id, note.category);
        Ok(note)
    }

    pub fn create_sub_note(&self, parent_id: u64, input: CreateSubNoteInput) -> Result<Note> {
        let note = self.update(|book, now| book.create_sub(parent_id, input, now))?;
        tracing::info!("Created sub-note {} under {}", note.id, parent_id);
        Ok(note)
    }

    pub fn mark_note(&self, id: u64, checked: bool) -> Result<Note> {
        self.update(|book, now| book.mark(id, checked, now))
    }

    pub fn delete_note(&self, id: u64) -> Result<Note> {
        let note = self.update(|book, _| book.delete(id))?;
        tracing::info!("Deleted note {} ({} sub-notes)", note.id, note.subs.len());
        Ok(note)
    }

    pub fn clear_notes(&self, category: Option<&str>) -> Result<usize> {
        let removed = self.update(|book, _| Ok(book.clear(category)))?;
        tracing::info!("Cleared {} root notes", removed);
        Ok(removed)
    }
}

fn write_atomically(tmp_path: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    {
        let mut file = fs::File::create(tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(tmp_path, target)?;
    if let Err(e) = sync_parent_dir(target) {
        tracing::warn!("Failed to sync directory of {}: {}", target.display(), e);
    }
    Ok(())
}

/// Make the rename itself durable.
#[cfg(unix)]
fn sync_parent_dir(target: &Path) -> std::io::Result<()> {
    match target.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::File::open(parent)?.sync_all(),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_target: &Path) -> std::io::Result<()> {
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmp_path_sits_beside_target() {
        let db = Database {
            path: PathBuf::from("/data/.ti_notes.json"),
        };
        assert_eq!(db.tmp_path(), PathBuf::from("/data/.ti_notes.json.tmp"));
    }
}
