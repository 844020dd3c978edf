use std::io::Write as _;
use std::path::{Path, PathBuf};

use rand::{distributions::Alphanumeric, Rng as _};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ContextError;

/// A rendered page kept by a `NoteStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNote {
    pub id: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub file_name: String,
    pub size: u64,
}

/// Keeps rendered pages for later retrieval.
pub trait NoteStore {
    /// Stores the bytes of a page under a title, reporting the progress of the upload as a
    /// percentage ending at 100.
    fn save_note(
        &mut self,
        title: &str,
        bytes: &[u8],
        on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<StoredNote, ContextError>;

    /// Every stored note, the most recent first.
    fn list_notes(&self) -> Result<Vec<StoredNote>, ContextError>;

    fn note_bytes(&self, id: &str) -> Result<Vec<u8>, ContextError>;

    /// A location the note can be fetched from directly.
    fn note_url(&self, note: &StoredNote) -> String;

    /// Returns whether a note with this identifier existed.
    fn delete_note(&mut self, id: &str) -> Result<bool, ContextError>;
}

const INDEX_FILE_NAME: &str = "index.json";
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Stores every note as a file in a directory, next to a JSON index of the notes.
#[derive(Debug)]
pub struct DirectoryNoteStore {
    directory: PathBuf,
    notes: Vec<StoredNote>,
}

impl DirectoryNoteStore {
    /// Opens the store in the given directory, creating the directory if needed.
    pub fn open(directory: &Path) -> Result<Self, ContextError> {
        std::fs::create_dir_all(directory).map_err(|error| {
            ContextError::with_error(
                format!("Failed to create the notes directory {:?}", directory),
                &error,
            )
        })?;
        let directory = directory.canonicalize().map_err(|error| {
            ContextError::with_error(
                format!("Failed to resolve the notes directory {:?}", directory),
                &error,
            )
        })?;

        let index_path = directory.join(INDEX_FILE_NAME);
        let notes = if index_path.exists() {
            let index_contents = std::fs::read(&index_path).map_err(|error| {
                ContextError::with_error(
                    format!("Failed to read the notes index {:?}", index_path),
                    &error,
                )
            })?;
            serde_json::from_slice(&index_contents).map_err(|error| {
                ContextError::with_error(
                    format!("Failed to parse the notes index {:?}", index_path),
                    &error,
                )
            })?
        } else {
            Vec::new()
        };

        Ok(DirectoryNoteStore { directory, notes })
    }

    fn note_path(&self, note: &StoredNote) -> PathBuf {
        self.directory.join(&note.file_name)
    }

    fn find_note(&self, id: &str) -> Result<&StoredNote, ContextError> {
        self.notes
            .iter()
            .find(|note| note.id == id)
            .ok_or_else(|| ContextError::with_context(format!("Unable to find the note {:?}", id)))
    }

    /// Persists the given notes as the index, the notes in memory are left untouched.
    fn write_index(&self, notes: &[StoredNote]) -> Result<(), ContextError> {
        let index_path = self.directory.join(INDEX_FILE_NAME);
        let index_contents = serde_json::to_vec_pretty(notes)
            .map_err(|error| ContextError::with_error("Failed to serialize the notes index", &error))?;
        std::fs::write(&index_path, index_contents).map_err(|error| {
            ContextError::with_error(
                format!("Failed to write the notes index {:?}", index_path),
                &error,
            )
        })
    }
}

/// An identifier such as `note_1718000000000_k3j9x0a7q`.
fn generate_note_id(created_at: OffsetDateTime) -> String {
    let suffix = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect::<String>();
    format!(
        "note_{}_{}",
        created_at.unix_timestamp_nanos() / 1_000_000,
        suffix
    )
}

/// Writes the bytes of a note in chunks, reporting the share written after each of them.
fn write_note_file(
    note_path: &Path,
    bytes: &[u8],
    report: &mut dyn FnMut(u8),
) -> Result<(), ContextError> {
    let file = std::fs::File::create(note_path).map_err(|error| {
        ContextError::with_error(format!("Failed to create the note {:?}", note_path), &error)
    })?;
    let mut writer = std::io::BufWriter::new(file);
    let mut written = 0;
    for chunk in bytes.chunks(UPLOAD_CHUNK_SIZE) {
        writer.write_all(chunk).map_err(|error| {
            ContextError::with_error(format!("Failed to write the note {:?}", note_path), &error)
        })?;
        written += chunk.len();
        report((written * 100 / bytes.len()) as u8);
    }
    writer.flush().map_err(|error| {
        ContextError::with_error(format!("Failed to write the note {:?}", note_path), &error)
    })
}

fn remove_note_file(note_path: &Path) {
    if let Err(error) = std::fs::remove_file(note_path) {
        if error.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove the note file {:?}: {}", note_path, error);
        }
    }
}

impl NoteStore for DirectoryNoteStore {
    fn save_note(
        &mut self,
        title: &str,
        bytes: &[u8],
        mut on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<StoredNote, ContextError> {
        let created_at = OffsetDateTime::now_utc();
        let id = generate_note_id(created_at);
        let note = StoredNote {
            file_name: format!("{}.png", id),
            id,
            title: title.to_string(),
            created_at,
            size: bytes.len() as u64,
        };

        let note_path = self.note_path(&note);
        let mut report = |progress: u8| {
            if let Some(on_progress) = on_progress.as_deref_mut() {
                on_progress(progress);
            }
        };
        report(0);

        if let Err(error) = write_note_file(&note_path, bytes, &mut report) {
            remove_note_file(&note_path);
            return Err(error);
        }
        if bytes.is_empty() {
            report(100);
        }

        let mut notes = self.notes.clone();
        notes.push(note.clone());
        if let Err(error) = self.write_index(&notes) {
            remove_note_file(&note_path);
            return Err(error);
        }
        self.notes = notes;
        log::info!("Saved the note {:?} as {:?}", note.title, note_path);

        Ok(note)
    }

    fn list_notes(&self) -> Result<Vec<StoredNote>, ContextError> {
        // Newest insertion first, so that notes created within the same instant keep
        // their reverse insertion order after the stable sort
        let mut notes = self.notes.iter().rev().cloned().collect::<Vec<_>>();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    fn note_bytes(&self, id: &str) -> Result<Vec<u8>, ContextError> {
        let note_path = self.note_path(self.find_note(id)?);
        std::fs::read(&note_path).map_err(|error| {
            ContextError::with_error(format!("Failed to read the note {:?}", note_path), &error)
        })
    }

    fn note_url(&self, note: &StoredNote) -> String {
        format!("file://{}", self.note_path(note).display())
    }

    fn delete_note(&mut self, id: &str) -> Result<bool, ContextError> {
        let Some(position) = self.notes.iter().position(|note| note.id == id) else {
            return Ok(false);
        };
        let mut notes = self.notes.clone();
        let note = notes.remove(position);
        self.write_index(&notes)?;
        self.notes = notes;
        remove_note_file(&self.note_path(&note));

        Ok(true)
    }
}
