//! # Exporter
//!
//! Writes each finished entry to its own UTF-8 text file:
//!
//! ```text
//! <output_dir>/journal_<YYYYMMDD_HHMMSSffffff>.txt
//! ```
//!
//! The id is the current local time at microsecond resolution, read from a
//! [`Clock`] on every export. Ids are strictly increasing within an
//! [`Exporter`]: when the clock repeats itself (or goes backwards) the id is moved
//! one microsecond past the previous one. Files are created with create-new
//! semantics, so an existing file is never overwritten.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use crate::error::ExportError;

const ID_FORMAT: &str = "%Y%m%d_%H%M%S%6f";
const FILE_PREFIX: &str = "journal";
const MAX_ID_ATTEMPTS: usize = 1_000;

/// Source of the current time for entry ids.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A written entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedEntry {
    pub id: String,
    pub file_path: PathBuf,
}

/// Format a timestamp as an entry id, e.g. `20231101_100000123456`.
pub fn format_entry_id(timestamp: &NaiveDateTime) -> String {
    timestamp.format(ID_FORMAT).to_string()
}

/// File name for an entry id, e.g. `journal_20231101_100000123456.txt`.
pub fn entry_file_name(id: &str) -> String {
    format!("{FILE_PREFIX}_{id}.txt")
}

pub struct Exporter<C = SystemClock> {
    output_dir: PathBuf,
    clock: C,
    last_timestamp: Option<NaiveDateTime>,
}

impl Exporter<SystemClock> {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(output_dir, SystemClock)
    }
}

impl<C: Clock> Exporter<C> {
    pub fn with_clock(output_dir: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            output_dir: output_dir.into(),
            clock,
            last_timestamp: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `text` to a new, uniquely named file in the output directory.
    ///
    /// # Errors
    /// - [`ExportError::EmptyEntry`] for empty text; nothing is written.
    /// - [`ExportError::Io`] if the directory cannot be created or the file written.
    pub fn export(&mut self, text: &str) -> Result<ExportedEntry, ExportError> {
        if text.is_empty() {
            return Err(ExportError::EmptyEntry);
        }

        fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut timestamp = self.next_timestamp();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = format_entry_id(&timestamp);
            let file_path = self.output_dir.join(entry_file_name(&id));

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&file_path)
            {
                Ok(file) => {
                    self.last_timestamp = Some(timestamp);
                    write_entry(file, &file_path, text)?;
                    info!("Journal entry saved to: {}", file_path.display());
                    return Ok(ExportedEntry { id, file_path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already exists, bumping id", file_path.display());
                    timestamp += TimeDelta::microseconds(1);
                }
                Err(source) => {
                    return Err(ExportError::Io {
                        path: file_path,
                        source,
                    });
                }
            }
        }

        Err(ExportError::Io {
            path: self.output_dir.clone(),
            source: std::io::Error::new(
                ErrorKind::AlreadyExists,
                "no free entry file name found",
            ),
        })
    }

    /// Fresh clock reading, moved past the previous id if it does not advance.
    fn next_timestamp(&self) -> NaiveDateTime {
        let now = self.clock.now();
        match self.last_timestamp {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        }
    }
}

/// Write `text` into the freshly created `file`, removing it again on failure so a
/// partial file never passes for a real entry.
fn write_entry<W: Write>(mut file: W, file_path: &Path, text: &str) -> Result<(), ExportError> {
    if let Err(source) = file.write_all(text.as_bytes()).and_then(|()| file.flush()) {
        drop(file);
        let _ = fs::remove_file(file_path);
        return Err(ExportError::Io {
            path: file_path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
