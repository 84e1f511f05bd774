//! CSV archives
//!
//! Modules keep one [`Archiver`] per record stream and write a row per cycle
//! through the [`Archived`] trait. Archives live under the session's `arch/`
//! directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Writes serialisable records as rows of a CSV file.
///
/// A default archiver has no file and silently discards records, which is
/// how modules run without a session.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive {0:?}: {1}")]
    CannotCreate(PathBuf, std::io::Error),

    #[error("Cannot write an archive record: {0}")]
    WriteError(#[from] csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A struct which archives its state.
///
/// Implementors hold an `Archiver` for each stream, set up in their `init`
/// or `new` functions.
pub trait Archived {
    /// Write this cycle's records.
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create an archive at a path relative to the session's archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        Self::create(session.arch_root.join(path))
    }

    /// Create an archive at the given path, replacing any existing file.
    ///
    /// Missing parent directories are created. The header row is taken from
    /// the field names of the first record written.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ArchiveError::CannotCreate(path.to_path_buf(), e))?;
        }

        let file = File::create(path)
            .map_err(|e| ArchiveError::CannotCreate(path.to_path_buf(), e))?;

        Ok(Self {
            writer: Some(WriterBuilder::new().has_headers(true).from_writer(file))
        })
    }

    /// True if this archiver will write records to a file.
    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// Write a record as one row, flushing it to disk straight away.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        if let Some(ref mut w) = self.writer {
            w.serialize(record)?;
            w.flush()?;
        }

        Ok(())
    }
}
