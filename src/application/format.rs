//! File format resolution by extension.

use std::fmt;
use std::path::Path;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::infrastructure::{cherrytree, lts, notecase};

/// Document formats the application can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Native LTS1 binary format, read and written
    Lts,
    /// CherryTree XML, import only
    CherryTree,
    /// NoteCase SQLite, import only
    NoteCase,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [FileFormat::Lts, FileFormat::CherryTree, FileFormat::NoteCase];

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Lts => lts::EXTENSION,
            FileFormat::CherryTree => cherrytree::EXTENSION,
            FileFormat::NoteCase => notecase::EXTENSION,
        }
    }

    pub fn is_foreign(self) -> bool {
        self != FileFormat::Lts
    }

    /// Resolves the format from the file extension (ASCII case-insensitive).
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str());
        extension
            .and_then(|ext| {
                Self::ALL
                    .into_iter()
                    .find(|format| ext.eq_ignore_ascii_case(format.extension()))
            })
            .ok_or_else(|| ApplicationError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileFormat::Lts => "LTS",
            FileFormat::CherryTree => "CherryTree",
            FileFormat::NoteCase => "NoteCase",
        };
        f.write_str(label)
    }
}
