use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::{NewGist, NewGistFile};

/// One file row of the create form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftFile {
    pub filename: String,
    pub content: String,
}

impl DraftFile {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("a gist needs at least one file")]
    NoFiles,
    #[error("file #{index} has no filename")]
    EmptyFilename { index: usize },
    #[error("file #{index} has no content")]
    EmptyContent { index: usize },
    #[error("duplicate filename {0:?}")]
    DuplicateFilename(String),
}

/// Create-form state. Always holds at least one file row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GistDraft {
    pub description: String,
    pub public: bool,
    files: Vec<DraftFile>,
}

impl Default for GistDraft {
    fn default() -> Self {
        Self {
            description: String::new(),
            public: true,
            files: vec![DraftFile::default()],
        }
    }
}

impl GistDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a draft from rows; an empty list still yields one blank row.
    pub fn with_files(description: impl Into<String>, public: bool, files: Vec<DraftFile>) -> Self {
        let files = if files.is_empty() {
            vec![DraftFile::default()]
        } else {
            files
        };
        Self {
            description: description.into(),
            public,
            files,
        }
    }

    pub fn files(&self) -> &[DraftFile] {
        &self.files
    }

    pub fn file_mut(&mut self, index: usize) -> Option<&mut DraftFile> {
        self.files.get_mut(index)
    }

    pub fn add_file(&mut self) {
        self.files.push(DraftFile::default());
    }

    /// Removes a row unless it is the last one. Returns whether a row was removed.
    pub fn remove_file(&mut self, index: usize) -> bool {
        if self.files.len() <= 1 || index >= self.files.len() {
            return false;
        }
        self.files.remove(index);
        true
    }

    pub fn has_duplicate_filenames(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.files
            .iter()
            .any(|file| !seen.insert(file.filename.trim()))
    }

    /// Checks the form and produces the request body keyed by trimmed filename.
    pub fn validate(&self) -> Result<NewGist, DraftError> {
        if self.files.is_empty() {
            return Err(DraftError::NoFiles);
        }

        let mut files = BTreeMap::new();
        for (index, file) in self.files.iter().enumerate() {
            let name = file.filename.trim();
            if name.is_empty() {
                return Err(DraftError::EmptyFilename { index });
            }
            if file.content.is_empty() {
                return Err(DraftError::EmptyContent { index });
            }
            let previous = files.insert(
                name.to_string(),
                NewGistFile {
                    content: file.content.clone(),
                },
            );
            if previous.is_some() {
                return Err(DraftError::DuplicateFilename(name.to_string()));
            }
        }

        Ok(NewGist {
            description: self.description.clone(),
            public: self.public,
            files,
        })
    }
}
