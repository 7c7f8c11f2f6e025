use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::errors::PipelineError;
use crate::sources::{FileSource, SourceEntry};

/// A directory tree on disk; any `.git` directory is skipped
#[derive(Debug)]
pub struct DirectorySource {
    label: String,
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl DirectorySource {
    /// Use the directory name as the label
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let label = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        Self::with_label(root, label)
    }

    pub fn with_label<P: AsRef<Path>>(root: P, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            root: root.as_ref().to_path_buf(),
            files: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to the root with `/` separators
    fn relative_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl FileSource for DirectorySource {
    fn label(&self) -> &str {
        &self.label
    }

    fn entries(&mut self) -> Result<Vec<SourceEntry>, PipelineError> {
        if !self.root.is_dir() {
            return Err(PipelineError::Container(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        self.files.clear();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == ".git"));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(PipelineError::Container(e.to_string())),
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                self.files.push(entry.into_path());
            }
        }

        debug!("Found {} files under {}", self.files.len(), self.root.display());

        Ok(self
            .files
            .iter()
            .enumerate()
            .map(|(index, path)| SourceEntry {
                index,
                name: self.relative_name(path),
                is_dir: false,
            })
            .collect())
    }

    fn read(&mut self, entry: &SourceEntry) -> io::Result<Vec<u8>> {
        let path = self
            .files
            .get(entry.index)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry #{}", entry.index)))?;
        fs::read(path)
    }
}
