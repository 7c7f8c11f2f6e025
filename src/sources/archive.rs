use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

use log::debug;
use zip::ZipArchive;

use crate::errors::PipelineError;
use crate::sources::{FileSource, SourceEntry};

/// A ZIP archive held in memory
pub struct ZipSource {
    label: String,
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for ZipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipSource")
            .field("label", &self.label)
            .field("entries", &self.archive.len())
            .finish()
    }
}

impl ZipSource {
    /// Open an archive from raw bytes
    ///
    /// # Returns
    /// * `Err(PipelineError::Container)` if the bytes are not a readable ZIP
    pub fn from_bytes(label: impl Into<String>, bytes: Vec<u8>) -> Result<Self, PipelineError> {
        let label = label.into();
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| PipelineError::Container(e.to_string()))?;
        debug!("Opened archive '{}' with {} entries", label, archive.len());
        Ok(Self { label, archive })
    }

    /// Read an archive from disk, labelled with its file name
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| PipelineError::Container(format!("{}: {}", path.display(), e)))?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(label, bytes)
    }
}

impl FileSource for ZipSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn entries(&mut self) -> Result<Vec<SourceEntry>, PipelineError> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            // Raw access reads the header only; decompression waits for `read`
            let file = self
                .archive
                .by_index_raw(index)
                .map_err(|e| PipelineError::Container(e.to_string()))?;
            entries.push(SourceEntry {
                index,
                name: file.name().to_string(),
                is_dir: file.is_dir(),
            });
        }
        Ok(entries)
    }

    fn read(&mut self, entry: &SourceEntry) -> io::Result<Vec<u8>> {
        let mut file = self.archive.by_index(entry.index).map_err(io::Error::other)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}
