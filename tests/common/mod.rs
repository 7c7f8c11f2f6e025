/*!
 * Common test utilities for the cobmig test suite
 */

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use cobmig::errors::PipelineError;
use cobmig::sources::{FileSource, SourceEntry, ZipSource};

/// A small COBOL program
pub const SAMPLE_COBOL: &str = "       IDENTIFICATION DIVISION.
       PROGRAM-ID. PAYROLL.
       PROCEDURE DIVISION.
           DISPLAY 'HELLO'.
           STOP RUN.
";

/// Install a test logger once; later calls are ignored
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Build ZIP bytes from (name, content) pairs; names ending in `/` become directories
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Rewrite the compression method of `name` in its local and central headers
pub fn set_compression_method(bytes: &mut [u8], name: &str, method: u16) {
    let name = name.as_bytes();
    for i in 0..bytes.len().saturating_sub(4) {
        let (method_at, name_len_at, name_at) = match &bytes[i..i + 4] {
            [0x50, 0x4b, 0x03, 0x04] => (8, 26, 30),
            [0x50, 0x4b, 0x01, 0x02] => (10, 28, 46),
            _ => continue,
        };
        if i + name_at > bytes.len() {
            continue;
        }
        let len = u16::from_le_bytes([bytes[i + name_len_at], bytes[i + name_len_at + 1]]) as usize;
        if bytes.get(i + name_at..i + name_at + len) == Some(name) {
            bytes[i + method_at..i + method_at + 2].copy_from_slice(&method.to_le_bytes());
        }
    }
}

/// An in-memory archive source
pub fn zip_source(label: &str, entries: &[(&str, &[u8])]) -> ZipSource {
    ZipSource::from_bytes(label, zip_bytes(entries)).unwrap()
}

/// Every (name, content) pair of an archive, in archive order
pub fn read_zip_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        entries.push((file.name().to_string(), content));
    }
    entries
}

/// Content of one archive entry as text
pub fn zip_entry_text(bytes: &[u8], name: &str) -> Option<String> {
    read_zip_entries(bytes)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, content)| String::from_utf8_lossy(&content).to_string())
}

/// A source whose listed files can be made unreadable
pub struct ScriptedSource {
    label: String,
    files: Vec<(String, Option<Vec<u8>>)>,
}

impl ScriptedSource {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            files: Vec::new(),
        }
    }

    pub fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.files.push((name.to_string(), Some(content.to_vec())));
        self
    }

    /// A listed file whose read fails
    pub fn unreadable(mut self, name: &str) -> Self {
        self.files.push((name.to_string(), None));
        self
    }
}

impl FileSource for ScriptedSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn entries(&mut self) -> Result<Vec<SourceEntry>, PipelineError> {
        Ok(self
            .files
            .iter()
            .enumerate()
            .map(|(index, (name, _))| SourceEntry {
                index,
                name: name.clone(),
                is_dir: false,
            })
            .collect())
    }

    fn read(&mut self, entry: &SourceEntry) -> io::Result<Vec<u8>> {
        match &self.files[entry.index].1 {
            Some(content) => Ok(content.clone()),
            None => Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied")),
        }
    }
}
