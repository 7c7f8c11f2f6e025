use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::sources::repository::GITHUB_PREFIX;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @checks: `.zip` extension, case-insensitive
    pub fn is_zip_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("zip"))
    }

    /// Read a whole file into memory
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating parent directories
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    // @generates: Output path for a result archive
    // @params: output_dir, archive_name
    pub fn output_path<P: AsRef<Path>>(output_dir: P, archive_name: &str) -> PathBuf {
        output_dir.as_ref().join(archive_name)
    }

    /// Detect what kind of input a command-line argument names
    pub fn detect_input_type(input: &str) -> InputType {
        if input.starts_with(GITHUB_PREFIX) {
            return InputType::Repository;
        }

        let path = Path::new(input);
        if Self::dir_exists(path) {
            InputType::Directory
        } else if Self::file_exists(path) && Self::is_zip_file(path) {
            InputType::Archive
        } else {
            InputType::Unknown
        }
    }
}

/// Enum representing the kinds of input the tool accepts
#[derive(Debug, PartialEq, Eq)]
pub enum InputType {
    /// ZIP archive on disk
    Archive,
    /// Local directory
    Directory,
    /// GitHub repository URL
    Repository,
    /// Anything else
    Unknown,
}
