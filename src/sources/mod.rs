/*!
 * Input containers for the pipeline.
 *
 * The pipeline only needs to list entries and read their bytes, so ZIP
 * archives, local directories and cloned repositories all sit behind the
 * same `FileSource` trait:
 * - `archive::ZipSource` - an in-memory ZIP archive
 * - `directory::DirectorySource` - a directory tree on disk
 * - `repository` - clones a GitHub repository into a temp dir for `DirectorySource`
 */

use std::io;

use crate::errors::PipelineError;

pub mod archive;
pub mod directory;
pub mod repository;

pub use archive::ZipSource;
pub use directory::DirectorySource;
pub use repository::{ClonedRepository, clone_repository, normalize_repo_url};

/// One entry of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Position in the container's listing
    pub index: usize,
    /// Path relative to the container root, `/` separated
    pub name: String,
    /// Directory entries are listed but never read
    pub is_dir: bool,
}

/// A container of files the pipeline can enumerate and read
pub trait FileSource: Send {
    /// Name of the input, used to derive output names
    fn label(&self) -> &str;

    /// List every entry in container order
    ///
    /// # Returns
    /// * `Err(PipelineError::Container)` if the container cannot be enumerated
    fn entries(&mut self) -> Result<Vec<SourceEntry>, PipelineError>;

    /// Read the full contents of one entry
    fn read(&mut self, entry: &SourceEntry) -> io::Result<Vec<u8>>;
}
