use std::io;
use std::path::{Path, PathBuf};

use log::{error, info};
use tempfile::TempDir;
use tokio::process::Command;
use url::Url;

use crate::errors::CloneError;
use crate::sources::DirectorySource;

/// Only public GitHub repositories are accepted
pub const GITHUB_PREFIX: &str = "https://github.com/";

/// A shallow clone living in a temp dir, removed on drop
#[derive(Debug)]
pub struct ClonedRepository {
    /// Repository name, e.g. `payroll` for `.../acme/payroll.git`
    pub name: String,
    /// Checkout directory
    pub path: PathBuf,
    _workspace: TempDir,
}

impl ClonedRepository {
    /// A file source over the checkout, labelled with the repository name
    pub fn source(&self) -> DirectorySource {
        DirectorySource::with_label(&self.path, self.name.clone())
    }
}

/// Validate a repository URL and append `.git` when missing
pub fn normalize_repo_url(url: &str) -> Result<String, CloneError> {
    let url = url.trim();
    let invalid = |reason: &str| CloneError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if !url.starts_with(GITHUB_PREFIX) {
        return Err(invalid("must start with 'https://github.com/'"));
    }

    let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    if segments.len() < 2 {
        return Err(invalid("expected https://github.com/<owner>/<repository>"));
    }

    let mut normalized = url.trim_end_matches('/').to_string();
    if !normalized.ends_with(".git") {
        normalized.push_str(".git");
    }
    Ok(normalized)
}

/// Last path segment without `.git`
pub fn repo_name_from_url(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

/// Run `git clone --depth 1` into `dest`
pub async fn run_git_clone(url: &str, dest: &Path) -> Result<(), CloneError> {
    let output = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg(url)
        .arg(dest)
        .output()
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CloneError::GitNotFound,
            _ => CloneError::Io(e),
        })?;

    if !output.status.success() {
        let err = CloneError::NonZeroExit {
            url: url.to_string(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        error!("{}", err);
        return Err(err);
    }

    Ok(())
}

/// Validate `url` and shallow-clone it into a fresh temp dir
pub async fn clone_repository(url: &str) -> Result<ClonedRepository, CloneError> {
    let url = normalize_repo_url(url)?;
    let name = repo_name_from_url(&url);
    let workspace = TempDir::new()?;
    let path = workspace.path().join(&name);

    info!("Cloning repository {} into {}", url, path.display());
    run_git_clone(&url, &path).await?;
    info!("Repository '{}' cloned successfully", name);

    Ok(ClonedRepository {
        name,
        path,
        _workspace: workspace,
    })
}
