//! Reading tag names from a tag store.

use crate::error::TagSourceError;
use std::{
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, warn};

/// A read-only store of tag names, such as a git repository.
///
/// No ordering of the returned names is assumed, and they may include tags from unrelated
/// tooling.
pub trait TagSource {
    /// Lists the names of all tags in the store.
    fn tag_names(&self) -> Result<Vec<String>, TagSourceError>;
}

impl TagSource for Vec<String> {
    fn tag_names(&self) -> Result<Vec<String>, TagSourceError> {
        Ok(self.clone())
    }
}

impl TagSource for [&str] {
    fn tag_names(&self) -> Result<Vec<String>, TagSourceError> {
        Ok(self.iter().map(|tag| (*tag).to_owned()).collect())
    }
}

/// Tags of a git repository, listed with `git tag`.
#[derive(Debug, Clone)]
pub struct GitTags {
    repo: PathBuf,
    fetch: bool,
}

impl GitTags {
    /// Tags of the repository at `repo`. If `fetch` is set, tags are fetched from the remotes
    /// first.
    pub fn new(repo: impl Into<PathBuf>, fetch: bool) -> Self {
        Self {
            repo: repo.into(),
            fetch,
        }
    }

    /// The repository directory.
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn git(&self) -> Command {
        let mut command = Command::new("git");
        command.arg("-C").arg(&self.repo);
        command
    }

    /// Best effort: a repository without remotes, or with no network, still has local tags.
    fn fetch_tags(&self) {
        match self.git().args(["fetch", "--tags"]).output() {
            Ok(output) if output.status.success() => {
                debug!(repo = %self.repo.display(), "fetched tags");
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(
                    repo = %self.repo.display(),
                    stderr = %stderr.trim(),
                    "`git fetch --tags` failed, using local tags only"
                );
            }
            Err(err) => {
                warn!(repo = %self.repo.display(), %err, "could not run `git fetch --tags`");
            }
        }
    }
}

impl TagSource for GitTags {
    fn tag_names(&self) -> Result<Vec<String>, TagSourceError> {
        if self.fetch {
            self.fetch_tags();
        }

        let output = self
            .git()
            .arg("tag")
            .output()
            .map_err(|source| TagSourceError::Spawn {
                repo: self.repo.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(TagSourceError::Failed {
                repo: self.repo.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let tags = parse_tag_list(&String::from_utf8_lossy(&output.stdout));
        debug!(repo = %self.repo.display(), count = tags.len(), "listed tags");
        Ok(tags)
    }
}

/// Splits `git tag` output into tag names, dropping blank lines.
fn parse_tag_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_list() {
        let tags = parse_tag_list("v2024.01.18.1\n2024.01.17.5\n\n  tag1 \n");
        assert_eq!(tags, vec!["v2024.01.18.1", "2024.01.17.5", "tag1"]);
    }

    #[test]
    fn test_parse_tag_list_empty() {
        assert!(parse_tag_list("").is_empty());
    }

    #[test]
    fn test_static_sources() {
        let tags = vec!["v2024.01.18.1".to_string()];
        assert_eq!(tags.tag_names().unwrap(), tags);

        let tags: &[&str] = &["a", "b"];
        assert_eq!(tags.tag_names().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_git_tags_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let source = GitTags::new(dir.path(), false);
        // either git is missing or it refuses to run outside a repository
        assert!(source.tag_names().is_err());
    }

    #[test]
    fn test_git_tags_fetch_failure_is_not_the_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = GitTags::new(dir.path(), true);
        // the failed fetch is only logged; the error comes from listing tags
        assert!(matches!(
            source.tag_names(),
            Err(TagSourceError::Failed { .. } | TagSourceError::Spawn { .. })
        ));
    }
}
