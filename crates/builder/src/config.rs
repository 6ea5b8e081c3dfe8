use std::{env, path::PathBuf};

use thiserror::Error;

const DEFAULT_SOURCES_DIR: &str = "sources";
const DEFAULT_VCS: &str = "git";
const DEFAULT_PACKAGE_MANAGER: &str = "yarn";

/// Worker configuration, looked up from the environment once at startup and
/// handed to the pipeline as a plain value.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the source repository to clone.
    pub repository_url: String,
    /// Where the repository is checked out, relative to the worker's
    /// current directory unless absolute. Created (with parents) before the
    /// clone step runs.
    pub sources_dir: PathBuf,
    /// Version-control client, invoked as `<vcs> clone <url> <dir>`.
    pub vcs: String,
    /// Package-manager client, invoked bare to install and as `<pm> run
    /// build` to build.
    pub package_manager: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            env::var("REPOSITORY").ok(),
            env::var("SOURCES_DIR").ok(),
            env::var("VCS").ok(),
            env::var("PACKAGE_MANAGER").ok(),
        )
    }

    fn from_vars(
        repository: Option<String>,
        sources_dir: Option<String>,
        vcs: Option<String>,
        package_manager: Option<String>,
    ) -> Result<Self, ConfigError> {
        // A set-but-blank REPOSITORY would otherwise tokenize away and turn
        // the clone step into nonsense; treat it the same as unset.
        let repository_url = repository
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingVar("REPOSITORY"))?;

        Ok(Self {
            repository_url,
            sources_dir: PathBuf::from(
                sources_dir.unwrap_or_else(|| DEFAULT_SOURCES_DIR.to_string()),
            ),
            vcs: vcs.unwrap_or_else(|| DEFAULT_VCS.to_string()),
            package_manager: package_manager.unwrap_or_else(|| DEFAULT_PACKAGE_MANAGER.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_required() {
        let err = Config::from_vars(None, None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("REPOSITORY")));
    }

    #[test]
    fn blank_repository_counts_as_missing() {
        let err = Config::from_vars(Some("  ".to_string()), None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("REPOSITORY")));
    }

    #[test]
    fn optional_vars_fall_back_to_defaults() {
        let config =
            Config::from_vars(Some("https://example.com/site.git".to_string()), None, None, None)
                .unwrap();
        assert_eq!(config.repository_url, "https://example.com/site.git");
        assert_eq!(config.sources_dir, PathBuf::from("sources"));
        assert_eq!(config.vcs, "git");
        assert_eq!(config.package_manager, "yarn");
    }

    #[test]
    fn overrides_are_honored() {
        let config = Config::from_vars(
            Some("https://example.com/site.git".to_string()),
            Some("checkout/site".to_string()),
            Some("hg".to_string()),
            Some("npm".to_string()),
        )
        .unwrap();
        assert_eq!(config.sources_dir, PathBuf::from("checkout/site"));
        assert_eq!(config.vcs, "hg");
        assert_eq!(config.package_manager, "npm");
    }
}
