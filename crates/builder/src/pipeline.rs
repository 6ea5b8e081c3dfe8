use std::{io, path::PathBuf};

use executors::{ExecutorError, Invocation};
use strum_macros::Display;
use thiserror::Error;
use tokio::fs;

use crate::config::{Config, ConfigError};

/// The fixed stages of a site build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BuildStep {
    Clone,
    Install,
    Build,
}

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not create sources directory `{}`", path.display())]
    CreateSourcesDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{step} step failed")]
    Step {
        step: BuildStep,
        #[source]
        source: ExecutorError,
    },
}

impl BuilderError {
    /// Process exit code reported for this failure. Child failures keep
    /// their own code; everything that goes wrong before a child runs is a
    /// worker fault.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuilderError::Config(_) | BuilderError::CreateSourcesDir { .. } => 2,
            BuilderError::Step { source, .. } => source.exit_code(),
        }
    }
}

/// Clones the configured repository and builds it with the configured
/// package manager, one child process at a time.
pub struct BuildPipeline {
    config: Config,
}

impl BuildPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs every step in order, stopping at the first failure.
    pub async fn run(&self) -> Result<(), BuilderError> {
        println!("Build started for {}.", self.config.repository_url);

        fs::create_dir_all(&self.config.sources_dir)
            .await
            .map_err(|source| BuilderError::CreateSourcesDir {
                path: self.config.sources_dir.clone(),
                source,
            })?;

        for (step, invocation) in self.plan() {
            tracing::info!("{step}: {}", invocation.line());
            invocation
                .run()
                .await
                .map_err(|source| BuilderError::Step { step, source })?;
        }

        tracing::info!("build finished for {}", self.config.repository_url);
        Ok(())
    }

    /// The command lines for each step. The clone runs in the worker's own
    /// directory so the sources path lands where the configuration says;
    /// install and build run inside the checkout.
    fn plan(&self) -> Vec<(BuildStep, Invocation)> {
        let sources = &self.config.sources_dir;
        vec![
            (
                BuildStep::Clone,
                Invocation::new(format!(
                    "{} clone {} {}",
                    self.config.vcs,
                    self.config.repository_url,
                    sources.display()
                )),
            ),
            (
                BuildStep::Install,
                Invocation::new(self.config.package_manager.clone()).working_dir(sources),
            ),
            (
                BuildStep::Build,
                Invocation::new(format!("{} run build", self.config.package_manager))
                    .working_dir(sources),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn config() -> Config {
        Config {
            repository_url: "https://example.com/site.git".to_string(),
            sources_dir: PathBuf::from("sources"),
            vcs: "git".to_string(),
            package_manager: "yarn".to_string(),
        }
    }

    #[test]
    fn steps_render_lowercase() {
        assert_eq!(BuildStep::Clone.to_string(), "clone");
        assert_eq!(BuildStep::Install.to_string(), "install");
        assert_eq!(BuildStep::Build.to_string(), "build");
    }

    #[test]
    fn plan_follows_clone_install_build_order() {
        let pipeline = BuildPipeline::new(config());
        let steps: Vec<BuildStep> = pipeline.plan().into_iter().map(|(step, _)| step).collect();
        assert_eq!(steps, vec![BuildStep::Clone, BuildStep::Install, BuildStep::Build]);
    }

    #[test]
    fn plan_spells_out_the_command_lines() {
        let pipeline = BuildPipeline::new(config());
        let lines: Vec<String> = pipeline
            .plan()
            .into_iter()
            .map(|(_, invocation)| invocation.line().to_string())
            .collect();
        assert_eq!(
            lines,
            vec![
                "git clone https://example.com/site.git sources",
                "yarn",
                "yarn run build",
            ]
        );
    }

    #[test]
    fn clone_runs_outside_the_checkout_and_the_rest_inside() {
        let pipeline = BuildPipeline::new(config());
        let dirs: Vec<Option<PathBuf>> = pipeline
            .plan()
            .into_iter()
            .map(|(_, invocation)| invocation.current_dir().map(Path::to_path_buf))
            .collect();
        assert_eq!(
            dirs,
            vec![None, Some(PathBuf::from("sources")), Some(PathBuf::from("sources"))]
        );
    }

    #[test]
    fn child_exit_codes_pass_through() {
        let err = BuilderError::Step {
            step: BuildStep::Build,
            source: ExecutorError::Failed {
                line: "yarn run build".to_string(),
                code: 9,
            },
        };
        assert_eq!(err.exit_code(), 9);
    }

    #[test]
    fn worker_faults_exit_with_2() {
        let config_err = BuilderError::Config(ConfigError::MissingVar("REPOSITORY"));
        assert_eq!(config_err.exit_code(), 2);

        let dir_err = BuilderError::CreateSourcesDir {
            path: PathBuf::from("sources"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(dir_err.exit_code(), 2);
    }
}
