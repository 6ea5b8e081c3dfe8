use std::{
    io,
    path::{Path, PathBuf},
    process::ExitStatus,
};

use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("empty command line")]
    EmptyCommandLine,
    #[error("failed to spawn `{line}`: {source}")]
    Spawn {
        line: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting on `{line}`: {source}")]
    Wait {
        line: String,
        #[source]
        source: io::Error,
    },
    #[error("`{line}` exited with code {code}")]
    Failed { line: String, code: i32 },
}

impl ExecutorError {
    /// Exit code the worker should terminate with if this failure ends the
    /// build: the child's own code where there is one, shell conventions
    /// otherwise (127 for a missing program, 126 for other launch faults).
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutorError::EmptyCommandLine => 2,
            ExecutorError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => 127,
            ExecutorError::Spawn { .. } | ExecutorError::Wait { .. } => 126,
            ExecutorError::Failed { code, .. } => *code,
        }
    }
}

/// A single external command: a whitespace-delimited command line plus the
/// directory it runs in.
///
/// The line is tokenized on whitespace with no shell involvement, so there is
/// no quoting or escaping support; callers must avoid arguments that contain
/// embedded whitespace. Routing through a shell would change those semantics
/// and open the command line up to injection, so none is invoked.
#[derive(Debug, Clone)]
pub struct Invocation {
    line: String,
    cwd: Option<PathBuf>,
}

impl Invocation {
    /// An invocation that runs in the caller's current directory.
    pub fn new(line: impl Into<String>) -> Self {
        Invocation {
            line: line.into(),
            cwd: None,
        }
    }

    /// Overrides the directory the child runs in. The directory must exist
    /// by the time [`run`](Self::run) is called.
    pub fn working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn tokens(&self) -> Vec<&str> {
        self.line.split_whitespace().collect()
    }

    /// Runs the command and waits for the child to terminate.
    ///
    /// The literal command line is echoed to stdout prefixed with `"$ "`
    /// before the child starts, and the child inherits the worker's stdio,
    /// so its output streams straight through to the operator — nothing is
    /// captured. Returns `Ok(())` only for exit code 0; a child killed by a
    /// signal counts as `Failed` with code 128 + the signal number.
    ///
    /// There is no timeout and no cancellation: once launched the child runs
    /// to completion or failure, and its handle lives exactly as long as
    /// this call.
    pub async fn run(&self) -> Result<(), ExecutorError> {
        let tokens = self.tokens();
        let Some((program, args)) = tokens.split_first() else {
            return Err(ExecutorError::EmptyCommandLine);
        };

        println!("$ {}", self.line);

        let mut command = Command::new(program);
        command.args(args).kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| ExecutorError::Spawn {
            line: self.line.clone(),
            source,
        })?;

        let status = child.wait().await.map_err(|source| ExecutorError::Wait {
            line: self.line.clone(),
            source,
        })?;
        tracing::debug!("`{}` finished: {status}", self.line);

        if status.success() {
            Ok(())
        } else {
            Err(ExecutorError::Failed {
                line: self.line.clone(),
                code: exit_code(status),
            })
        }
    }
}

/// Collapses an exit status into one code: the child's own exit code, or
/// 128 + N for a child killed by signal N.
fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(1)
}
