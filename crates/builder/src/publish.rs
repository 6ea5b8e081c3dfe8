use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publishing build output is not supported by this worker")]
    Unsupported,
}

/// Hands the finished build output to whatever serves it.
///
/// No storage backend is wired up yet, so every call reports
/// [`PublishError::Unsupported`]. The signature is the extension point: a
/// future backend receives the directory the build step produced.
pub async fn publish(_output_dir: &Path) -> Result<(), PublishError> {
    Err(PublishError::Unsupported)
}
