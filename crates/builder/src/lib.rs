pub mod config;
pub mod pipeline;
pub mod publish;

use std::env;

pub use config::{Config, ConfigError};
pub use pipeline::{BuildPipeline, BuildStep, BuilderError};
pub use publish::{PublishError, publish};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Diagnostics go to stderr so stdout stays a clean record of the commands
/// the worker ran.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(fmt_layer)
        .init();
}
