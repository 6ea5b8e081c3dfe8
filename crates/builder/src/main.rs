use std::error::Error;

use builder::{BuildPipeline, BuilderError, Config, init_tracing};

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!("{}", render(&err));
        std::process::exit(err.exit_code());
    }
}

async fn run() -> Result<(), BuilderError> {
    let config = Config::from_env()?;
    BuildPipeline::new(config).run().await
}

/// One line with every cause, outermost first.
fn render(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(next) = cause {
        message.push_str(&format!(": {next}"));
        cause = next.source();
    }
    message
}
