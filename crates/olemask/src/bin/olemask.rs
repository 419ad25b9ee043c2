use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // `RUST_LOG` wins; otherwise report progress and warnings.
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    olemask::cli::run()
}
