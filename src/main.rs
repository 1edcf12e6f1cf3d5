use sentinel_fetch::{cli, errors};

fn main() -> errors::AppResult<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new().map_err(|e| errors::AppError::Io(e.to_string()))?;
    rt.block_on(cli::cli())
}
