#[tokio::main]
async fn main() {
    // Keep terminal output clean by default; RUST_LOG opens the firehose.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulsectl_lib=warn".parse().expect("valid directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = pulsectl_lib::cli::run_cli().await {
        eprintln!("CLI Error: {e}");
        std::process::exit(1);
    }
}
