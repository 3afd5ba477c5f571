use clap::Parser;
use rollup_relayer_bin::RollupRelayerArgs;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Enable backtraces unless a RUST_BACKTRACE value has already been explicitly provided.
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = rollup_relayer_bin::run(RollupRelayerArgs::parse()).await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
