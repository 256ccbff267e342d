//! ocr-relay binary entry point.

use ocr_relay::{api, cli, logging, AppState, Config, CredentialStore, OcrRelayError};
use tracing::info;

#[tokio::main]
async fn main() -> ocr_relay::Result<()> {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("ocr-relay: {}", e);
            eprintln!("Try 'ocr-relay --help' for more information.");
            std::process::exit(2);
        }
    };

    if args.help {
        cli::print_help();
        return Ok(());
    }
    if args.version {
        cli::print_version();
        return Ok(());
    }

    let config =
        Config::load(&args).map_err(|e| OcrRelayError::Configuration(e.to_string()))?;

    logging::init_with(config.log_filter());

    info!("ocr-relay v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "credential store at {}",
        config.server.store_path.display()
    );

    let store = CredentialStore::new(&config.server.store_path);
    let state = AppState::new(config, store);

    api::serve(state).await
}
