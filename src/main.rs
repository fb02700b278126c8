use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use sgpt::config::loader::{self, CliArgs};
use sgpt::error::SgptError;
use sgpt::input::{ensure_input, split_chunks};
use sgpt::registry::ProviderRegistry;
use sgpt::transport::HttpTransport;
use sgpt::{logging, runner};

#[tokio::main]
async fn main() -> ExitCode {
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    match run(CliArgs::parse(), cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(SgptError::Cancelled) => {
            eprintln!("Error: {}", SgptError::Cancelled);
            // A blocked stdin reader would keep the runtime from shutting down.
            std::process::exit(i32::from(SgptError::Cancelled.exit_code()));
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: CliArgs, cancel: CancellationToken) -> Result<(), SgptError> {
    let config = loader::load(&args)?;
    logging::init(config.debug);
    tracing::debug!(
        provider = %config.provider,
        model = config.model_id(),
        streaming = config.model_capabilities.streaming,
        "configuration loaded"
    );

    let transport = HttpTransport::new()?.with_cancellation(cancel.clone());
    let registry = ProviderRegistry::with_defaults(&transport, &config.api_key);
    let provider = registry.get(&config.provider)?;

    let input = if config.remaining_args.is_empty() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SgptError::Cancelled),
            input = read_stdin() => input?,
        }
    } else {
        config.remaining_args.join(" ")
    };

    ensure_input(&input, config.has_media())?;
    let chunks = split_chunks(&input, &config.separator, config.has_media());
    let mut stdout = std::io::stdout();
    let processed = runner::run(provider.as_ref(), &config, &chunks, &mut stdout).await?;
    tracing::debug!(chunks = processed, "done");
    Ok(())
}

async fn read_stdin() -> Result<String, SgptError> {
    if std::io::stdin().is_terminal() {
        eprintln!("Reading input from stdin. Press Ctrl+D when finished.");
    }
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .map_err(SgptError::Input)?;
    Ok(input)
}

/// Cancel `token` on the first SIGINT or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::debug!("interrupt received, cancelling");
    token.cancel();
}
