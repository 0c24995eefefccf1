use clap::Parser;
use order_transform::cli::{self, Args};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();
    cli::setup_logging(args.verbose, args.quiet);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        // Cancel running work on Ctrl+C; the processor stops between files
        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
            cancellation_token.cancel();
        };

        tokio::select! {
            result = cli::run(args, cancellation_token.clone()) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(order_transform::OrdersError::Interrupted {
                    reason: "Processing interrupted by user".to_string(),
                }
                .into())
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
