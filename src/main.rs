use clap::{CommandFactory, Parser};
use labsheet_processor::cli::{args::Args, commands};
use std::process;

/// Exit status when a command fails
const EXIT_FAILURE: i32 = 1;

/// Exit status when a directory ingest left some run sheets unparsed
const EXIT_INCOMPLETE: i32 = 2;

/// Exit status after Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let args = Args::parse();

    // Without a subcommand, show help instead of failing
    if args.command.is_none() {
        let _ = Args::command().print_help();
        println!();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(EXIT_FAILURE);
    });

    let exit_code = runtime.block_on(async {
        let shutdown_signal = async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No signal handler available; let the command run to completion
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = commands::run(args) => match result {
                Ok(_summary) => 0,
                Err(error) => {
                    eprintln!("Error: {:#}", error);
                    exit_code_for(&error)
                }
            },
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, stopping");
                EXIT_INTERRUPTED
            }
        }
    });

    process::exit(exit_code);
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    let incomplete = error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<labsheet_processor::Error>(),
            Some(labsheet_processor::Error::IncompleteIngest { .. })
        )
    });

    if incomplete {
        EXIT_INCOMPLETE
    } else {
        EXIT_FAILURE
    }
}
