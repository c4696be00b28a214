mod cli;
mod extract_cmd;
mod grid_cmd;
mod page_span;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        cli::Commands::Extract {
            ref file,
            doc_id,
            ref store,
            ref lang,
            ref pages,
            ref debug_dump,
            dry_run,
        } => extract_cmd::run(
            file,
            doc_id,
            store,
            lang,
            pages.as_deref(),
            debug_dump.as_deref(),
            dry_run,
        ),
        cli::Commands::Grid { ref image, format } => grid_cmd::run(image, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

/// Logs go to stderr so extraction output on stdout stays machine-readable.
/// `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
