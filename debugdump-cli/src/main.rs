mod app;
mod commands;
mod output;
mod scenario;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();

    // debugdump warnings on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        env_logger::Builder::new()
            .filter_module("debugdump", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Run {
            path,
            legacy,
            output,
        } => commands::run::run(path, *legacy, output.as_deref(), &cli.global),
        Command::Type {
            name,
            legacy,
            expand,
        } => commands::types::dump(name, *legacy, expand, &cli.global),
        Command::Types { namespace } => commands::types::list(namespace.as_deref(), &cli.global),
    }
}
