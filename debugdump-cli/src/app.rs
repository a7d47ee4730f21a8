use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// debugdump - structured dumps of debuggee values and types
#[derive(Debug, Parser)]
#[command(name = "debugdump", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a scenario file and print its <DebuggerTests> document.
    Run {
        /// Path to the JSON scenario.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Use the legacy dump configuration (dots kept in tags, array elements not expanded).
        #[arg(long)]
        legacy: bool,

        /// Write the document to a file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Dump a type descriptor of the core library.
    Type {
        /// Type name, e.g. System.Int32[], int[,] or System.String.
        #[arg(value_name = "NAME")]
        name: String,

        /// Use the legacy dump configuration.
        #[arg(long)]
        legacy: bool,

        /// Expand a descriptor property (e.g. DebugType.Interfaces). Repeatable.
        #[arg(long, value_name = "PROPERTY")]
        expand: Vec<String>,
    },

    /// List the types of the core library.
    Types {
        /// Filter by namespace.
        #[arg(long)]
        namespace: Option<String>,
    },
}
