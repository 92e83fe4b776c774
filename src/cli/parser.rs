use clap::{Parser, Subcommand};

/// Command-line interface definition for scanclock
#[derive(Parser)]
#[command(
    name = "scanclock",
    version = env!("CARGO_PKG_VERSION"),
    about = "Barcode kiosk attendance tracker: scan your name, then IN or OUT",
    long_about = None
)]
pub struct Cli {
    /// Use this configuration file instead of the default one
    #[arg(global = true, long = "config", value_name = "FILE")]
    pub config: Option<String>,

    /// Override the ledger file path
    #[arg(global = true, long = "data", value_name = "FILE")]
    pub data: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the configuration file and an empty ledger
    Init {
        #[arg(long, help = "Overwrite an existing configuration file")]
        force: bool,
    },

    /// View or edit the configuration file
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,
    },

    /// Run the scan kiosk: one scan per line on stdin
    Kiosk {
        #[arg(long = "no-summary", help = "Skip writing summary files on exit")]
        no_summary: bool,
    },

    /// Show who is signed in and the season totals
    Status {
        #[arg(long, help = "List everyone, not only people signed in")]
        all: bool,

        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },

    /// Write the weekly CSV summary files
    Summary {
        #[arg(long, value_name = "DIR", help = "Output folder (default: output_folder)")]
        out: Option<String>,
    },

    /// Delete ledger entries older than a date
    Prune {
        #[arg(long, value_name = "YYYY-MM-DD", help = "Oldest date to keep")]
        before: String,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Sign out everyone still signed in
    SignOutAll {
        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Copy the ledger into the backup folder
    Backup,
}
