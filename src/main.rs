#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use droidline::{run_cmd, timeline_cmd};

#[derive(Parser, Debug)]
#[command(name = "droidline")]
#[command(about = "Timeline extraction and visualization for ALEAPP forensic reports", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set DROIDLINE_LOG)
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the extraction collaborator, then generate timelines
    Run {
        /// Evidence input (zip/tar/gz archive or filesystem directory)
        #[arg(long)]
        input: std::path::PathBuf,
        /// Output directory for the extraction report and timeline artifacts
        #[arg(long, default_value = "Output")]
        output: std::path::PathBuf,
        /// Directory containing the ALEAPP tool (aleapp.py)
        #[arg(long, default_value = "ALEAPP")]
        aleapp_dir: std::path::PathBuf,
        /// Extractor command template (placeholders: {input},{output},{type})
        #[arg(long)]
        template: Option<String>,
        /// Start time (format: YYYY-MM-DD HH:MM:SS)
        #[arg(long, default_value = "2024-07-13 18:00:00")]
        start: String,
        /// End time (format: YYYY-MM-DD HH:MM:SS)
        #[arg(long, default_value = "2024-07-16 18:00:00")]
        end: String,
        /// YAML file with additional time windows to render
        #[arg(long)]
        windows_file: Option<std::path::PathBuf>,
        /// Prompt for further time windows after the first render
        #[arg(long)]
        interactive: bool,
        /// Do not open generated timelines in the default viewer
        #[arg(long)]
        no_open: bool,
        /// Write machine-readable session summary JSON to this file
        #[arg(long)]
        json: Option<std::path::PathBuf>,
    },

    /// Generate timelines from an existing extraction report or store
    Timeline {
        /// Path to an existing extraction report directory
        #[arg(long)]
        report: Option<std::path::PathBuf>,
        /// Path to the record store (defaults to <report>/_Timeline/tl.db)
        #[arg(long)]
        store: Option<std::path::PathBuf>,
        /// Output directory for timeline artifacts
        #[arg(long, default_value = "Output")]
        output: std::path::PathBuf,
        /// Start time (format: YYYY-MM-DD HH:MM:SS)
        #[arg(long, default_value = "2024-07-13 18:00:00")]
        start: String,
        /// End time (format: YYYY-MM-DD HH:MM:SS)
        #[arg(long, default_value = "2024-07-16 18:00:00")]
        end: String,
        /// YAML file with additional time windows to render
        #[arg(long)]
        windows_file: Option<std::path::PathBuf>,
        /// Prompt for further time windows after the first render
        #[arg(long)]
        interactive: bool,
        /// Do not open generated timelines in the default viewer
        #[arg(long)]
        no_open: bool,
        /// Write machine-readable session summary JSON to this file
        #[arg(long)]
        json: Option<std::path::PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("DROIDLINE_LOG").unwrap_or_else(|_| {
        if verbose { "droidline=debug".to_string() } else { "droidline=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            aleapp_dir,
            template,
            start,
            end,
            windows_file,
            interactive,
            no_open,
            json,
        } => run_cmd::run(
            input,
            output,
            aleapp_dir,
            template,
            start,
            end,
            windows_file,
            interactive,
            no_open,
            json,
        ),
        Commands::Timeline {
            report,
            store,
            output,
            start,
            end,
            windows_file,
            interactive,
            no_open,
            json,
        } => timeline_cmd::run(
            report,
            store,
            output,
            start,
            end,
            windows_file,
            interactive,
            no_open,
            json,
        ),
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
