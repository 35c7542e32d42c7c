use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tsung_report_cli::OutputFormat;
use tsung_report_cli::commands;
use tsung_report_cli::commands::report::ReportOptions;

#[derive(Parser)]
#[command(name = "tsung-report")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Turn Tsung load-test stats logs into report tables and charts",
    long_about = "tsung-report parses the periodic stats dumps of a Tsung run (tsung.log), \
                  classifies every metric and computes the summary tables and time-series \
                  chart data used to render a load-test report."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute report tables and chart data for a run
    Report {
        /// Path to tsung.log or to the run directory containing it
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Tables to compute (comma-separated ids, default: all)
        #[arg(long, value_delimiter = ',', env = "TSUNG_REPORT_TABLES")]
        tables: Vec<String>,

        /// Charts to compute (comma-separated ids, default: all)
        #[arg(long, value_delimiter = ',', env = "TSUNG_REPORT_CHARTS")]
        charts: Vec<String>,

        /// Extra transactions to leave out of transaction tables and charts
        #[arg(long, value_delimiter = ',', env = "TSUNG_REPORT_EXCLUDE")]
        exclude: Vec<String>,

        /// Do not hide the harness helper transactions (tr_set_var, ...)
        #[arg(long)]
        no_default_excludes: bool,

        /// Report title (default: taken from the run directory name)
        #[arg(long)]
        title: Option<String>,

        /// Write the report as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how every metric name in a log is classified
    Names {
        /// Path to tsung.log or to the run directory containing it
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Extra transactions to mark as excluded
        #[arg(long, value_delimiter = ',', env = "TSUNG_REPORT_EXCLUDE")]
        exclude: Vec<String>,

        /// Do not exclude the harness helper transactions (tr_set_var, ...)
        #[arg(long)]
        no_default_excludes: bool,
    },

    /// List the table and chart ids that can be requested
    Catalog,

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  \
        bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash:  tsung-report completion --shell bash >> ~/.bashrc\n  \
        zsh:   tsung-report completion --shell zsh > ~/.zfunc/_tsung-report\n  \
        fish:  tsung-report completion --shell fish > ~/.config/fish/completions/tsung-report.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);
    tracing::debug!("Output format: {}", cli.format.as_str());

    // Execute the command
    match cli.command {
        Commands::Report {
            path,
            tables,
            charts,
            exclude,
            no_default_excludes,
            title,
            output,
        } => {
            let options = ReportOptions {
                tables,
                charts,
                exclude,
                no_default_excludes,
                title,
            };
            commands::report::execute(&path, &options, output, cli.format)
        }
        Commands::Names {
            path,
            exclude,
            no_default_excludes,
        } => {
            let options = ReportOptions {
                exclude,
                no_default_excludes,
                ..Default::default()
            };
            commands::names::execute(&path, &options, cli.format)
        }
        Commands::Catalog => commands::catalog::execute(cli.format),
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("tsung_report_cli=debug,tsung_report_core=debug")
    } else {
        EnvFilter::new("tsung_report_cli=info,tsung_report_core=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
