use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use examark::cli::convert::ConvertOptions;
use examark::Result;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "examark")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Markdown exams to Canvas QTI packages", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Markdown exams to QTI 2.1 packages
    Convert {
        /// Markdown files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output .qti.zip (a directory when converting several files)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Default points per question
        #[arg(short, long)]
        points: Option<f64>,

        /// Quiz title
        #[arg(short, long)]
        title: Option<String>,

        /// Validate the generated package
        #[arg(long)]
        validate: bool,

        /// Print the parsed quiz as JSON without writing a package
        #[arg(long)]
        preview: bool,

        /// Keep the unzipped package directory
        #[arg(long)]
        keep_dir: bool,
    },

    /// Validate a QTI package (directory or .zip)
    Verify {
        path: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict whether Canvas will import a QTI package
    #[command(name = "emulate-canvas")]
    EmulateCanvas {
        path: PathBuf,

        /// Output the prediction as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check Markdown exams for authoring mistakes
    Lint {
        /// Markdown files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "examark=debug" } else { "examark=warn" };
    let filter = if verbose {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            inputs,
            output,
            points,
            title,
            validate,
            preview,
            keep_dir,
        } => {
            let options = ConvertOptions {
                output,
                points,
                title,
                validate,
                preview,
                keep_dir,
            };
            examark::cli::convert::run(&inputs, &options).await?;
        }

        Commands::Verify { path, json } => {
            examark::cli::verify::run(&path, json).await?;
        }

        Commands::EmulateCanvas { path, json } => {
            examark::cli::emulate::run(&path, json).await?;
        }

        Commands::Lint { inputs } => {
            examark::cli::lint::run(&inputs)?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "examark", &mut io::stdout());
        }
    }

    Ok(())
}
