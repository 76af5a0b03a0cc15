use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod diag;
mod doc;
mod render;
mod rules;
mod runner;
mod schema;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "ospec-validate")]
#[command(about = "OSpec outcome-specification validator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate OSpec documents under the given paths.
    ///
    /// Exits 0 when every document is valid, 1 when any Error-level
    /// diagnostic was found.
    Check {
        /// Root directories to scan, or explicit document paths.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// File-name pattern marking OSpec documents (repeatable;
        /// defaults to *.ospec.yml and *.ospec.yaml).
        #[arg(long = "pattern")]
        patterns: Vec<String>,

        /// Report format.
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Human-readable text, grouped by file.
    Text,
    /// Structured JSON.
    Json,
    /// Test-report XML (one testcase per file).
    Junit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Check {
            paths,
            patterns,
            format,
        } => {
            // 1) Build the schema once; it is shared read-only across all
            //    documents in the run.
            let schema = schema::ospec_schema();

            let patterns = if patterns.is_empty() {
                runner::DEFAULT_PATTERNS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            } else {
                patterns
            };

            // 2) Discover + validate.
            let results = runner::run(&paths, &patterns, &schema)?;

            // 3) Render.
            let report = match format {
                Format::Text => render::render_text(&results),
                Format::Json => render::render_json(&results)?,
                Format::Junit => render::render_junit(&results),
            };
            print!("{}", report);

            // 4) Exit status: the pre-build gate contract.
            if !runner::all_valid(&results) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
