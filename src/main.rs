use calcfield::cli;
use calcfield::error::CalcFieldResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "calcfield")]
#[command(about = "Validate calculated-field formulas for report builders.")]
#[command(long_about = "calcfield - calculated-field formula validation

Formulas combine field references ({field_id}), functions (NAME(...)),
literals and operators. Validation checks, in order:
  1. parentheses are balanced
  2. every {field} exists in the data source
  3. every FUNCTION( exists in the catalog

COMMANDS:
  validate    - Validate a single formula
  check       - Validate every calculated field in report definitions
  functions   - List the function catalog
  watch       - Re-check a report definition on every save

EXAMPLES:
  calcfield validate \"SUM({claim_amount})\" --fields claims.yaml
  calcfield check reports/*.yaml
  calcfield functions --category date")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a single formula
    Validate {
        /// Formula text, e.g. "ROUND({dues} * 12, 2)"
        formula: String,

        /// Report definition providing the data source fields
        #[arg(short, long)]
        fields: Option<PathBuf>,
    },

    #[command(long_about = "Validate every calculated field in report definitions.

Each calculated field is run through the same save rules as the builder:
the alias must be non-empty and the formula must validate.

REPORT FORMAT:
  data_source: Claims
  fields:
    - { id: claim_amount, name: Claim Amount, type: number }
  calculated_fields:
    - alias: Total Claims
      formula: \"SUM({claim_amount})\"")]
    /// Validate every calculated field in report definitions
    Check {
        /// Report definition file(s)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List available formula functions
    Functions {
        /// Category filter: all, math, string, date, aggregate, conditional, conversion
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Re-check a report definition whenever it changes
    Watch {
        /// Report definition file to watch
        file: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> CalcFieldResult<()> {
    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calcfield=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { formula, fields } => cli::validate(formula, fields),
        Commands::Check { files } => cli::check(files),
        Commands::Functions { category } => cli::functions(category),
        Commands::Watch { file, verbose } => cli::watch(file, verbose),
    }
}
