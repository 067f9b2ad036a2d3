use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use recast_core::{map_record, MapError, MappingTable, SourceDocument};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "recast")]
#[command(about = "Reshape harvested record metadata into item-type trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Map one harvested record into the shape its item-type schema declares
    Map {
        /// Harvested record JSON file
        #[arg(long)]
        record: PathBuf,

        /// Item-type schema JSON file
        #[arg(long)]
        schema: PathBuf,

        /// Mapping table JSON file (source-paths / target-paths)
        #[arg(long)]
        mapping: PathBuf,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Check that every mapping rule's target path is defined
    Validate {
        /// Mapping table JSON file
        #[arg(long)]
        mapping: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Map {
            record,
            schema,
            mapping,
            output,
            format,
        } => {
            let text = std::fs::read_to_string(&record)
                .with_context(|| format!("Failed to read record file: {}", record.display()))?;
            let document = SourceDocument::from_str(&text)
                .with_context(|| format!("Failed to parse record from: {}", record.display()))?;
            let schema: serde_json::Value = read_json(&schema)?;
            let table: MappingTable = read_json(&mapping)?;

            let tree = map_record(&document, &schema, &table)
                .map_err(|e| anyhow::Error::from(e).context("Mapping failed"))?;

            write_json(&tree, output.as_ref(), format)?;
        }
        Commands::Validate { mapping } => {
            let table: MappingTable = read_json(&mapping)?;
            match table.validate() {
                Ok(()) => eprintln!("mapping is valid"),
                Err(MapError::InvalidMapping { violations }) => {
                    for violation in &violations {
                        eprintln!("{violation}");
                    }
                    anyhow::bail!("mapping validation failed with {} violation(s)", violations.len());
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse JSON from: {}", path.display()))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;

    Ok(())
}
