use clap::{Parser, ValueEnum};
use log::LevelFilter;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use taxfetch::config::{ConfigFile, RecordFormat};
use taxfetch::pipeline::{Outcome, Pipeline};
use taxfetch::prompt::complete_interactively;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// GenBank flat file
    Genbank,
    /// NCBI GBSet/GBSeq XML
    Gbxml,
}

impl From<FormatArg> for RecordFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Genbank => RecordFormat::GenBank,
            FormatArg::Gbxml => RecordFormat::GbXml,
        }
    }
}

/// Fetch NCBI nucleotide records for a taxon, keep those within a length
/// window, and write `taxid_<id>_filtered.csv` plus `taxid_<id>_plot.png`.
#[derive(Parser, Debug)]
#[command(name = "taxfetch", version, about)]
#[command(long_about = r#"
Fetch NCBI nucleotide records for a taxon, keep those within a length window,
and write taxid_<id>_filtered.csv plus taxid_<id>_plot.png.

Values missing from flags, environment and --config are asked for on the
console.

Example:
  taxfetch --email me@example.org --taxid 3702 --min-length 100 --max-length 1000
"#)]
struct Cli {
    /// Contact email sent to NCBI with every request
    #[arg(long, env = "NCBI_EMAIL")]
    email: Option<String>,

    /// NCBI API key (raises the request rate limit)
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// NCBI taxonomy identifier of the organism
    #[arg(long, value_name = "TAXID")]
    taxid: Option<String>,

    /// Minimum sequence length to keep (inclusive)
    #[arg(long, value_name = "BP")]
    min_length: Option<usize>,

    /// Maximum sequence length to keep (inclusive)
    #[arg(long, value_name = "BP")]
    max_length: Option<usize>,

    /// Records to request in the single fetch (capped at 500)
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Offset of the first record to fetch
    #[arg(long, value_name = "N")]
    start: Option<usize>,

    /// Retrieval format for nucleotide records
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Directory for the CSV and PNG outputs
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// JSON file with any of the above settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fail instead of prompting when values are missing
    #[arg(long)]
    no_input: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn as_config_file(&self) -> ConfigFile {
        ConfigFile {
            email: self.email.clone(),
            api_key: self.api_key.clone(),
            tool: None,
            taxonomic_id: self.taxid.clone(),
            min_length: self.min_length,
            max_length: self.max_length,
            batch_size: self.batch_size,
            start: self.start,
            format: self.format.map(RecordFormat::from),
            output_dir: self.output_dir.clone(),
            base_url: None,
            timeout_secs: None,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let from_file = match &cli.config {
        Some(path) => ConfigFile::from_json_file(path)?,
        None => ConfigFile::default(),
    };
    let mut partial = from_file.overlay(cli.as_config_file());
    if partial.needs_prompt() && !cli.no_input {
        let stdin = io::stdin();
        partial = complete_interactively(partial, &mut stdin.lock(), &mut io::stdout())?;
    }
    let config = partial.into_run_config()?;

    let pipeline = Pipeline::connect(&config)?;
    match pipeline.run(&config)? {
        Outcome::TaxonNotResolved(e) => {
            println!("Could not resolve taxonomic ID {}: {e}", config.query.taxonomic_id);
            println!("No records found. Exiting.");
        }
        Outcome::NoRecords(_) => {
            println!("No records found. Exiting.");
        }
        Outcome::Completed(report) => {
            if cli.json {
                print_json(&report)?;
            } else {
                println!(
                    "{}: kept {} of {} fetched records ({} matches in total)",
                    report.taxon.scientific_name, report.kept, report.fetched, report.total_count
                );
                println!("Saved filtered records to {}", report.csv_path.display());
                println!("Saved plot to {}", report.plot_path.display());
            }
        }
    }
    Ok(())
}
