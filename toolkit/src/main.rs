//! tabscrape CLI - ragged tables to records and CSV
//!
//! # Main Commands
//!
//! ```bash
//! tabscrape run a.json b.json                              # Fetch, extract and write CSV per job file
//! tabscrape extract page.html -t '#films' -H title -H - -H 'year//(\d{4})\\'
//! tabscrape export records.json -o out.csv                 # Records JSON to CSV
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! tabscrape parse input.csv        # Delimited file to JSON rows
//! tabscrape assemble input.csv -H ...  # Delimited file through header templates
//! tabscrape fetch https://...      # Fetch a page (cached)
//! tabscrape grammar                # Show header template syntax
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tabscrape::trace::{log_error, log_info, log_info_indent, log_success, log_warning, CONSOLE};
use tabscrape::{
    parse_file, parse_file_auto, records_to_document, run_job, table_to_records, CsvOptions,
    DelimitedTable, Fetcher, HtmlTable, PageCache, Record, SpecCache, TableJob,
};

#[derive(Parser)]
#[command(name = "tabscrape")]
#[command(about = "Turn ragged HTML/CSV tables into records and CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from an HTML table
    Extract {
        /// Input HTML file
        input: PathBuf,

        /// CSS selector of the table (first match is used)
        #[arg(short, long)]
        table: String,

        /// CSS selector of the rows inside the table (`tr` includes header rows)
        #[arg(short, long, default_value = tabscrape::transform::DEFAULT_ROW_SELECTOR)]
        rows: String,

        /// Header template per column, `-` skips the column
        #[arg(short = 'H', long = "header", required = true)]
        headers: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a delimited file and output JSON rows
    Parse {
        /// Input file
        input: PathBuf,

        /// Delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the data rows of a delimited file through header templates
    Assemble {
        /// Input file (its header line is skipped)
        input: PathBuf,

        /// Delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Header template per column, `-` skips the column
        #[arg(short = 'H', long = "header", required = true)]
        headers: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write records JSON (array of objects) as CSV
    Export {
        /// Input JSON file
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field qualifier, empty for none
        #[arg(short, long, default_value = "\"")]
        qualifier: String,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: String,
    },

    /// Run JSON job files in order
    Run {
        /// Job files; jobs with identical headers share one compiled set
        #[arg(required = true)]
        jobs: Vec<PathBuf>,

        /// Ignore cached pages
        #[arg(long)]
        refresh: bool,

        /// Also print records JSON to stdout
        #[arg(long)]
        print: bool,
    },

    /// Fetch a page through the page cache
    Fetch {
        /// Page URL
        url: String,

        /// Ignore the cached copy
        #[arg(long)]
        refresh: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show header template syntax
    Grammar,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            table,
            rows,
            headers,
            output,
        } => cmd_extract(&input, &table, &rows, &headers, output.as_deref()),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Assemble {
            input,
            delimiter,
            headers,
            output,
        } => cmd_assemble(&input, delimiter, &headers, output.as_deref()),

        Commands::Export {
            input,
            output,
            qualifier,
            delimiter,
        } => cmd_export(&input, output.as_deref(), &qualifier, &delimiter),

        Commands::Run { jobs, refresh, print } => cmd_run(&jobs, refresh, print).await,

        Commands::Fetch { url, refresh, output } => cmd_fetch(&url, refresh, output.as_deref()).await,

        Commands::Grammar => cmd_grammar(),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

/// `-` on the command line means "skip this column"
fn header_templates(headers: &[String]) -> Vec<Option<String>> {
    headers
        .iter()
        .map(|h| if h == "-" { None } else { Some(h.clone()) })
        .collect()
}

fn cmd_extract(
    input: &Path,
    table: &str,
    rows: &str,
    headers: &[String],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("📄 Extracting from: {}", input.display()));

    let html = fs::read_to_string(input)?;
    let source = HtmlTable::new(&html, table, rows)?;
    if source.table_count() > 1 {
        log_warning(format!("{} tables match '{}', using the first", source.table_count(), table));
    }

    let records = table_to_records(&source, &header_templates(headers), Some(&*CONSOLE))?;
    write_records(&records, output)
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("📄 Parsing: {}", input.display()));

    let parsed = match delimiter {
        Some(d) => parse_file(input, d)?,
        None => parse_file_auto(input)?,
    };

    log_info_indent(format!("Encoding: {}", parsed.encoding), 1);
    log_info_indent(
        format!(
            "Delimiter: '{}'{}",
            format_delimiter(parsed.delimiter),
            if delimiter.is_none() { " (auto-detected)" } else { "" }
        ),
        1,
    );
    log_info_indent(format!("Columns: {}", parsed.headers.join(", ")), 1);
    log_success(format!("Parsed {} rows", parsed.rows.len()));

    let json = serde_json::to_string_pretty(&parsed)?;
    write_output(&json, output)
}

fn cmd_assemble(
    input: &Path,
    delimiter: Option<char>,
    headers: &[String],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("📄 Assembling: {}", input.display()));

    let parsed = match delimiter {
        Some(d) => parse_file(input, d)?,
        None => parse_file_auto(input)?,
    };
    let source = DelimitedTable::from(parsed);

    let records = table_to_records(&source, &header_templates(headers), Some(&*CONSOLE))?;
    write_records(&records, output)
}

fn cmd_export(
    input: &Path,
    output: Option<&Path>,
    qualifier: &str,
    delimiter: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("📦 Exporting: {}", input.display()));

    let content = fs::read_to_string(input)?;
    let values: Vec<Value> = serde_json::from_str(&content)?;
    let records: Vec<Record> = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Object(map) => Ok(map),
            _ => Err(format!("Record {} is not an object", i)),
        })
        .collect::<Result<_, _>>()?;

    let options = CsvOptions::from_pairs([("qualifier", qualifier), ("delimiter", delimiter)])?;
    let doc = records_to_document(&records, options)?;
    log_success(format!("{} records, {} columns", doc.len(), doc.headers().len()));

    match output {
        Some(p) => {
            doc.write_to(p)?;
            log_success(format!("💾 Output written to: {}", p.display()));
        }
        None => println!("{}", doc),
    }
    Ok(())
}

async fn cmd_run(job_paths: &[PathBuf], refresh: bool, print: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut cache = SpecCache::new();
    let mut fetcher: Option<Fetcher> = None;

    for job_path in job_paths {
        log_info(format!("⚙️  Running job: {}", job_path.display()));

        let job = TableJob::load(job_path)?;
        if job.is_remote() && fetcher.is_none() {
            fetcher = Some(Fetcher::new(PageCache::from_env())?);
        }

        let result = run_job(&job, fetcher.as_ref(), &mut cache, refresh, Some(&*CONSOLE)).await?;

        if result.written.is_none() {
            log_warning("Job has no output; records were not written");
        }
        if print || result.written.is_none() {
            write_records(&result.records, None)?;
        }
    }

    log_info_indent(
        format!("Header sets compiled: {}, reused: {}", cache.len(), cache.total_hits()),
        1,
    );
    log_success("✨ Done!");
    Ok(())
}

async fn cmd_fetch(url: &str, refresh: bool, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Fetcher::new(PageCache::from_env())?;
    let body = fetcher.fetch(url, refresh, Some(&*CONSOLE)).await?;
    write_output(&body, output)
}

fn cmd_grammar() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", tabscrape::grammar_description());
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_records(records: &[Record], output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(records)?;
    write_output(&json, output)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("💾 Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
