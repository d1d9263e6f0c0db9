//! # Sitesift CLI Application
//!
//! Command-line interface for the sitesift crawler and chunker.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands:
//!   - `crawl`: Breadth-first crawl of a single website with quality
//!     filtering and duplicate detection
//!   - `chunk`: Split a local text file the way the embedding pipeline
//!     would, for inspecting chunk boundaries
//!
//! ## Features
//!
//! - Configurable page budget, quality threshold, and politeness delay
//! - Progress feedback for long crawls
//! - Both JSON and text output formats

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sitesift::crawler::{CrawlReport, Crawler, CrawlerConfig, HttpFetcher};
use sitesift::pipeline::{ChunkOptions, is_low_value, split_text};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::instrument;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Crawl a website into quality-filtered, chunked content", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl a website and report the accepted pages
    Crawl(CrawlArgs),

    /// Split a text file into embedding-sized chunks
    Chunk(ChunkArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// URL to crawl
    #[arg(required = true)]
    url: String,

    /// Maximum number of pages to visit
    #[arg(short = 'p', long, default_value = "50")]
    max_pages: u32,

    /// Minimum quality score (0-100) a page must reach to be kept
    #[arg(short = 'q', long, default_value = "20")]
    min_quality: u8,

    /// Delay between page fetches in milliseconds
    #[arg(short, long = "delay-ms", default_value = "1000")]
    delay_ms: u64,

    /// Per-fetch timeout in seconds
    #[arg(short, long, default_value = "30")]
    timeout: u64,

    /// Save the crawl report to a JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ChunkArgs {
    /// Text file to split, or `-` for stdin
    #[arg(required = true)]
    file: PathBuf,

    /// Target chunk size in characters
    #[arg(short = 's', long, default_value = "1000")]
    chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(short = 'v', long = "overlap", default_value = "200")]
    chunk_overlap: usize,

    /// Keep chunks the embedding pipeline would drop as low-value
    #[arg(short, long)]
    all: bool,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitesift=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => {
            crawl_command(args).await?;
        }
        Commands::Chunk(args) => {
            chunk_command(args).await?;
        }
    }

    Ok(())
}

#[instrument(skip(args), fields(url = %args.url))]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    let config = CrawlerConfig::builder()
        .max_pages(args.max_pages)
        .min_quality_score(args.min_quality)
        .inter_page_delay_ms(args.delay_ms)
        .fetch_timeout_secs(args.timeout)
        .build()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(format!("Crawling {}...", args.url));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let fetcher = HttpFetcher::new(&config);
    let mut crawler = Crawler::new(fetcher, config);
    let report = crawler.crawl(&args.url).await?;

    spinner.finish_and_clear();

    if let Some(output_file) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(output_file, json)
            .await
            .with_context(|| format!("failed to write {}", output_file.display()))?;
        println!("Saved crawl report to {}", output_file.display());
    }

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => print_crawl_report(&report),
    }

    Ok(())
}

fn print_crawl_report(report: &CrawlReport) {
    let stats = &report.stats;
    println!(
        "Visited {} pages: {} accepted, {} low quality, {} duplicates, {} fetch failures",
        stats.pages_visited,
        stats.pages_accepted,
        stats.skipped_low_quality,
        stats.skipped_duplicate,
        stats.fetch_failures
    );

    for page in &report.pages {
        println!();
        println!("{} (score {})", page.content.url, page.quality_score);
        println!("  Title: {}", page.content.title);
        println!(
            "  {} words, {} headings, {} links{}",
            page.content.word_count,
            page.content.headings.len(),
            page.content.links.len(),
            if page.content.low_confidence {
                ", low confidence"
            } else {
                ""
            }
        );
    }
}

/// Split input text the way the embedding pipeline would, optionally
/// keeping chunks the pipeline would drop
fn chunk_input(text: &str, options: &ChunkOptions, keep_all: bool) -> Vec<String> {
    split_text(text, options)
        .into_iter()
        .filter(|c| keep_all || !is_low_value(c))
        .collect()
}

#[instrument(skip(args), fields(file = %args.file.display()))]
async fn chunk_command(args: ChunkArgs) -> anyhow::Result<()> {
    let options = ChunkOptions {
        chunk_size: args.chunk_size,
        chunk_overlap: args.chunk_overlap,
    };
    options.validate()?;

    let text = if args.file.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(&args.file)
            .await
            .with_context(|| format!("failed to read {}", args.file.display()))?
    };

    let chunks = chunk_input(&text, &options, args.all);

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&chunks)?);
        }
        _ => {
            println!("{} chunks", chunks.len());
            for (i, chunk) in chunks.iter().enumerate() {
                println!();
                println!("--- chunk {} ({} chars) ---", i, chunk.chars().count());
                println!("{chunk}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_no_arguments_shows_help_instead_of_exiting_silently() {
        // Running the binary bare must surface help, not parse successfully
        let err = Cli::try_parse_from(["sitesift"]).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
        assert!(err.to_string().contains("Usage"));
    }

    #[test]
    fn test_help_flag_displays_help() {
        let err = Cli::try_parse_from(["sitesift", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_chunk_accepts_stdin_marker() {
        let cli = Cli::try_parse_from(["sitesift", "chunk", "-"]).unwrap();
        let Commands::Chunk(args) = cli.command else {
            panic!("expected chunk subcommand");
        };
        assert_eq!(args.file.as_os_str(), "-");
        assert_eq!(args.chunk_size, 1000);
        assert_eq!(args.chunk_overlap, 200);
    }

    #[test]
    fn test_crawl_flag_names() {
        let cli = Cli::try_parse_from([
            "sitesift",
            "crawl",
            "https://example.com",
            "--delay-ms",
            "250",
        ])
        .unwrap();
        let Commands::Crawl(args) = cli.command else {
            panic!("expected crawl subcommand");
        };
        assert_eq!(args.delay_ms, 250);
    }

    #[test]
    fn test_chunk_input_filters_low_value_chunks() {
        let options = ChunkOptions {
            chunk_size: 1000,
            chunk_overlap: 200,
        };
        let text = "Too short to keep.";
        assert!(chunk_input(text, &options, false).is_empty());
        assert_eq!(chunk_input(text, &options, true), vec![text.to_string()]);
    }
}
