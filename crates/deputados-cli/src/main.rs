use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use deputados::feed::{FeedError, FeedFormat, write_feed};
use deputados::scraper::WebScraper;
use deputados::sources::load_sources;
use deputados::types::Gender;
use deputados::utils::{CrawlOptions, CrawlStats, DEFAULT_CONCURRENCY};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "deputados")]
#[command(about = "A camara.leg.br deputy profile scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every profile listed in the source files and emit one record per deputy
    Crawl {
        #[arg(long, value_name = "FILE", help = "Source list of female deputies")]
        female: PathBuf,

        #[arg(long, value_name = "FILE", help = "Source list of male deputies")]
        male: PathBuf,

        #[arg(
            long,
            default_value_t = DEFAULT_CONCURRENCY,
            help = "Maximum number of profiles fetched at the same time"
        )]
        concurrency: usize,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "json",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(
            long = "out-file",
            value_name = "PATH",
            help = "Write the feed to a file instead of stdout"
        )]
        out_file: Option<PathBuf>,
    },
    /// Parse a profile page saved on disk
    Parse {
        #[arg(help = "Path of the HTML profile page")]
        file: PathBuf,

        #[arg(long, value_parser = parse_gender, help = "Category label of the deputy")]
        gender: Gender,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn parse_gender(s: &str) -> Result<Gender, String> {
    Gender::from_str(s).map_err(|e| e.to_string())
}

fn feed_format(format: &OutputFormat) -> Option<FeedFormat> {
    match format {
        OutputFormat::Json => Some(FeedFormat::Json),
        OutputFormat::Jsonl => Some(FeedFormat::JsonLines),
        OutputFormat::Text => None,
    }
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Crawl {
            female,
            male,
            concurrency,
            format,
            out_file,
        } => {
            let options = CrawlOptions { concurrency }.validate().unwrap_or_else(|e| {
                log::error!("Invalid args: {e}");
                process::exit(1);
            });

            let mut sources = Vec::new();
            for (path, gender) in [(female, Gender::Feminino), (male, Gender::Masculino)] {
                let loaded = load_sources(&path, gender).unwrap_or_else(|e| {
                    log::error!("{}", e);
                    process::exit(1);
                });
                sources.extend(loaded);
            }

            let scraper = WebScraper::new().unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let report = scraper.fetch_all(sources, &options).await;
            let stats = CrawlStats::from_report(&report);

            match feed_format(&format) {
                Some(feed_format) => {
                    let result = match &out_file {
                        Some(path) => File::create(path)
                            .map_err(FeedError::from)
                            .and_then(|file| {
                                write_feed(BufWriter::new(file), &report.records, feed_format)
                            }),
                        None => write_feed(io::stdout().lock(), &report.records, feed_format),
                    };
                    if let Err(e) = result {
                        log::error!("Error writing feed: {}", e);
                        process::exit(1);
                    }
                    log::info!("{}", stats);
                }
                None => {
                    if report.records.is_empty() {
                        println!("No records to display.");
                    } else {
                        for (i, record) in report.records.iter().enumerate() {
                            println!("{:>3}. {}\n", i + 1, record);
                        }
                    }
                    for failure in &report.failures {
                        println!("  ✗ {} — {}", failure.source.url, failure.error);
                    }
                    print!("{}", stats);
                }
            }
        }

        Commands::Parse {
            file,
            gender,
            format,
        } => {
            let html = fs::read_to_string(&file).unwrap_or_else(|e| {
                log::error!("Error reading {}: {}", file.display(), e);
                process::exit(1);
            });

            let record = deputados::parse_profile(&html, gender).unwrap_or_else(|e| {
                log::error!("Error parsing {}: {}", file.display(), e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json | OutputFormat::Jsonl => serialize_json(&record),
                OutputFormat::Text => println!("{}", record),
            }
        }
    }
}
