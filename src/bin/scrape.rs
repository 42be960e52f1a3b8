//! Scrape pages and print the best text passage or image of each.
//!
//! ```text
//! scrape https://example.com/article --language de
//! scrape https://example.com/gallery --image --json
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `warn`).

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use rs_scraper_graph::{Error, ExtractResult, Extractor, Language, Options, ScoringMode};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "scrape", version, about = "Extract the most relevant text or image from web pages")]
struct Cli {
    /// Page URLs to process
    #[arg(required = true)]
    urls: Vec<String>,

    /// Look for the most prominent image instead of text
    #[arg(long)]
    image: bool,

    /// Target language for text mode (ISO 639-1)
    #[arg(long, short, default_value = "en")]
    language: String,

    /// Print one JSON object per URL instead of plain text
    #[arg(long)]
    json: bool,

    /// Timeout for each page or image fetch, in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Pages processed at once
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Only trust language guesses the detector marks as reliable
    #[arg(long)]
    strict_language: bool,
}

fn print_plain(url: &str, outcome: &Result<ExtractResult, Error>) {
    match outcome {
        Ok(result) => {
            println!("{url}\t{}\t<{}>\t{}", result.message(), result.tag, result.content);
        }
        Err(e) => println!("{url}\tfailed\t{e}"),
    }
}

fn print_json(url: &str, outcome: &Result<ExtractResult, Error>) {
    let value = match outcome {
        Ok(result) => json!({
            "url": url,
            "status": "success",
            "message": result.message(),
            "result": result,
        }),
        Err(e) => json!({
            "url": url,
            "status": "failed",
            "message": e.to_string(),
        }),
    };
    println!("{value}");
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let language: Language = match cli.language.parse() {
        Ok(language) => language,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let options = Options {
        language,
        fetch_timeout: Duration::from_secs(cli.timeout),
        batch_concurrency: cli.concurrency,
        require_reliable_language: cli.strict_language,
        ..Options::default()
    };
    let mode = if cli.image {
        ScoringMode::Image
    } else {
        options.text_mode()
    };

    let extractor = match Extractor::new(options) {
        Ok(extractor) => extractor,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let outcomes = extractor.scrape_many(&cli.urls, mode).await;

    let mut failed = false;
    for (url, outcome) in &outcomes {
        if cli.json {
            print_json(url, outcome);
        } else {
            print_plain(url, outcome);
        }
        failed |= outcome.as_ref().is_err_and(|e| !e.is_not_found());
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
