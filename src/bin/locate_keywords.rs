//! Locate keywords in a PDF
//!
//! Prints the highlight areas for every keyword hit as JSON.
//!
//! Usage:
//!   cargo run --release --bin locate_keywords -- manifest.pdf UN1942 Nitrate
//!   cargo run --release --bin locate_keywords -- manifest.pdf Gasoline --threshold 0.8 --no-un
//!
//! Flags:
//!   --exact          exact matching only
//!   --no-fuzzy       disable fuzzy matching
//!   --no-un          disable UN-number patterns
//!   --threshold F    fuzzy confidence threshold (default 0.6)
//!   --pages A-B      search only pages A to B (1-indexed, inclusive)
//!   --max N          return at most N highlights
//!   --lenient        skip pages that fail to parse

use pdf_spotlight::config::ExtractionConfig;
use pdf_spotlight::reader::LopdfSource;
use pdf_spotlight::search::{SearchOptions, TextSearcher};
use std::path::PathBuf;

struct LocateConfig {
    pdf_path: PathBuf,
    keywords: Vec<String>,
    options: SearchOptions,
}

impl LocateConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut positional = Vec::new();
        let mut options = SearchOptions::new();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--exact" => {
                    options = options.with_fuzzy_match(false).with_un_number_pattern(false);
                },
                "--no-fuzzy" => {
                    options = options.with_fuzzy_match(false);
                },
                "--no-un" => {
                    options = options.with_un_number_pattern(false);
                },
                "--lenient" => {
                    options = options.with_extraction(ExtractionConfig::lenient());
                },
                "--threshold" => {
                    i += 1;
                    let value = args.get(i).ok_or("--threshold needs a value")?;
                    let threshold = value
                        .parse::<f32>()
                        .map_err(|e| format!("invalid threshold {:?}: {}", value, e))?;
                    options = options.with_confidence_threshold(threshold);
                },
                "--max" => {
                    i += 1;
                    let value = args.get(i).ok_or("--max needs a value")?;
                    let max = value
                        .parse::<usize>()
                        .map_err(|e| format!("invalid result limit {:?}: {}", value, e))?;
                    options = options.with_max_results(max);
                },
                "--pages" => {
                    i += 1;
                    let value = args.get(i).ok_or("--pages needs a value")?;
                    let (start, end) = parse_page_range(value)?;
                    options = options.with_page_range(start, end);
                },
                flag if flag.starts_with("--") => {
                    return Err(format!("unknown flag {}", flag));
                },
                other => positional.push(other.to_string()),
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        let pdf_path = positional
            .next()
            .map(PathBuf::from)
            .ok_or("missing PDF path")?;
        let keywords: Vec<String> = positional.collect();
        if keywords.is_empty() {
            return Err("no keywords given".to_string());
        }

        Ok(Self {
            pdf_path,
            keywords,
            options,
        })
    }
}

/// Parse `A-B` or a single page `A`.
fn parse_page_range(value: &str) -> Result<(usize, usize), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid page range {:?}: {}", value, e))
    };
    match value.split_once('-') {
        Some((start, end)) => Ok((parse(start)?, parse(end)?)),
        None => {
            let page = parse(value)?;
            Ok((page, page))
        },
    }
}

fn run(config: &LocateConfig) -> Result<String, Box<dyn std::error::Error>> {
    let source = LopdfSource::from_path(&config.pdf_path)?;
    let outcome = TextSearcher::search(&source, &config.keywords, &config.options)?;

    if !outcome.failed_pages.is_empty() {
        eprintln!("Skipped unreadable pages: {:?}", outcome.failed_pages);
    }
    log::info!(
        "{}: {} highlights for {} keywords",
        config.pdf_path.display(),
        outcome.highlights.len(),
        config.keywords.len()
    );

    Ok(serde_json::to_string_pretty(&outcome.highlights)?)
}

fn main() {
    env_logger::init();

    let config = match LocateConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: locate_keywords <file.pdf> <keyword>... [--exact] [--no-fuzzy] [--no-un] [--threshold F] [--pages A-B] [--max N] [--lenient]");
            std::process::exit(2);
        },
    };

    match run(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        },
    }
}
