//! Reads HTML from stdin and prints the best text passage as JSON.
//!
//! Usage: `extract_stdin [LANGUAGE] < page.html` (language defaults to `en`).

use std::io::{self, Read};
use std::process::ExitCode;

use rs_scraper_graph::{extract_text_bytes, Language};
use serde::Serialize;

#[derive(Serialize)]
struct Output {
    status: &'static str,
    message: String,
    tag: Option<String>,
    content: String,
    language: String,
}

fn main() -> ExitCode {
    let code = std::env::args().nth(1).unwrap_or_else(|| "en".to_string());
    let language: Language = match code.parse() {
        Ok(language) => language,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let mut html = Vec::new();
    if io::stdin().read_to_end(&mut html).is_err() {
        eprintln!("Failed to read from stdin");
        return ExitCode::FAILURE;
    }

    let output = match extract_text_bytes(&html, language) {
        Ok(result) => Output {
            status: "success",
            message: result.message().to_string(),
            tag: Some(result.tag),
            content: result.content,
            language: language.to_string(),
        },
        Err(e) => Output {
            status: "failed",
            message: e.to_string(),
            tag: None,
            content: String::new(),
            language: language.to_string(),
        },
    };

    println!("{}", serde_json::to_string(&output).unwrap_or_default());
    ExitCode::SUCCESS
}
