//! Script-Pager CLI
//!
//! Reads a paginate request, or a bare `{"elements": [...], "config": {...}}`
//! document, from a file or stdin and prints the response JSON. Logs go to
//! stderr and honor `RUST_LOG`.

use clap::Parser;
use script_pager::{Element, Engine, PageConfig, Request, RequestId, Response};
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "script-pager", version, about = "Paginate a screenplay")]
struct Cli {
    /// Request JSON file; stdin when omitted
    input: Option<PathBuf>,

    /// Print the Feature Film preset and exit
    #[arg(long)]
    default_config: bool,

    /// Pretty-print the response
    #[arg(long)]
    pretty: bool,
}

/// Input without the message envelope
#[derive(Deserialize)]
struct Document {
    elements: Vec<Element>,
    #[serde(default)]
    config: PageConfig,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("script_pager=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.default_config {
        return emit(&script_pager::default_config(), true);
    }

    let input = match read_input(cli.input.as_ref()) {
        Ok(input) => input,
        Err(err) => {
            error!("cannot read input: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut engine = Engine::new();
    if let Response::Init {
        success: false,
        error,
    } = engine.handle(Request::Init)
    {
        error!("engine failed to start: {}", error.unwrap_or_default());
        return ExitCode::FAILURE;
    }

    let message = match envelope(&input) {
        Ok(message) => message,
        Err(err) => {
            error!("invalid input: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let reply = engine.handle_json(&message);
    let response: serde_json::Value = match serde_json::from_str(&reply) {
        Ok(value) => value,
        Err(err) => {
            error!("engine returned malformed JSON: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let failed = response.get("type").and_then(|t| t.as_str()) == Some("error");
    if let Some(stats) = response.pointer("/result/stats") {
        info!(
            pages = stats.get("pageCount").and_then(|v| v.as_u64()),
            micros = stats.get("durationMicros").and_then(|v| v.as_u64()),
            "done"
        );
    }

    let code = emit(&response, cli.pretty);
    if failed {
        ExitCode::FAILURE
    } else {
        code
    }
}

fn read_input(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Pass messages through; wrap bare documents in a paginate request
fn envelope(input: &str) -> serde_json::Result<String> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    if value.get("type").is_some() {
        return Ok(input.to_string());
    }
    let document: Document = serde_json::from_value(value)?;
    serde_json::to_string(&Request::Paginate {
        request_id: RequestId::from("cli"),
        elements: document.elements,
        config: document.config,
    })
}

fn emit<T: serde::Serialize>(value: &T, pretty: bool) -> ExitCode {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("cannot encode output: {}", err);
            ExitCode::FAILURE
        }
    }
}
