//! Demo: Parsing a saved pickup notification with tracing enabled.
//!
//! Reads an HTML file, or a raw `.eml` message, and prints the extracted fields and
//! the task event a handler would emit.
//!
//! # Usage
//!
//! ```bash
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=inbox_watch=debug
//!
//! cargo run --example parse_notification -- tests/fixtures/dhl_pickup.html
//! cargo run --example parse_notification -- notification.eml --text-pattern
//! ```

use inbox_watch::body::html_body_from_mime;
use inbox_watch::dedup::NoDedup;
use inbox_watch::{
    LocationStrategy, OutputEvent, PickupHandler, PickupMessage, PickupWatchConfig,
};
use std::env;
use std::fs;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("inbox_watch=info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: parse_notification <file.html|file.eml> [--text-pattern]")?;
    let strategy = if args.any(|arg| arg == "--text-pattern") {
        LocationStrategy::TextPattern
    } else {
        LocationStrategy::Structural
    };

    let raw = fs::read(&path)?;
    let html = if path.ends_with(".eml") {
        html_body_from_mime(&raw)?
    } else {
        String::from_utf8(raw)?
    };

    tracing::info!(path = %path, ?strategy, "Parsing notification");

    let config = PickupWatchConfig::builder()
        .sender("order-update@amazon.de")
        .subject("Ihr Paket kann bei DHL")
        .location_strategy(strategy)
        .build()?;
    let handler = PickupHandler::new(config);
    let now = chrono::Utc::now();

    println!("Search filter: {}", handler.search_filter(&now));

    let tasks = handler.process(&[PickupMessage::new(path, html)], now, &mut NoDedup);
    for task in tasks {
        println!("\n{}\n", task.notes);
        println!("{}", serde_json::to_string_pretty(&OutputEvent::task(task))?);
    }

    Ok(())
}
