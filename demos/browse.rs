//! Demo: browse a remote session's filesystem
//!
//! Usage:
//!   cargo run --example browse -- --session ID [--server URL] [--token TOKEN]
//!       [--proxy URL] [--config FILE] [PATH]

mod cli;

use cli::{config_from_parser, usage_and_exit, ArgParser};
use sessionfs::{BrowserHandle, NoticeLevel, Outcome};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: browse --session ID [--server URL] [--token TOKEN] [--proxy URL] [--config FILE] [PATH]";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sessionfs=debug")),
        )
        .init();

    let mut parser = ArgParser::new(USAGE);
    let session = parser
        .take_value(&["--session"])
        .unwrap_or_else(|| usage_and_exit(USAGE));
    let config = config_from_parser(&mut parser, USAGE);
    let path = parser
        .remaining()
        .into_iter()
        .next()
        .unwrap_or_else(|| "/".to_string());

    println!("Attaching to session {} on {}...", session, config.server);
    let (browser, outcome) = match BrowserHandle::connect(&config, &session).await {
        Ok(attached) => attached,
        Err(e) => {
            eprintln!("❌ Failed to attach: {}", e);
            std::process::exit(1);
        }
    };
    report(&outcome);

    if path != "/" {
        match browser.navigate(&path).await {
            Ok(outcome) => report(&outcome),
            Err(e) => eprintln!("❌ {}", e),
        }
    }

    let snapshot = browser.snapshot();
    println!("\n📁 Listing: {}\n", snapshot.current_directory);
    if snapshot.entries.is_empty() {
        println!("  (empty)");
    }
    for entry in &snapshot.entries {
        let icon = if entry.is_navigable() { "📁" } else { "📄" };
        println!(
            "  {} {:<40} {:>10} {}",
            icon,
            entry.name,
            entry.display_size(),
            entry.mod_time
        );
    }

    if let Err(e) = browser.shutdown().await {
        eprintln!("❌ {}", e);
    }
}

fn report(outcome: &Outcome) {
    for notice in &outcome.notices {
        match notice.level {
            NoticeLevel::Success => println!("✅ {}", notice.message),
            NoticeLevel::Warning => println!("⚠️  {}", notice.message),
            NoticeLevel::Error => eprintln!("❌ {}", notice.message),
        }
    }
}
