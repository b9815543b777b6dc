//! docshift command-line tool
//!
//! Loads a relational schema description from JSON, analyzes its foreign-key
//! graph, and prints a document migration plan.

mod commands;
mod config;
mod error;
mod formatter;
mod loader;

use clap::Parser;
use config::Args;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docshift=info,docshift_core=info".into()),
        )
        .init();

    let args = Args::parse();

    match commands::run(args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
