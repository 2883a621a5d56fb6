//! `mailtree` - print the MIME part tree of an email message.
//!
//! # Usage
//!
//! ```bash
//! # Show the part structure of a message
//! mailtree message.eml
//!
//! # Include decoded text content
//! mailtree --content message.eml
//!
//! # Dump the parsed tree as JSON, reading from stdin
//! mailtree --json < message.eml
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod render;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mailtree_mime::{DEFAULT_MAX_DEPTH, EncodingRsRegistry, ParseOptions, parse_with};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mailtree")]
#[command(about = "Print the MIME part tree of an email message", long_about = None)]
#[command(version)]
struct Cli {
    /// Message file (RFC 5322); reads stdin when omitted
    path: Option<PathBuf>,

    /// Deepest multipart nesting to accept
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print the decoded content of text parts
    #[arg(long)]
    content: bool,

    /// Print the whole tree as JSON
    #[arg(long, conflicts_with = "content")]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailtree=info,mailtree_mime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let options = ParseOptions::builder().max_depth(cli.max_depth).build();

    let tree = match &cli.path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            parse_with(BufReader::new(file), &options, &EncodingRsRegistry)
        }
        None => parse_with(io::stdin().lock(), &options, &EncodingRsRegistry),
    }
    .context("failed to parse message")?;

    info!(parts = tree.len(), "parsed message");

    let mut out = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &tree).context("failed to write JSON")?;
        writeln!(out)?;
    } else {
        render::render_tree(&tree, cli.content, &mut out)?;
    }

    Ok(())
}
