//! Veritype - type-complexity analysis CLI
//!
//! Flags TypeScript declarations whose structural type complexity calls
//! for an explicit runtime-validation annotation.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = veritype::cli::Cli::parse();
    veritype::cli::run(cli)
}
