//! Contract harness: replays HTTP golden fixtures against a running service.
//!
//! # Usage
//!
//! ```bash
//! # Run every fixture under contracts/http/
//! cargo run -p contract-harness -- --base-url http://localhost:3120
//!
//! # Only the verification service fixtures
//! cargo run -p contract-harness -- --base-url http://localhost:3120 --service verification
//! ```
//!
//! Exits 0 when all assertions pass, exits 1 when any fail.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

mod fixture;
mod reporter;
mod runner;

use fixture::Fixture;
use reporter::Reporter;
use runner::Runner;

#[derive(Parser)]
#[command(about = "Run HTTP contract assertions against a live service")]
struct Args {
    /// Base URL of the service (e.g. http://localhost:3120)
    #[arg(long)]
    base_url: String,

    /// Run only fixtures under contracts/http/<SERVICE>/
    #[arg(long)]
    service: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let fixtures: Vec<Fixture> = fixture::load_all(&workspace_root(), args.service.as_deref())?;

    if fixtures.is_empty() {
        eprintln!("No fixtures found.");
        return Ok(());
    }

    println!(
        "Running {} fixture(s) against {}",
        fixtures.len(),
        args.base_url
    );
    println!();

    let runner = Runner::new(&args.base_url, Duration::from_secs(args.timeout_secs))?;
    let mut reporter = Reporter::new();

    for f in &fixtures {
        let result = runner.run(f).await;
        reporter.record(f, &result);
    }

    reporter.print_summary();

    if reporter.all_passed() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

/// Directory holding `contracts/`, found by walking up from this crate.
fn workspace_root() -> PathBuf {
    let start = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    start
        .ancestors()
        .find(|p| p.join("contracts").is_dir())
        .unwrap_or(&start)
        .to_path_buf()
}
