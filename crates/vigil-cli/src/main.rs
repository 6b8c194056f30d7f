//! vigil-eval - Evaluate a regex rule against an activity fixture.
//!
//! # Usage
//!
//! ```text
//! vigil-eval <rule.{toml,json,yaml}> <fixture.{json,yaml}>
//! ```
//!
//! The fixture holds a `focal` activity, the author's `history`, and an
//! optional `now` timestamp for duration windows. The rule result is printed
//! to stdout as JSON; logs go to stderr (filter with `RUST_LOG`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vigil_core::{RegexRule, RuleConfig};

mod fixture;

use fixture::Fixture;

#[derive(Parser, Debug)]
#[command(name = "vigil-eval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate a regex rule against an activity fixture", long_about = None)]
struct Args {
    /// Rule file (.toml, .json, .yaml or .yml)
    rule: PathBuf,

    /// Fixture with the focal activity and author history (.json, .yaml or .yml)
    fixture: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing to stderr (stdout carries the result)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = RuleConfig::from_file(&args.rule)
        .with_context(|| format!("failed to load rule {}", args.rule.display()))?;
    let (focal, history) = Fixture::from_file(&args.fixture)?.into_parts();

    let rule = RegexRule::new(config, Arc::new(history))?;
    info!(
        rule = rule.name().unwrap_or(RegexRule::KIND),
        criteria = rule.criteria().len(),
        condition = %rule.condition(),
        activity_id = focal.id(),
        "Evaluating rule"
    );

    let result = rule.run(&focal).await?;
    info!(triggered = result.triggered, "{}", result.result);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
