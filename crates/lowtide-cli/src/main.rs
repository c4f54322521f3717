//! Lowtide CLI
//!
//! 读取提交链接工作簿，统计评论数并生成低互动报表

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use lowtide::pipeline::Runner;
use lowtide::ratelimit::{RateLimiter, RateLimiterConfig};
use lowtide::reddit::{Credentials, RedditClient};
use lowtide::report::ReportWriter;

/// Record low-engagement Reddit submissions into a traffic-sorted report
#[derive(Parser)]
#[command(name = "lowtide", version, about)]
struct Cli {
    /// Input workbook with (URL, traffic) rows
    input: PathBuf,

    /// Output workbook for the categorized report
    output: PathBuf,

    /// Maximum retries after rate-limit failures
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Initial backoff delay in seconds
    #[arg(long, default_value_t = 5.0)]
    initial_delay: f64,

    /// Maximum concurrent API requests
    #[arg(long, default_value_t = 10)]
    max_concurrent: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = RateLimiterConfig {
        max_retries: cli.max_retries,
        initial_delay: cli.initial_delay,
        max_concurrent: cli.max_concurrent,
    };
    if let Err(reason) = config.validate() {
        anyhow::bail!("Invalid rate limiter configuration: {reason}");
    }

    let credentials = Credentials::from_env()?;
    let client = RedditClient::connect(&credentials).await?;
    let runner = Runner::new(
        client,
        RateLimiter::new(config),
        ReportWriter::create(&cli.output),
    );

    let start = Instant::now();
    let result = runner.run(&cli.input, true).await;
    tracing::info!(
        "Total execution time: {:.2} seconds",
        start.elapsed().as_secs_f64()
    );

    result?;
    Ok(())
}
