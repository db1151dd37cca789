mod agents;
mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod pipeline;
mod report;
mod trace;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Args;
use config::Config;
use std::path::Path;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    init_logging(args.log_level());

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: tracing::Level) {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

async fn run(args: Args) -> Result<()> {
    if args.init_config {
        return init_config_file();
    }

    // validate() guarantees the query is present past this point.
    let query = args.query.clone().unwrap_or_default();

    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };
    config.merge_with_args(&args);

    let data_path = Path::new(&config.data.path);
    let records = dataset::load_ads_data(data_path)?;

    if args.dry_run {
        return dry_run(&config, &records);
    }

    if config.api_key().is_empty() {
        info!(
            "{} is not set; generative steps will use fallbacks",
            config.model.api_key_env
        );
    }

    println!("🔍 Analyzing: {}", query);

    let pipeline = pipeline::Pipeline::new(config.clone());
    let output = pipeline.run(&query, &records).await;

    write_artifacts(&config, &query, &output)?;
    print_summary(&output);

    Ok(())
}

/// Aggregate only: print the data summary as JSON and skip all model calls.
fn dry_run(config: &Config, records: &[dataset::AdRecord]) -> Result<()> {
    let results = analysis::analyze(records, config.data.window_days, config.data.top_n);
    println!("{}", serde_json::to_string_pretty(&results.summary)?);
    Ok(())
}

fn init_config_file() -> Result<()> {
    let path = Path::new(".adscope.toml");
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

fn write_artifacts(
    config: &Config,
    query: &str,
    output: &pipeline::PipelineOutput,
) -> Result<()> {
    let reports_dir = Path::new(&config.report.reports_dir);
    std::fs::create_dir_all(reports_dir)
        .with_context(|| format!("Failed to create reports dir: {}", reports_dir.display()))?;

    let insights_path =
        report::write_insights_json(reports_dir, query, &output.insights, &output.results)?;
    let creatives_path =
        report::write_creatives_json(reports_dir, query, &output.creatives, &output.insights)?;

    let markdown = report::generate_markdown_report(
        query,
        &config.model.name,
        &output.plan,
        &output.results,
        &output.insights,
        &output.creatives,
    );
    let report_path = reports_dir.join("report.md");
    std::fs::write(&report_path, markdown)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;

    let trace_path = output.trace.save(Path::new(&config.report.logs_dir))?;

    info!("Wrote {}", insights_path.display());
    info!("Wrote {}", creatives_path.display());
    info!("Wrote {}", report_path.display());
    info!("Wrote {}", trace_path.display());

    Ok(())
}

fn print_summary(output: &pipeline::PipelineOutput) {
    let passed = output.insights.iter().filter(|i| i.passed).count();

    println!("\n✨ Analysis complete");
    println!("   Plan steps:        {}", output.plan.steps.len());
    println!(
        "   Insights:          {} ({} validated)",
        output.insights.len(),
        passed
    );
    println!(
        "   Creative concepts: {}",
        output.creatives.creative_concepts.len()
    );
    println!("   Trace steps:       {}", output.trace.step_count());
}
