//! Plan one trip from the command line
//!
//! Usage: `plan_trip [request text...]`
//!
//! Joins the arguments into a trip request (falling back to a sample request
//! when none are given), runs the three-stage pipeline once and prints the
//! final itinerary to stdout. Logs go to stderr, filtered by `RUST_LOG`.

use anyhow::Context;
use travel_planner_backend::config::Config;
use travel_planner_backend::orchestrator::config::OrchestratorConfig;
use travel_planner_backend::orchestrator::constants::SAMPLE_TRIP_REQUEST;
use travel_planner_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = if args.is_empty() {
        tracing::info!("No request given, using the sample trip request");
        SAMPLE_TRIP_REQUEST.to_string()
    } else {
        args.join(" ")
    };

    let state = AppState::new(Config::from_env(), OrchestratorConfig::from_env())?;
    let pipeline = state
        .pipeline()
        .await
        .context("Failed to build the travel pipeline")?;

    let run = pipeline
        .run(&request)
        .await
        .context("Trip planning failed")?;

    for stage in &run.stages {
        tracing::info!(
            stage = %stage.stage,
            tool_call_count = stage.tool_calls.len(),
            completed_at = %stage.completed_at,
            "Stage summary"
        );
    }

    println!("{}", run.result);
    Ok(())
}
