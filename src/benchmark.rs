// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::bridge::ReasonerBridge;
use crate::config::RunConfig;
use crate::driver::BenchmarkDriver;
use crate::driver::Plan;
use crate::driver::RunSummary;
use crate::reasoner::Classifier;
use crate::sink::ResultSink;
use crate::sink::output_path;
use crate::triples::TripleSource;
use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use tracing::Instrument;

/// What a finished run reports on stdout.
#[derive(Debug, Serialize)]
pub struct RunReport {
  pub reasoner: String,
  pub output: PathBuf,
  #[serde(flatten)]
  pub summary: RunSummary,
}

/// Main benchmark runner: sets up the bridge, input and output, then hands
/// over to the iteration loop. Every setup failure aborts before the first
/// measurement.
pub async fn run_benchmark(config: RunConfig) -> Result<RunReport> {
  let started = Local::now();
  let span = tracing::info_span!(
    "run_benchmark",
    reasoner = %config.reasoner,
    factory = config.reasoner.factory()
  );

  async {
    tracing::info!("--- Starting post-coordination benchmark ---");
    let mut bridge = ReasonerBridge::spawn(&config.bridge)
      .await
      .context("Failed to start reasoner bridge")?;

    let result = drive(&config, &mut bridge, &started).await;
    bridge.shutdown().await;

    if result.is_ok() {
      tracing::info!("--- Benchmark run complete ---");
    }
    result
  }
  .instrument(span)
  .await
}

async fn drive(
  config: &RunConfig,
  bridge: &mut ReasonerBridge,
  started: &DateTime<Local>,
) -> Result<RunReport> {
  tracing::info!(path = %config.ontology.display(), "Loading ontology file");
  bridge
    .load_ontology(&config.ontology)
    .await
    .with_context(|| format!("Failed to load ontology {}", config.ontology.display()))?;

  bridge
    .create_reasoner(config.reasoner.factory())
    .await
    .context("Failed to create reasoner")?;
  tracing::info!("Created reasoner");

  tracing::debug!(path = %config.input.display(), "Opening triples input");
  let triples = TripleSource::open(&config.input).await?;

  let output = output_path(&config.output_tag, config.reasoner.name(), started);
  let sink = ResultSink::create(&output).await?;
  tracing::info!(path = %output.display(), "Writing results");

  let summary = BenchmarkDriver::new(
    Plan::from(config),
    Classifier::new(config.reasoner.clone()),
    bridge,
    triples,
    sink,
  )
  .run()
  .await?;

  Ok(RunReport {
    reasoner: config.reasoner.name().to_string(),
    output,
    summary,
  })
}
