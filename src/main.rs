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
use anyhow::Result;
use clap::Parser;
use postcoord_bench::benchmark::run_benchmark;
use postcoord_bench::cli::Cli;
use postcoord_bench::config::RunConfig;
use postcoord_bench::logging::setup_tracing;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<()> {
  let _log_guard = setup_tracing()?;

  let cli = Cli::parse();
  let main_span = tracing::info_span!("postcoord");

  async {
    tracing::info!(config = %cli.config.display(), "Initializing benchmark run...");

    let config = RunConfig::try_from(&cli)?;
    let report = run_benchmark(config).await?;

    println!("{}", serde_json::to_string(&report)?);
    Ok::<(), anyhow::Error>(())
  }
  .instrument(main_span)
  .await
}
