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
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Incremental classification benchmark over SNOMED CT post-coordinated expressions"
)]
pub struct Cli {
  /// Run configuration file (.toml or .json).
  /// Settings can also be overridden with POSTCOORD_<SECTION>__<KEY> variables.
  #[arg(value_name = "CONFIG")]
  pub config: PathBuf,

  /// Reasoner selector: hermit, elk, snorocket, fact++ or any name backed by
  /// classifier.reasoner_factory.
  #[arg(long, env = "POSTCOORD_REASONER")]
  pub reasoner: Option<String>,

  /// Number of growth iterations (the run measures iterations + 1 times).
  #[arg(long, env = "POSTCOORD_ITERATIONS")]
  pub iterations: Option<u64>,

  /// Expressions added per iteration.
  #[arg(long, env = "POSTCOORD_JUMP_SIZE")]
  pub jump_size: Option<u64>,

  /// Classifications per measurement; the minimum is recorded.
  #[arg(long, env = "POSTCOORD_TRIES")]
  pub tries: Option<u32>,

  /// Wall-clock budget for the whole run, checked between iterations.
  #[arg(long, env = "POSTCOORD_TIME_BUDGET_SECS")]
  pub time_budget_secs: Option<u64>,
}
