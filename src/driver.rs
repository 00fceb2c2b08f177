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
//! The measure-then-grow iteration loop.
use crate::config::RunConfig;
use crate::error::PostcoordError;
use crate::expression::AxiomKind;
use crate::expression::ExpressionBuilder;
use crate::reasoner::Classifier;
use crate::reasoner::OntologyStore;
use crate::reasoner::Reasoner;
use crate::sink::BenchmarkRecord;
use crate::sink::ResultSink;
use crate::triples::NextTriple;
use crate::triples::TripleSource;
use serde::Serialize;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::time::Instant;
use tracing::Instrument;

/// Loop parameters taken from the run configuration.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
  pub iterations: u64,
  pub jump_size: u64,
  pub tries: u32,
  pub time_budget: Duration,
}

impl From<&RunConfig> for Plan {
  fn from(config: &RunConfig) -> Self {
    Plan {
      iterations: config.iterations,
      jump_size: config.jump_size,
      tries: config.tries,
      time_budget: config.time_budget,
    }
  }
}

/// How the iteration loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Completed,
  TimedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub outcome: Outcome,
  /// Measurement passes written to the result file.
  pub passes: u64,
  pub last: Option<BenchmarkRecord>,
  /// Axioms actually applied; can trail the tracked size when the input
  /// ran out.
  pub axioms_added: u64,
}

/// Timed samples of one measurement pass.
#[derive(Debug, Clone)]
pub struct Measurement {
  pub samples: Vec<Duration>,
  pub min: Duration,
}

/// Classifies `tries` times back to back and keeps the fastest run.
pub async fn measure<R: Reasoner>(
  classifier: &Classifier,
  reasoner: &mut R,
  tries: u32,
) -> Result<Measurement, R::Error> {
  let mut samples = Vec::with_capacity(tries as usize);
  let mut min = Duration::MAX;

  for attempt in 1..=tries {
    let elapsed = classifier.classify(&mut *reasoner).await?;
    min = min.min(elapsed);
    samples.push(elapsed);
    tracing::debug!(attempt, elapsed_ms = elapsed.as_millis() as u64, "Finished try");
  }

  Ok(Measurement { samples, min })
}

/// Owns the run state. The backend is borrowed so the caller can release
/// it on every exit path.
pub struct BenchmarkDriver<'a, B, S, W> {
  plan: Plan,
  classifier: Classifier,
  builder: ExpressionBuilder,
  backend: &'a mut B,
  triples: TripleSource<S>,
  sink: ResultSink<W>,
}

impl<'a, B, S, W> BenchmarkDriver<'a, B, S, W>
where
  B: OntologyStore + Reasoner,
  PostcoordError: From<<B as OntologyStore>::Error> + From<<B as Reasoner>::Error>,
  S: AsyncRead + Unpin,
  W: AsyncWrite + Unpin,
{
  pub fn new(
    plan: Plan,
    classifier: Classifier,
    backend: &'a mut B,
    triples: TripleSource<S>,
    sink: ResultSink<W>,
  ) -> Self {
    BenchmarkDriver {
      plan,
      classifier,
      builder: ExpressionBuilder::new(plan.jump_size),
      backend,
      triples,
      sink,
    }
  }

  /// Runs the loop to completion or until the time budget is spent. The sink
  /// is closed whether or not the loop fails.
  pub async fn run(mut self) -> Result<RunSummary, PostcoordError> {
    let result = self.iterate().await;
    let closed = self.sink.close().await;
    let summary = result?;
    closed?;
    Ok(summary)
  }

  async fn iterate(&mut self) -> Result<RunSummary, PostcoordError> {
    let started = Instant::now();
    let mut size = self.backend.axiom_count(AxiomKind::SubClassOf).await?
      + self
        .backend
        .axiom_count(AxiomKind::EquivalentClasses)
        .await?;
    tracing::info!(
      size,
      iterations = self.plan.iterations,
      jump_size = self.plan.jump_size,
      tries = self.plan.tries,
      reasoner = %self.classifier.kind(),
      "Starting benchmark"
    );

    let mut summary = RunSummary {
      outcome: Outcome::Completed,
      passes: 0,
      last: None,
      axioms_added: 0,
    };

    for i in 0..=self.plan.iterations {
      if started.elapsed() > self.plan.time_budget {
        tracing::info!(iteration = i, "Ending because time limit has been reached");
        summary.outcome = Outcome::TimedOut;
        break;
      }

      let span = tracing::info_span!("iteration", i);
      let record = self.step(i, &mut size, &mut summary.axioms_added).instrument(span).await?;
      summary.passes += 1;
      summary.last = Some(record);
    }

    tracing::info!(
      outcome = ?summary.outcome,
      passes = summary.passes,
      axioms_added = summary.axioms_added,
      "Finished benchmark"
    );
    Ok(summary)
  }

  /// One measurement pass, followed by a growth step unless it is the last.
  async fn step(
    &mut self,
    iteration: u64,
    size: &mut u64,
    axioms_added: &mut u64,
  ) -> Result<BenchmarkRecord, PostcoordError> {
    tracing::info!(size = *size, "Current size");

    let measurement = measure(&self.classifier, &mut *self.backend, self.plan.tries).await?;
    let record = BenchmarkRecord {
      size: *size,
      min_time_ms: measurement.min.as_millis() as u64,
    };
    tracing::info!(min_time_ms = record.min_time_ms, "Finished classifying");
    self.sink.append(&record).await?;

    if iteration < self.plan.iterations {
      let added = self.fill(iteration).await?;
      *axioms_added += added;
      if added < self.plan.jump_size {
        tracing::warn!(
          added,
          jump_size = self.plan.jump_size,
          "Input ended early; tracked size still advances by the full jump"
        );
      }
      // Nominal size: advances by the jump even when fewer axioms were added.
      *size = size.saturating_add(self.plan.jump_size);
    }

    Ok(record)
  }

  /// Adds up to `jump_size` expressions, stopping at end of input or at the
  /// first malformed line.
  async fn fill(&mut self, iteration: u64) -> Result<u64, PostcoordError> {
    tracing::debug!("Adding expressions...");
    let mut added = 0;

    for offset in 0..self.plan.jump_size {
      match self.triples.next_triple().await? {
        NextTriple::Triple(triple) => {
          let axiom = self.builder.build(&triple, iteration, offset);
          self.backend.add_axiom(&axiom).await?;
          added += 1;
        }
        NextTriple::Malformed { line_no, line } => {
          tracing::warn!(line_no, ?line, "Malformed triple line, ending this batch");
          break;
        }
        NextTriple::Exhausted => {
          tracing::debug!("Triples input exhausted");
          break;
        }
      }
    }

    Ok(added)
  }
}
