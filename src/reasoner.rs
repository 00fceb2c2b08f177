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
//! The narrow interface to the external ontology library and reasoners.
use crate::error::ConfigError;
use crate::expression::AxiomKind;
use crate::expression::EquivalenceAxiom;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

const HERMIT_FACTORY: &str = "org.semanticweb.HermiT.Reasoner.ReasonerFactory";
const ELK_FACTORY: &str = "org.semanticweb.elk.owlapi.ElkReasonerFactory";
const SNOROCKET_FACTORY: &str = "au.csiro.snorocket.owlapi.SnorocketReasonerFactory";
const FACT_PLUS_PLUS_FACTORY: &str = "uk.ac.manchester.cs.factplusplus.owlapiv3.FaCTPlusPlusReasonerFactory";

/// The reasoner under test, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReasonerKind {
  Hermit,
  Elk { factory: Option<String> },
  Snorocket { factory: Option<String> },
  FactPlusPlus { factory: Option<String> },
  /// Any other name, instantiated from an explicit factory reference.
  Custom { name: String, factory: String },
}

impl ReasonerKind {
  /// Resolves `classifier.name` (case-insensitive) and the optional
  /// `classifier.reasoner_factory`. HermiT always uses its own factory.
  pub fn select(name: &str, factory: Option<&str>) -> Result<Self, ConfigError> {
    let factory = factory.map(str::trim).filter(|f| !f.is_empty());
    let owned = || factory.map(str::to_string);

    match name.trim().to_ascii_lowercase().as_str() {
      "hermit" => Ok(ReasonerKind::Hermit),
      "elk" => Ok(ReasonerKind::Elk { factory: owned() }),
      "snorocket" => Ok(ReasonerKind::Snorocket { factory: owned() }),
      "fact++" | "factplusplus" => Ok(ReasonerKind::FactPlusPlus { factory: owned() }),
      _ => match factory {
        Some(factory) => Ok(ReasonerKind::Custom {
          name: name.trim().to_string(),
          factory: factory.to_string(),
        }),
        None => Err(ConfigError::UnknownReasoner {
          name: name.to_string(),
        }),
      },
    }
  }

  /// Name used in logs and in the output file name.
  pub fn name(&self) -> &str {
    match self {
      ReasonerKind::Hermit => "hermit",
      ReasonerKind::Elk { .. } => "elk",
      ReasonerKind::Snorocket { .. } => "snorocket",
      ReasonerKind::FactPlusPlus { .. } => "fact++",
      ReasonerKind::Custom { name, .. } => name.as_str(),
    }
  }

  /// Factory reference handed to the bridge at startup.
  pub fn factory(&self) -> &str {
    match self {
      ReasonerKind::Hermit => HERMIT_FACTORY,
      ReasonerKind::Elk { factory } => factory.as_deref().unwrap_or(ELK_FACTORY),
      ReasonerKind::Snorocket { factory } => factory.as_deref().unwrap_or(SNOROCKET_FACTORY),
      ReasonerKind::FactPlusPlus { factory } => {
        factory.as_deref().unwrap_or(FACT_PLUS_PLUS_FACTORY)
      }
      ReasonerKind::Custom { factory, .. } => factory.as_str(),
    }
  }

  /// Snorocket reports completion before its taxonomy is visible and needs
  /// an explicit synchronization after each classification.
  pub fn needs_sync(&self) -> bool {
    matches!(self, ReasonerKind::Snorocket { .. })
  }
}

impl fmt::Display for ReasonerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Ontology operations the benchmark needs from the external library.
#[allow(async_fn_in_trait)]
pub trait OntologyStore {
  type Error: std::error::Error + Send + Sync + 'static;

  async fn axiom_count(&mut self, kind: AxiomKind) -> Result<u64, Self::Error>;

  async fn add_axiom(&mut self, axiom: &EquivalenceAxiom) -> Result<(), Self::Error>;
}

/// Reasoner operations the benchmark needs from the external library.
#[allow(async_fn_in_trait)]
pub trait Reasoner {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Computes the class hierarchy.
  async fn precompute_inferences(&mut self) -> Result<(), Self::Error>;

  async fn flush(&mut self) -> Result<(), Self::Error>;

  async fn synchronize(&mut self) -> Result<(), Self::Error>;
}

/// Times one full classification of the configured reasoner.
#[derive(Debug, Clone)]
pub struct Classifier {
  kind: ReasonerKind,
}

impl Classifier {
  pub fn new(kind: ReasonerKind) -> Self {
    Classifier { kind }
  }

  pub fn kind(&self) -> &ReasonerKind {
    &self.kind
  }

  /// Runs precompute, flush and, where needed, synchronize, and returns the
  /// wall-clock time of the whole sequence.
  pub async fn classify<R: Reasoner>(&self, reasoner: &mut R) -> Result<Duration, R::Error> {
    let started = Instant::now();
    tracing::debug!("Start classifying...");

    reasoner.precompute_inferences().await?;
    reasoner.flush().await?;
    if self.kind.needs_sync() {
      reasoner.synchronize().await?;
    }

    let elapsed = started.elapsed();
    tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Finished classifying");
    Ok(elapsed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct Recorder {
    calls: Vec<&'static str>,
  }

  impl Reasoner for Recorder {
    type Error = std::io::Error;

    async fn precompute_inferences(&mut self) -> Result<(), Self::Error> {
      tokio::time::sleep(Duration::from_millis(40)).await;
      self.calls.push("precompute");
      Ok(())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
      self.calls.push("flush");
      Ok(())
    }

    async fn synchronize(&mut self) -> Result<(), Self::Error> {
      tokio::time::sleep(Duration::from_millis(5)).await;
      self.calls.push("sync");
      Ok(())
    }
  }

  #[test]
  fn selects_named_reasoners_case_insensitively() {
    assert_eq!(ReasonerKind::select("HermiT", None).unwrap(), ReasonerKind::Hermit);
    assert_eq!(
      ReasonerKind::select("FaCT++", None).unwrap(),
      ReasonerKind::FactPlusPlus { factory: None }
    );
    assert_eq!(ReasonerKind::select("ELK", None).unwrap().factory(), ELK_FACTORY);
  }

  #[test]
  fn configured_factory_overrides_all_but_hermit() {
    let elk = ReasonerKind::select("elk", Some("my.Elk")).unwrap();
    assert_eq!(elk.factory(), "my.Elk");

    let hermit = ReasonerKind::select("hermit", Some("my.Other")).unwrap();
    assert_eq!(hermit.factory(), HERMIT_FACTORY);
  }

  #[test]
  fn unknown_name_needs_a_factory() {
    let err = ReasonerKind::select("jfact", None).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownReasoner { name } if name == "jfact"));

    let custom = ReasonerKind::select("jfact", Some("uk.ac.manchester.cs.jfact.JFactFactory")).unwrap();
    assert_eq!(custom.name(), "jfact");
    assert_eq!(custom.factory(), "uk.ac.manchester.cs.jfact.JFactFactory");
    assert!(!custom.needs_sync());
  }

  #[tokio::test(start_paused = true)]
  async fn snorocket_synchronizes_inside_the_timed_section() {
    let classifier = Classifier::new(ReasonerKind::Snorocket { factory: None });
    let mut reasoner = Recorder::default();

    let elapsed = classifier.classify(&mut reasoner).await.unwrap();

    assert_eq!(reasoner.calls, ["precompute", "flush", "sync"]);
    assert!(elapsed >= Duration::from_millis(45) && elapsed < Duration::from_millis(50));
  }

  #[tokio::test(start_paused = true)]
  async fn other_reasoners_skip_synchronize() {
    let classifier = Classifier::new(ReasonerKind::Elk { factory: None });
    let mut reasoner = Recorder::default();

    let elapsed = classifier.classify(&mut reasoner).await.unwrap();

    assert_eq!(reasoner.calls, ["precompute", "flush"]);
    assert!(elapsed >= Duration::from_millis(40) && elapsed < Duration::from_millis(45));
  }
}
