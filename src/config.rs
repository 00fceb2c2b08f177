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
use crate::cli::Cli;
use crate::command::CommandArgs;
use crate::error::ConfigError;
use crate::reasoner::ReasonerKind;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::providers::Toml;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of environment overrides, e.g. `POSTCOORD_TEST_PARAMETERS__TRIES=5`.
const ENV_PREFIX: &str = "POSTCOORD_";

// --- Default Values ---
fn default_time_budget_secs() -> u64 {
  60 * 60 * 24
}

// --- Configuration document ---
#[derive(Debug, Deserialize)]
struct ConfigDocument {
  snomed: SnomedSection,
  classifier: ClassifierSection,
  test_parameters: TestParameters,
  output: OutputSection,
}

#[derive(Debug, Deserialize)]
struct SnomedSection {
  #[serde(rename = "OWL_file", alias = "owl_file")]
  owl_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ClassifierSection {
  name: String,
  reasoner_factory: Option<String>,
  bridge: CommandArgs,
}

#[derive(Debug, Deserialize)]
struct TestParameters {
  input: PathBuf,
  iterations: u64,
  jump_size: u64,
  tries: u32,
  #[serde(default = "default_time_budget_secs")]
  time_budget_secs: u64,
}

#[derive(Debug, Deserialize)]
struct OutputSection {
  file_name_tag: String,
}

/// Fully validated run configuration; immutable once built.
#[derive(Debug, Clone)]
pub struct RunConfig {
  pub ontology: PathBuf,
  pub reasoner: ReasonerKind,
  pub bridge: CommandArgs,
  pub input: PathBuf,
  pub iterations: u64,
  pub jump_size: u64,
  pub tries: u32,
  pub time_budget: Duration,
  pub output_tag: String,
}

impl RunConfig {
  /// Loads `path`, then environment overrides, then `overrides`.
  pub fn load(path: &Path, overrides: Figment) -> Result<Self, ConfigError> {
    if !path.is_file() {
      return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let document = match path.extension().and_then(|e| e.to_str()) {
      Some("toml") => Figment::from(Toml::file_exact(path)),
      Some("json") => Figment::from(Json::file_exact(path)),
      _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    let document: ConfigDocument = document
      .merge(Env::prefixed(ENV_PREFIX).split("__"))
      .merge(overrides)
      .extract()
      .map_err(|source| ConfigError::Load {
        path: path.to_path_buf(),
        source: Box::new(source),
      })?;

    Self::validate(document)
  }

  fn validate(
    ConfigDocument {
      snomed,
      classifier,
      test_parameters,
      output,
    }: ConfigDocument,
  ) -> Result<Self, ConfigError> {
    if test_parameters.tries == 0 {
      return Err(ConfigError::InvalidValue {
        key: "test_parameters.tries",
        reason: "must be at least 1".to_string(),
      });
    }
    if test_parameters.jump_size == 0 {
      return Err(ConfigError::InvalidValue {
        key: "test_parameters.jump_size",
        reason: "must be at least 1".to_string(),
      });
    }
    // Synthetic concept numbers go up to jump_size * (iterations + 1).
    test_parameters
      .iterations
      .checked_add(1)
      .and_then(|passes| passes.checked_mul(test_parameters.jump_size))
      .ok_or(ConfigError::RunTooLarge)?;
    if classifier.bridge.command.as_os_str().is_empty() {
      return Err(ConfigError::EmptyBridgeCommand);
    }

    let reasoner = ReasonerKind::select(&classifier.name, classifier.reasoner_factory.as_deref())?;

    Ok(RunConfig {
      ontology: snomed.owl_file,
      reasoner,
      bridge: classifier.bridge,
      input: test_parameters.input,
      iterations: test_parameters.iterations,
      jump_size: test_parameters.jump_size,
      tries: test_parameters.tries,
      time_budget: Duration::from_secs(test_parameters.time_budget_secs),
      output_tag: output.file_name_tag,
    })
  }
}

/// Turns the command-line overrides into a figment layer.
fn cli_overrides(cli: &Cli) -> Figment {
  let mut figment = Figment::new();
  if let Some(name) = &cli.reasoner {
    figment = figment.merge(("classifier.name", name));
  }
  if let Some(iterations) = cli.iterations {
    figment = figment.merge(("test_parameters.iterations", iterations));
  }
  if let Some(jump_size) = cli.jump_size {
    figment = figment.merge(("test_parameters.jump_size", jump_size));
  }
  if let Some(tries) = cli.tries {
    figment = figment.merge(("test_parameters.tries", tries));
  }
  if let Some(secs) = cli.time_budget_secs {
    figment = figment.merge(("test_parameters.time_budget_secs", secs));
  }
  figment
}

impl TryFrom<&Cli> for RunConfig {
  type Error = ConfigError;

  fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
    RunConfig::load(&cli.config, cli_overrides(cli))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;
  use std::fs;

  const TOML: &str = r#"
[snomed]
OWL_file = "snomed.owl"

[classifier]
name = "ELK"

[classifier.bridge]
command = "java"
args = ["-jar", "owl-bridge.jar"]

[test_parameters]
input = "triples.tsv"
iterations = 10
jump_size = 100
tries = 3

[output]
file_name_tag = "results/run"
"#;

  fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
  }

  #[test]
  fn loads_toml_with_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = write(temp.path(), "run.toml", TOML);

    let config = RunConfig::load(&path, Figment::new()).unwrap();

    assert_eq!(config.ontology, PathBuf::from("snomed.owl"));
    assert_eq!(config.reasoner, ReasonerKind::Elk { factory: None });
    assert_eq!(config.bridge.args, ["-jar", "owl-bridge.jar"]);
    assert_eq!(config.iterations, 10);
    assert_eq!(config.jump_size, 100);
    assert_eq!(config.tries, 3);
    assert_eq!(config.time_budget, Duration::from_secs(86_400));
    assert_eq!(config.output_tag, "results/run");
  }

  #[test]
  fn loads_json_and_custom_factory() {
    let temp = tempfile::tempdir().unwrap();
    let json = r#"{
      "snomed": { "owl_file": "snomed.owl" },
      "classifier": {
        "name": "jfact",
        "reasoner_factory": "uk.ac.manchester.cs.jfact.JFactFactory",
        "bridge": { "command": "owl-bridge" }
      },
      "test_parameters": {
        "input": "triples.tsv", "iterations": 1, "jump_size": 2, "tries": 1,
        "time_budget_secs": 60
      },
      "output": { "file_name_tag": "out" }
    }"#;
    let path = write(temp.path(), "run.json", json);

    let config = RunConfig::load(&path, Figment::new()).unwrap();

    assert_eq!(config.reasoner.name(), "jfact");
    assert_eq!(config.reasoner.factory(), "uk.ac.manchester.cs.jfact.JFactFactory");
    assert!(config.bridge.args.is_empty());
    assert_eq!(config.time_budget, Duration::from_secs(60));
  }

  #[test]
  fn cli_overrides_take_precedence() {
    let temp = tempfile::tempdir().unwrap();
    let path = write(temp.path(), "run.toml", TOML);
    let cli = Cli::parse_from([
      "postcoord",
      path.to_str().unwrap(),
      "--reasoner",
      "snorocket",
      "--tries",
      "7",
    ]);

    let config = RunConfig::try_from(&cli).unwrap();

    assert_eq!(config.reasoner, ReasonerKind::Snorocket { factory: None });
    assert_eq!(config.tries, 7);
    assert_eq!(config.iterations, 10);
  }

  #[test]
  fn rejects_zero_tries() {
    let temp = tempfile::tempdir().unwrap();
    let path = write(temp.path(), "run.toml", &TOML.replace("tries = 3", "tries = 0"));

    let err = RunConfig::load(&path, Figment::new()).unwrap_err();
    assert!(matches!(
      err,
      ConfigError::InvalidValue {
        key: "test_parameters.tries",
        ..
      }
    ));
  }

  #[test]
  fn missing_key_is_a_load_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = write(temp.path(), "run.toml", &TOML.replace("jump_size = 100", ""));

    assert!(matches!(
      RunConfig::load(&path, Figment::new()),
      Err(ConfigError::Load { .. })
    ));
  }

  #[test]
  fn unknown_reasoner_without_factory_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = write(temp.path(), "run.toml", &TOML.replace("\"ELK\"", "\"pellet\""));

    assert!(matches!(
      RunConfig::load(&path, Figment::new()),
      Err(ConfigError::UnknownReasoner { .. })
    ));
  }

  #[test]
  fn unsupported_extension_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = write(temp.path(), "run.xml", "<config/>");

    assert!(matches!(
      RunConfig::load(&path, Figment::new()),
      Err(ConfigError::UnsupportedFormat(_))
    ));
  }

  #[test]
  fn rejects_runs_whose_concept_numbers_overflow() {
    let temp = tempfile::tempdir().unwrap();
    let path = write(
      temp.path(),
      "run.toml",
      &TOML.replace("jump_size = 100", &format!("jump_size = {}", u64::MAX / 4)),
    );

    assert!(matches!(
      RunConfig::load(&path, Figment::new()),
      Err(ConfigError::RunTooLarge)
    ));
  }

  #[test]
  fn xml_configuration_is_named_in_the_error() {
    let err = ConfigError::UnsupportedFormat(PathBuf::from("run.xml"));
    assert!(err.to_string().contains("XML"));
  }

  #[test]
  fn missing_file_is_reported() {
    assert!(matches!(
      RunConfig::load(Path::new("/nonexistent/run.toml"), Figment::new()),
      Err(ConfigError::NotFound(_))
    ));
  }
}
