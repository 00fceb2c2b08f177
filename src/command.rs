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
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// Executable and base arguments of the reasoner bridge process.
///
/// The bridge hosts the OWL library and the reasoner under test and is
/// driven over its stdin/stdout (see [`crate::bridge`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandArgs {
  /// The command to execute (e.g., "java" or "/path/to/owl-bridge").
  pub command: PathBuf,

  /// Base arguments (e.g., ["-Xmx8g", "-jar", "owl-bridge.jar"]).
  #[serde(default)]
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub args: Vec<String>,
}
