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
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error enum for the postcoord library.
#[derive(Error, Debug)]
pub enum PostcoordError {
  #[error("Configuration error")]
  Config(#[from] ConfigError),

  #[error("Triples input error")]
  Input(#[from] InputError),

  #[error("Reasoner bridge error")]
  Bridge(#[from] BridgeError),

  #[error("Result sink error")]
  Sink(#[from] SinkError),
}

/// Errors related to configuration resolution (src/config.rs, src/reasoner.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Configuration file not found: {0}")]
  NotFound(PathBuf),

  #[error("Failed to load configuration from {path}")]
  Load {
    path: PathBuf,
    #[source]
    source: Box<figment::Error>,
  },

  #[error(
    "Unsupported configuration format for {0}; expected .toml or .json (XML configurations must be converted)"
  )]
  UnsupportedFormat(PathBuf),

  #[error("Invalid value for {key}: {reason}")]
  InvalidValue { key: &'static str, reason: String },

  #[error(
    "Unknown reasoner '{name}' and no classifier.reasoner_factory configured. Known: hermit, elk, snorocket, fact++"
  )]
  UnknownReasoner { name: String },

  #[error("test_parameters.jump_size * (iterations + 1) does not fit in 64 bits")]
  RunTooLarge,

  #[error("classifier.bridge.command must not be empty")]
  EmptyBridgeCommand,
}

/// Errors related to reading the triples file (src/triples.rs).
#[derive(Error, Debug)]
pub enum InputError {
  #[error("Failed to open triples file: {path}")]
  Open {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to read triples file")]
  Read(#[source] std::io::Error),
}

/// Errors related to the reasoner bridge process (src/bridge.rs).
#[derive(Error, Debug)]
pub enum BridgeError {
  #[error("Failed to spawn reasoner bridge: {command}")]
  Spawn {
    command: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to take bridge {0} pipe")]
  Pipe(&'static str),

  #[error("Failed to send '{request}' to the reasoner bridge")]
  Send {
    request: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to read reply to '{request}' from the reasoner bridge")]
  Receive {
    request: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Reasoner bridge closed its output while handling '{request}'")]
  Closed { request: String },

  #[error("Reasoner bridge rejected '{request}': {message}")]
  Rejected { request: String, message: String },

  #[error("Malformed reply to '{request}' from the reasoner bridge: {reply}")]
  MalformedReply { request: String, reply: String },

  #[error("Failed to instantiate reasoner factory '{factory}': {message}")]
  Factory { factory: String, message: String },
}

/// Errors related to the result output file (src/sink.rs).
#[derive(Error, Debug)]
pub enum SinkError {
  #[error("Failed to create output file: {path}")]
  Create {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write result record")]
  Write(#[source] std::io::Error),

  #[error("Result sink is closed")]
  Closed,
}
