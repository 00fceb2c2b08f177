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

//! # postcoord-bench
//!
//! `postcoord-bench` measures how description-logic reasoners cope with an
//! ontology that keeps growing. Starting from the SNOMED CT stated OWL form,
//! it repeatedly classifies, records the best of several timings, then adds a
//! batch of post-coordinated expressions built from a triples file.
//!
//! The OWL library and the reasoners themselves are external: they run in a
//! bridge process that this crate drives over a small line protocol.
//!
//! ## Core Modules
//!
//! * [`expression`]: Builds the role-grouped equivalence axiom for one
//!   `base, body structure, morphology` triple.
//! * [`triples`]: Reads the tab-separated triples file.
//! * [`reasoner`]: Reasoner selection, the ontology/reasoner traits and the
//!   timed `classify` call.
//! * [`bridge`]: The child-process implementation of those traits.
//! * [`driver`]: The measure-then-grow loop with its time budget.
//! * [`sink`]: Appends `size<TAB>milliseconds` records to the result file.
//! * [`benchmark`]: Wires configuration, bridge, input and output together.
//! * [`config`]: Loads and validates the `RunConfig`.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`command`]: Defines the bridge `CommandArgs` struct.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod benchmark;
pub mod bridge;
pub mod cli;
pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod expression;
pub mod logging;
pub mod reasoner;
pub mod sink;
pub mod triples;
